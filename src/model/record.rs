use serde::{Deserialize, Serialize};

///
/// A snapshot of an account owner's personal details - the raw material for the personal wordlist.
///
/// Any field may be missing or blank; blank is treated exactly as missing.
///
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PersonalRecord {
    #[serde(default)]
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub dob: String,               // YYYY-MM-DD
    #[serde(default)]
    pub gender: String,            // Carried for reporting, never used to derive words.
    #[serde(default)]
    pub address: String,
}

impl PersonalRecord {
    ///
    /// The part of the email address before the '@' (or the whole address if there isn't one).
    ///
    pub fn email_local_part(&self) -> Option<&str> {
        present(&self.email)
            .and_then(|email| email.split('@').next())
            .and_then(present)
    }

    pub fn fullname(&self) -> Option<&str> {
        present(&self.fullname)
    }

    pub fn phone(&self) -> Option<&str> {
        present(&self.phone)
    }

    pub fn department(&self) -> Option<&str> {
        present(&self.department)
    }

    pub fn dob(&self) -> Option<&str> {
        present(&self.dob)
    }

    pub fn address(&self) -> Option<&str> {
        present(&self.address)
    }
}

fn present(value: &str) -> Option<&str> {
    match value.trim().is_empty() {
        true  => None,
        false => Some(value),
    }
}
