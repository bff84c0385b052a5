use std::{collections::HashSet, path::Path};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use crate::utils::errors::{AuditError, ErrorCode};

///
/// The outcome of a common-password check. Unknown means the dictionary couldn't be
/// consulted - it is not the same as NotCommon.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq)]
pub enum CommonStatus {
    Common,
    NotCommon,
    Unknown,
}

impl CommonStatus {
    ///
    /// The persisted form - None when the password could not be checked.
    ///
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CommonStatus::Common    => Some(true),
            CommonStatus::NotCommon => Some(false),
            CommonStatus::Unknown   => None,
        }
    }
}

impl From<Option<bool>> for CommonStatus {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true)  => CommonStatus::Common,
            Some(false) => CommonStatus::NotCommon,
            None        => CommonStatus::Unknown,
        }
    }
}

///
/// An immutable set of known-weak passwords, lowercase normalised.
///
#[derive(Clone, Debug, Default)]
pub struct CommonPasswords {
    words: HashSet<String>,
}

impl CommonPasswords {
    ///
    /// Build the dictionary from lines of text. Surrounding whitespace is trimmed and blank lines skipped.
    ///
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        let words = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect();

        CommonPasswords { words }
    }

    ///
    /// Read a newline separated dictionary file.
    ///
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ErrorCode::DictionaryUnavailable
                .with_msg(&format!("Unable to read the common password dictionary {}: {}", path.display(), e)))?;

        Ok(Self::from_lines(contents.lines()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, plain_text_password: &str) -> bool {
        is_common(plain_text_password, &self.words)
    }
}

///
/// Case-insensitive membership test against a lowercase dictionary.
///
pub fn is_common(plain_text_password: &str, dictionary: &HashSet<String>) -> bool {
    dictionary.contains(&plain_text_password.to_lowercase())
}

///
/// Check a password against a dictionary which may not have been available.
///
pub fn common_status(plain_text_password: &str, dictionary: Option<&CommonPasswords>) -> CommonStatus {
    match dictionary {
        Some(dictionary) if dictionary.contains(plain_text_password) => CommonStatus::Common,
        Some(_) => CommonStatus::NotCommon,
        None => CommonStatus::Unknown,
    }
}
