use std::collections::HashSet;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Passwords shorter than this fail the length check.
pub const MIN_LENGTH: usize = 8;

lazy_static! {
    ///
    /// The punctuation which counts as a special character. Anything else (including non-ASCII
    /// symbols) does not.
    ///
    static ref SPECIAL_CHARACTERS: HashSet<char> = "!@#$%^&*()-_=+[{]}|;:'\",<.>/?`~"
        .chars()
        .collect();
}

///
/// The structural attributes of a plain text password. These can only be derived while the
/// plain text is available, they can never be recomputed from a hash.
///
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StrengthFlags {
    pub length_ok: bool,
    pub has_upper: bool,
    pub has_lower: bool,
    pub has_digit: bool,
    pub has_special: bool,
}

impl StrengthFlags {
    ///
    /// True if any one of the five attributes is missing.
    ///
    pub fn security_warning(&self) -> bool {
        !(self.length_ok && self.has_upper && self.has_lower && self.has_digit && self.has_special)
    }
}

///
/// Classify the plain text password into its structural attributes.
///
/// Length is measured in characters, not bytes. Upper and lower case follow the Unicode
/// categories, digits are ASCII only.
///
pub fn analyze(plain_text_password: &str) -> StrengthFlags {
    StrengthFlags {
        length_ok:   plain_text_password.chars().count() >= MIN_LENGTH,
        has_upper:   plain_text_password.chars().any(char::is_uppercase),
        has_lower:   plain_text_password.chars().any(char::is_lowercase),
        has_digit:   plain_text_password.chars().any(|c| c.is_ascii_digit()),
        has_special: plain_text_password.chars().any(|c| SPECIAL_CHARACTERS.contains(&c)),
    }
}
