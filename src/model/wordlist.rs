use std::collections::BTreeSet;
use super::record::PersonalRecord;

/// Derived words shorter than this are discarded.
pub const MIN_WORD_LENGTH: usize = 4;

/// Number of leading/trailing phone digits added as words of their own.
const PHONE_FRAGMENT: usize = 4;

///
/// Derive the set of "suspect" words a password built from this person's details might contain.
///
/// Free-text fields (full name, email local part, address, department) are expanded into every
/// lowercase/Titlecase combination of their whitespace separated tokens. The date of birth has its
/// separators removed and the phone number contributes itself, its first and its last four characters.
///
/// Deterministic and free of side effects - calling it twice yields the same set.
///
pub fn generate(record: &PersonalRecord) -> BTreeSet<String> {
    let mut words = BTreeSet::new();

    for text in [record.fullname(), record.email_local_part(), record.address(), record.department()]
        .iter()
        .flatten() {
        words.extend(name_combinations(text));
    }

    if let Some(dob) = record.dob() {
        words.insert(dob.replace('-', ""));
    }

    if let Some(phone) = record.phone() {
        words.insert(phone.to_string());

        let digits: Vec<char> = phone.chars().collect();
        if digits.len() >= PHONE_FRAGMENT {
            words.insert(digits[digits.len() - PHONE_FRAGMENT..].iter().collect());
            words.insert(digits[..PHONE_FRAGMENT].iter().collect());
        }
    }

    words.retain(|word| word.chars().count() >= MIN_WORD_LENGTH);
    words
}

///
/// Every concatenation of the text's tokens where each token is either all lowercase or Titlecase.
///
/// "Test User" gives testuser, testUser, Testuser and TestUser. A text of k tokens yields at most
/// 2^k combinations (fewer when a token has no letters and both variants coincide).
///
pub fn name_combinations(text: &str) -> BTreeSet<String> {
    let mut combinations = BTreeSet::new();
    combinations.insert(String::new());

    for token in text.split_whitespace() {
        let variants = variants(token);

        combinations = combinations
            .iter()
            .flat_map(|prefix| variants.iter().map(move |variant| format!("{}{}", prefix, variant)))
            .collect();
    }

    combinations.remove("");
    combinations
}

///
/// The lowercase and Titlecase forms of a single token.
///
fn variants(token: &str) -> BTreeSet<String> {
    let lower = token.to_lowercase();

    let mut chars = lower.chars();
    let title = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    vec!(lower, title).into_iter().collect()
}
