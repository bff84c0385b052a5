use super::{algorithm, record::PersonalRecord, wordlist};
use crate::utils::errors::AuditError;

///
/// Check if the plain text password contains any of the words derived from the owner's personal details.
///
/// Containment is a case-insensitive substring test, not an exact match.
///
pub fn matches_plaintext(plain_text_password: &str, record: &PersonalRecord) -> bool {
    let password = plain_text_password.to_lowercase();

    wordlist::generate(record)
        .iter()
        .any(|word| password.contains(&word.to_lowercase()))
}

///
/// Check if the stored hash is of a password which IS one of the words derived from the owner's
/// personal details. The plain text is never needed.
///
/// Every candidate costs a full slow-hash verification, so this belongs on a blocking thread and
/// off any request path. Stops at the first match. An unparseable hash is an error for this
/// account only.
///
pub fn matches_hash(phc: &str, record: &PersonalRecord) -> Result<bool, AuditError> {
    for word in wordlist::generate(record) {
        if algorithm::validate(&word, phc)? {
            return Ok(true)
        }
    }

    Ok(false)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::algorithm::HashingPolicy;
    use crate::utils::errors::ErrorCode;

    fn scenario() -> PersonalRecord {
        PersonalRecord {
            fullname: "Test User".to_string(),
            email: "testuser@x.com".to_string(),
            phone: "5551234567".to_string(),
            dob: "1990-05-12".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plaintext_substring_match() {
        assert!(matches_plaintext("Testuser1990", &scenario()));
        assert!(matches_plaintext("xx4567xx", &scenario()));
        assert!(matches_plaintext("TESTUSER", &scenario()));
    }

    #[test]
    fn test_unrelated_password_does_not_match() {
        assert!(!matches_plaintext("Xk9#mQ2!vL", &scenario()));
    }

    #[test]
    fn test_empty_record_never_matches() {
        assert!(!matches_plaintext("anything at all", &PersonalRecord::default()));
    }

    #[test]
    fn test_hash_of_a_derived_word_matches() -> Result<(), AuditError> {
        let phc = HashingPolicy::bcrypt(4).hash_into_phc("TestUser")?;
        assert!(matches_hash(&phc, &scenario())?);
        assert!(matches_plaintext("TestUser", &scenario()));
        Ok(())
    }

    #[test]
    fn test_hash_of_an_unrelated_password_does_not_match() -> Result<(), AuditError> {
        let phc = HashingPolicy::bcrypt(4).hash_into_phc("Xk9#mQ2!vL")?;
        assert!(!matches_hash(&phc, &scenario())?);
        Ok(())
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        let err = matches_hash("$2b$04$short", &scenario()).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPHCFormat);
    }

    #[test]
    fn test_corrupt_hash_is_not_inspected_without_candidates() -> Result<(), AuditError> {
        // No words - nothing to verify, so nothing can fail.
        assert!(!matches_hash("garbage", &PersonalRecord::default())?);
        Ok(())
    }
}
