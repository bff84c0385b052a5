#![allow(dead_code)] // Not every test file uses every fixture.

use std::{path::PathBuf, sync::Arc};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use pwaudit::db::{Account, memory::MemoryStore};
use pwaudit::model::{algorithm::HashingPolicy, dictionary::CommonPasswords, record::PersonalRecord, strength, verdict::RiskVerdict};
use pwaudit::utils::{self, config::Configuration, context::AuditContext};

/// The lowest cost bcrypt allows - keeps the hash-only checks fast.
pub const TEST_COST: u32 = 4;

pub const STRONG_PASSWORD: &str = "Xk9#mQ2!vL";
pub const PERSONAL_PASSWORD: &str = "TestUser";
pub const CORRUPT_HASH: &str = "$2b$04$short";

lazy_static! {
    // Hashing is the slow part of every test - share the hashes between them.
    pub static ref PERSONAL_HASH: String = HashingPolicy::bcrypt(TEST_COST)
        .hash_into_phc(PERSONAL_PASSWORD)
        .expect("Unable to hash the personal password");

    pub static ref STRONG_HASH: String = HashingPolicy::bcrypt(TEST_COST)
        .hash_into_phc(STRONG_PASSWORD)
        .expect("Unable to hash the strong password");

    pub static ref FIXED_TIME: DateTime<Utc> = DateTime::parse_from_rfc3339("2021-10-01T09:00:00Z")
        .expect("Bad fixed time")
        .with_timezone(&Utc);
}

///
/// The record every concrete scenario is described against.
///
pub fn scenario_record() -> PersonalRecord {
    PersonalRecord {
        fullname: "Test User".to_string(),
        email: "testuser@x.com".to_string(),
        phone: "5551234567".to_string(),
        dob: "1990-05-12".to_string(),
        ..Default::default()
    }
}

pub fn record(email: &str, fullname: &str, department: &str) -> PersonalRecord {
    PersonalRecord {
        fullname: fullname.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        ..Default::default()
    }
}

pub fn test_config() -> Configuration {
    Configuration {
        bcrypt_cost: TEST_COST,
        dictionary_path: temp_path("missing-dictionary").to_string_lossy().to_string(),
        ..Default::default()
    }
}

///
/// A context with a small in-memory dictionary and a fixed clock.
///
pub fn test_context() -> Arc<AuditContext> {
    let dictionary = CommonPasswords::from_lines(vec!("password", "letmein", "123456", "qwerty"));
    let ctx = AuditContext::with_dictionary(test_config(), Some(dictionary))
        .expect("Unable to build the test context");

    ctx.set_now(Some(*FIXED_TIME));
    Arc::new(ctx)
}

///
/// A context whose dictionary could not be loaded.
///
pub fn context_without_dictionary() -> Arc<AuditContext> {
    let ctx = AuditContext::new(test_config()).expect("Unable to build the test context");
    ctx.set_now(Some(*FIXED_TIME));
    Arc::new(ctx)
}

///
/// An account as it would have been stored before anyone audited it for personal information.
///
pub fn unaudited_account(record: PersonalRecord, phc: &str, plain_text_password: &str) -> Account {
    Account {
        verdict: RiskVerdict {
            email: record.email.clone(),
            phc: phc.to_string(),
            flags: strength::analyze(plain_text_password),
            common_password: Some(false),
            used_personal_info: false,
            evaluated_on: DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
                .expect("Bad time")
                .with_timezone(&Utc),
        },
        record,
    }
}

///
/// Three accounts - one whose password is its owner's name, one strong and one with a hash that
/// can't be parsed.
///
pub fn mixed_store() -> MemoryStore {
    MemoryStore::new(vec!(
        unaudited_account(scenario_record(), &PERSONAL_HASH, PERSONAL_PASSWORD),
        unaudited_account(record("amy@x.com", "Amy Pond", "Finance"), &STRONG_HASH, STRONG_PASSWORD),
        unaudited_account(record("rory@x.com", "Rory Williams", "IT"), CORRUPT_HASH, STRONG_PASSWORD),
    ))
}

///
/// A unique path in the temp dir. The file isn't created.
///
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pwaudit-{}-{}", name, utils::generate_id()))
}

///
/// Write a dictionary file into the temp dir and return its path.
///
pub fn dictionary_file(lines: &[&str]) -> PathBuf {
    let path = temp_path("dictionary.txt");
    std::fs::write(&path, lines.join("\n")).expect("Unable to write test dictionary");
    path
}
