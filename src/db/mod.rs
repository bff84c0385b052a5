pub mod memory;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use crate::{model::{record::PersonalRecord, verdict::RiskVerdict}, utils::errors::AuditError};

///
/// An account as the storage collaborator holds it - the owner's details alongside the
/// security verdict for their current password. Keyed by the record's email.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Account {
    pub record: PersonalRecord,
    pub verdict: RiskVerdict,
}

impl Account {
    pub fn email(&self) -> &str {
        &self.record.email
    }
}

///
/// Where accounts and their verdicts live. The engine only reads records and hashes and writes
/// verdicts back, the storage format is entirely up to the implementation.
///
/// Callers serialise writes per account (see AuditContext::account_lock), implementations only
/// need to be individually thread-safe.
///
pub trait AccountStore: Send + Sync {
    /// Every account's email, in a stable order.
    fn emails(&self) -> Vec<String>;

    /// Load the account, or AccountNotFound.
    fn load(&self, email: &str) -> Result<Account, AuditError>;

    /// Add a new account, or AccountExists.
    fn insert(&self, account: Account) -> Result<(), AuditError>;

    /// Replace the verdict of an existing account, or AccountNotFound.
    fn save_verdict(&self, verdict: RiskVerdict) -> Result<(), AuditError>;

    /// A point-in-time copy of every account.
    fn accounts(&self) -> Vec<Account>;
}
