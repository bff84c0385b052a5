use std::collections::BTreeMap;
use parking_lot::RwLock;
use super::{Account, AccountStore};
use crate::{model::verdict::RiskVerdict, utils::errors::{AuditError, ErrorCode}};

///
/// An in-process account store. Accounts are ordered by email so audits are reproducible.
///
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<BTreeMap<String, Account>>,
}

impl MemoryStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.email().to_string(), account))
            .collect();

        MemoryStore { accounts: RwLock::new(accounts) }
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl AccountStore for MemoryStore {
    fn emails(&self) -> Vec<String> {
        self.accounts.read().keys().cloned().collect()
    }

    fn load(&self, email: &str) -> Result<Account, AuditError> {
        match self.accounts.read().get(email) {
            Some(account) => Ok(account.clone()),
            None => Err(ErrorCode::AccountNotFound.with_msg(&format!("The account {} does not exist", email))),
        }
    }

    fn insert(&self, account: Account) -> Result<(), AuditError> {
        let mut lock = self.accounts.write();

        if lock.contains_key(account.email()) {
            return Err(ErrorCode::AccountExists.with_msg(&format!("The account {} already exists", account.email())))
        }

        lock.insert(account.email().to_string(), account);
        Ok(())
    }

    fn save_verdict(&self, verdict: RiskVerdict) -> Result<(), AuditError> {
        match self.accounts.write().get_mut(&verdict.email) {
            Some(account) => {
                account.verdict = verdict;
                Ok(())
            },
            None => Err(ErrorCode::AccountNotFound.with_msg(&format!("The account {} does not exist", verdict.email))),
        }
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts.read().values().cloned().collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::model::{record::PersonalRecord, strength::StrengthFlags};

    fn account(email: &str) -> Account {
        Account {
            record: PersonalRecord { email: email.to_string(), ..Default::default() },
            verdict: RiskVerdict {
                email: email.to_string(),
                phc: String::new(),
                flags: StrengthFlags::default(),
                common_password: Some(false),
                used_personal_info: false,
                evaluated_on: Utc::now(),
            },
        }
    }

    #[test]
    fn test_emails_are_ordered() {
        let store = MemoryStore::new(vec!(account("zed@x.com"), account("amy@x.com")));
        assert_eq!(store.emails(), vec!("amy@x.com", "zed@x.com"));
    }

    #[test]
    fn test_duplicate_insert_is_rejected() -> Result<(), AuditError> {
        let store = MemoryStore::default();
        store.insert(account("amy@x.com"))?;

        let err = store.insert(account("amy@x.com")).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::AccountExists);
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_save_verdict_replaces_the_verdict() -> Result<(), AuditError> {
        let store = MemoryStore::new(vec!(account("amy@x.com")));
        let mut verdict = store.load("amy@x.com")?.verdict;
        verdict.used_personal_info = true;

        store.save_verdict(verdict)?;
        assert!(store.load("amy@x.com")?.verdict.used_personal_info);
        Ok(())
    }

    #[test]
    fn test_unknown_account() {
        let store = MemoryStore::default();
        assert_eq!(store.load("nobody@x.com").unwrap_err().error_code(), ErrorCode::AccountNotFound);
        assert_eq!(store.save_verdict(account("nobody@x.com").verdict).unwrap_err().error_code(), ErrorCode::AccountNotFound);
    }
}
