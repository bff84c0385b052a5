use std::{collections::HashSet, path::Path};
use super::{Account, AccountStore, memory::MemoryStore};
use crate::utils::errors::{AuditError, ErrorCode};

///
/// Load a JSON array of accounts into a memory store. A missing file is an empty store.
///
pub async fn load<P: AsRef<Path>>(path: P) -> Result<MemoryStore, AuditError> {
    let path = path.as_ref();

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("No account snapshot at {}, starting empty", path.display());
            return Ok(MemoryStore::default())
        },
        Err(err) => return Err(ErrorCode::IOError
            .with_msg(&format!("Failed to open account snapshot {}: {}", path.display(), err))),
    };

    let accounts: Vec<Account> = serde_json::from_slice(&bytes)?;
    check_accounts(&accounts)?;
    tracing::info!("Loaded {} accounts from {}", accounts.len(), path.display());

    Ok(MemoryStore::new(accounts))
}

///
/// Every account must be keyed by one email, used once. The store would otherwise drop rows and
/// the next save would write the loss back to disk.
///
fn check_accounts(accounts: &[Account]) -> Result<(), AuditError> {
    let mut seen = HashSet::new();

    for account in accounts {
        if account.verdict.email != account.record.email {
            return Err(ErrorCode::InvalidJSON.with_msg(&format!(
                "Account {} has a verdict for {}", account.record.email, account.verdict.email)))
        }

        if !seen.insert(account.email()) {
            return Err(ErrorCode::InvalidJSON.with_msg(&format!(
                "Account {} appears more than once in the snapshot", account.email())))
        }
    }

    Ok(())
}

///
/// Write every account in the store back out as a JSON array.
///
pub async fn save<P: AsRef<Path>>(store: &dyn AccountStore, path: P) -> Result<(), AuditError> {
    let json = serde_json::to_vec_pretty(&store.accounts())?;
    tokio::fs::write(path.as_ref(), json).await?;
    Ok(())
}
