use std::{collections::HashMap, sync::Arc};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use crate::{model::{algorithm::HashingPolicy, dictionary::{self, CommonPasswords, CommonStatus}, verdict::ClassificationPolicy}, utils::{config::Configuration, errors::AuditError, time_provider::TimeProvider}};

///
/// The context is shared by every credential flow and audit job and gives them access to the
/// config, the common password dictionary, the clock and the per-account write locks.
///
pub struct AuditContext {
    config: Configuration,
    policy: ClassificationPolicy,
    hashing_policy: HashingPolicy,
    dictionary: RwLock<Option<Arc<CommonPasswords>>>,
    time_provider: RwLock<TimeProvider>,
    account_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl AuditContext {
    ///
    /// Build the context and load the dictionary named in the config.
    ///
    /// An unreadable dictionary is not fatal - passwords are reported with an unknown common
    /// status until a reload succeeds.
    ///
    pub fn new(config: Configuration) -> Result<Self, AuditError> {
        let dictionary = match CommonPasswords::load(&config.dictionary_path) {
            Ok(dictionary) => {
                tracing::info!("Loaded {} common passwords from {}", dictionary.len(), config.dictionary_path);
                Some(dictionary)
            },
            Err(err) => {
                tracing::warn!("Common password checks unavailable: {}", err);
                None
            },
        };

        Self::with_dictionary(config, dictionary)
    }

    ///
    /// Build the context around an already loaded dictionary (or none at all).
    ///
    pub fn with_dictionary(config: Configuration, dictionary: Option<CommonPasswords>) -> Result<Self, AuditError> {
        Ok(AuditContext {
            policy: config.classification_policy()?,
            hashing_policy: config.hashing_policy()?,
            config,
            dictionary: RwLock::new(dictionary.map(Arc::new)),
            time_provider: RwLock::new(TimeProvider::default()),
            account_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    ///
    /// The configured classification policy. Callers may pass a different one to any flow.
    ///
    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    pub fn hashing_policy(&self) -> &HashingPolicy {
        &self.hashing_policy
    }

    ///
    /// Re-read the dictionary file. On failure the previously loaded dictionary stays in use.
    ///
    pub fn reload_dictionary(&self) -> Result<usize, AuditError> {
        let dictionary = CommonPasswords::load(&self.config.dictionary_path)?;
        let count = dictionary.len();

        *self.dictionary.write() = Some(Arc::new(dictionary));
        tracing::info!("Reloaded {} common passwords from {}", count, self.config.dictionary_path);
        Ok(count)
    }

    ///
    /// A snapshot of the current dictionary - cheap to clone and never mutated.
    ///
    pub fn dictionary(&self) -> Option<Arc<CommonPasswords>> {
        self.dictionary.read().clone()
    }

    pub fn common_status(&self, plain_text_password: &str) -> CommonStatus {
        dictionary::common_status(plain_text_password, self.dictionary().as_deref())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time_provider.read().now()
    }

    ///
    /// Set or clear the fixed time.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.time_provider.write().fix(now);
    }

    ///
    /// Wait for exclusive write access to an account's verdict. Held across load, analysis and
    /// save so an audit and a password reset can't interleave on the same account.
    ///
    pub async fn account_lock(&self, email: &str) -> OwnedMutexGuard<()> {
        let lock = self.account_locks
            .lock()
            .entry(email.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        lock.lock_owned().await
    }
}
