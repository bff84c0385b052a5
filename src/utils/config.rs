use std::str::FromStr;
use std::env::VarError;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use super::errors::{AuditError, ErrorCode};
use crate::model::algorithm::{Algorithm, HashingPolicy};
use crate::model::verdict::{ClassificationPolicy, Enforcement, WeaknessRule};

///
/// The engine configuration - initialised at start-up.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Configuration {
    pub dictionary_path: String,            // Newline separated list of known-weak passwords.
    pub accounts_path: String,              // JSON snapshot of accounts the offline audit runs over.
    pub hash_algorithm: String,             // Argon, BCrypt or PBKDF2 - used to hash new credentials.
    pub bcrypt_cost: u32,                   // Cost factor when hash_algorithm is BCrypt.
    pub weakness_rule: String,              // Observed or Strict.
    pub common_enforcement: String,         // Block, Warn or Ignore.
    pub personal_info_enforcement: String,  // Block, Warn or Ignore.
    pub weak_enforcement: String,           // Block, Warn or Ignore.
    pub distributed_tracing: bool,          // Export spans to jaeger.
    pub jaeger_endpoint: Option<String>,    // If this is the jaeger endpoint to send traces to.
}

impl Configuration {
    ///
    /// Load the engine's configuration.
    ///
    pub fn from_env() -> Result<Configuration, ConfigError> {
        let mut cfg = config::Config::default();

        // Merge any environment variables with the same name as the struct fields.
        cfg.merge(config::Environment::new())?;

        // Set defaults for settings that were not specified.
        cfg.set_default("dictionary_path", "patterns/weak_passwords.txt")?;
        cfg.set_default("accounts_path", "data/accounts.json")?;
        cfg.set_default("hash_algorithm", "BCrypt")?;
        cfg.set_default("bcrypt_cost", 12)?;
        cfg.set_default("weakness_rule", "Observed")?;
        cfg.set_default("common_enforcement", "Block")?;
        cfg.set_default("personal_info_enforcement", "Warn")?;
        cfg.set_default("weak_enforcement", "Warn")?;
        cfg.set_default("distributed_tracing", false)?;
        cfg.set_default("jaeger_endpoint", None::<String>)?;

        let config: Configuration = cfg.try_into()?;

        Ok(config)
    }

    ///
    /// Build the explicit classification policy described by the string settings.
    ///
    pub fn classification_policy(&self) -> Result<ClassificationPolicy, AuditError> {
        Ok(ClassificationPolicy {
            weakness_rule: WeaknessRule::from_str(&self.weakness_rule)?,
            common: Enforcement::from_str(&self.common_enforcement)?,
            personal_info: Enforcement::from_str(&self.personal_info_enforcement)?,
            weak: Enforcement::from_str(&self.weak_enforcement)?,
        })
    }

    ///
    /// The algorithm (and its parameters) new credentials are hashed with.
    ///
    pub fn hashing_policy(&self) -> Result<HashingPolicy, AuditError> {
        match Algorithm::from_name(&self.hash_algorithm)? {
            Algorithm::BCrypt => Ok(HashingPolicy::bcrypt(self.bcrypt_cost)),
            algorithm => Ok(HashingPolicy::default_for(algorithm)),
        }
    }

    ///
    /// Pretty-print the config.
    ///
    pub fn fmt_console(&self) -> Result<String, AuditError> {
        // Serialise to JSON so we have fields to iterate.
        let values = serde_json::to_value(&self)?;

        // Turn into a hashmap.
        let values = values.as_object()
            .ok_or_else(|| ErrorCode::ConfigError.with_msg("No config props"))?;

        // Sort by keys.
        let mut sorted: Vec<_> = values.iter().collect();
        sorted.sort_by_key(|a| a.0);

        Ok(sorted.iter()
            .map(|(k, v)| format!("{:>26}: {}\n", k, v))
            .collect())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            dictionary_path: "patterns/weak_passwords.txt".to_string(),
            accounts_path: "data/accounts.json".to_string(),
            hash_algorithm: "BCrypt".to_string(),
            bcrypt_cost: 12,
            weakness_rule: "Observed".to_string(),
            common_enforcement: "Block".to_string(),
            personal_info_enforcement: "Warn".to_string(),
            weak_enforcement: "Warn".to_string(),
            distributed_tracing: false,
            jaeger_endpoint: None,
        }
    }
}

///
/// If the specified environment variable is not set for this process, set it to the default value specified.
///
pub fn default_env(key: &str, value: &str) {
    if let Err(VarError::NotPresent) = std::env::var(key) {
        std::env::set_var(key, value);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_settings_parse() -> Result<(), AuditError> {
        let policy = Configuration::default().classification_policy()?;
        assert_eq!(policy, ClassificationPolicy::default());
        Ok(())
    }

    #[test]
    fn test_unknown_enforcement_is_rejected() {
        let config = Configuration { personal_info_enforcement: "Shout".to_string(), ..Default::default() };
        let err = config.classification_policy().unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPolicySetting);
    }

    #[test]
    fn test_bcrypt_cost_flows_into_hashing_policy() -> Result<(), AuditError> {
        let config = Configuration { bcrypt_cost: 5, ..Default::default() };
        assert_eq!(config.hashing_policy()?, HashingPolicy::bcrypt(5));
        Ok(())
    }

    #[test]
    fn test_fmt_console_lists_every_setting() -> Result<(), AuditError> {
        let output = Configuration::default().fmt_console()?;
        assert!(output.contains("dictionary_path: \"patterns/weak_passwords.txt\""));
        assert!(output.contains("jaeger_endpoint: null"));
        assert_eq!(output.lines().count(), 10);
        Ok(())
    }
}
