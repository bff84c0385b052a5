use std::fmt;
use bcrypt::BcryptError;
use config::ConfigError;
use tokio::task::JoinError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorCode {
    AuditThreadingIssue             = 0401,
    ConfigError                     = 0500,
    IOError                         = 0501,
    InvalidJSON                     = 0505,
    InvalidAlgorithmConfig          = 0508,
    HashingError                    = 0509,
    InvalidPHCFormat                = 0510,
    UnknownAlgorithmVariant         = 0511,
    DictionaryUnavailable           = 0600,
    InvalidPolicySetting            = 1003,
    PasswordRejected                = 2001,
    PasswordNotMatch                = 2103,
    EmailMandatory                  = 2300,
    AccountNotFound                 = 2400,
    AccountExists                   = 2401,
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> AuditError {
        AuditError::new(*self, message)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuditError {
    error_code: ErrorCode,
    message: String,
}

impl AuditError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        AuditError { error_code, message: message.to_string() }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code as u32, self.message)
    }
}

impl std::error::Error for AuditError {}

impl From<ConfigError> for AuditError {
    fn from(error: ConfigError) -> Self {
        ErrorCode::ConfigError.with_msg(&format!("The service configuration is not correct: {}", error))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(error: std::io::Error) -> Self {
        ErrorCode::IOError.with_msg(&format!("IO failure: {}", error))
    }
}

impl From<argon2::Error> for AuditError {
    fn from(error: argon2::Error) -> Self {
        ErrorCode::InvalidAlgorithmConfig.with_msg(&format!("Invalid configuration for algorithm: {}", error))
    }
}

impl From<password_hash::Error> for AuditError {
    fn from(error: password_hash::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash or parse password hash: {}", error))
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert json: {}", error))
    }
}

impl From<JoinError> for AuditError {
    fn from(error: JoinError) -> Self {
        ErrorCode::AuditThreadingIssue.with_msg(&format!("Background task failed: {}", error))
    }
}

impl From<BcryptError> for AuditError {
    fn from(error: BcryptError) -> Self {
        match error {
            BcryptError::CostNotAllowed(_) |
            BcryptError::InvalidCost(_) => ErrorCode::InvalidAlgorithmConfig
                .with_msg(&format!("Invalid bcrypt configuration: {}", error)),
            _ => ErrorCode::InvalidPHCFormat.with_msg(&format!("Unable to verify: {}", error)),
        }
    }
}
