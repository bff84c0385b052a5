pub mod assess_password;
pub mod audit_accounts;
pub mod report;
