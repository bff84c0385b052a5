pub mod argon;
pub mod bcrypt;
pub mod pbkdf2;

use std::str::FromStr;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use self::{argon::ArgonPolicy, bcrypt::BCryptPolicy, pbkdf2::PBKDF2Policy};
use crate::utils::errors::{ErrorCode, AuditError};

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum Algorithm {
    Argon,
    BCrypt,
    PBKDF2,
}

///
/// The algorithm, and its parameters, used to hash new credentials.
///
/// Verification never needs this - the stored hash carries everything required to check it.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum HashingPolicy {
    Argon(ArgonPolicy),
    BCrypt(BCryptPolicy),
    PBKDF2(PBKDF2Policy),
}

impl Default for HashingPolicy {
    fn default() -> Self {
        HashingPolicy::BCrypt(BCryptPolicy::default())
    }
}

impl HashingPolicy {
    pub fn bcrypt(cost: u32) -> Self {
        HashingPolicy::BCrypt(BCryptPolicy { cost, ..Default::default() })
    }

    pub fn default_for(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Argon  => HashingPolicy::Argon(ArgonPolicy::default()),
            Algorithm::BCrypt => HashingPolicy::BCrypt(BCryptPolicy::default()),
            Algorithm::PBKDF2 => HashingPolicy::PBKDF2(PBKDF2Policy::default()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            HashingPolicy::Argon(_)  => Algorithm::Argon,
            HashingPolicy::BCrypt(_) => Algorithm::BCrypt,
            HashingPolicy::PBKDF2(_) => Algorithm::PBKDF2,
        }
    }

    ///
    /// Hash the plain text password into a PHC (or modular crypt) string.
    ///
    /// This is deliberately slow - callers on an async runtime should use the blocking pool.
    ///
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<String, AuditError> {
        match self {
            HashingPolicy::Argon(policy)  => policy.hash_into_phc(plain_text_password),
            HashingPolicy::BCrypt(policy) => policy.hash_into_phc(plain_text_password),
            HashingPolicy::PBKDF2(policy) => policy.hash_into_phc(plain_text_password),
        }
    }
}

///
/// Validate if the plain_text_password matches the hashed password provided.
///
/// The algorithm is constructed and used from the PHC string provided. A hash that cannot
/// be parsed is an error, distinct from a hash which simply doesn't match.
///
pub fn validate(plain_text_password: &str, phc: &str) -> Result<bool, AuditError> {
    match select(phc)? {
        Algorithm::Argon  => argon::validate(phc, plain_text_password),
        Algorithm::BCrypt => bcrypt::validate(phc, plain_text_password),
        Algorithm::PBKDF2 => pbkdf2::validate(phc, plain_text_password),
    }
}

///
/// Parse the first part of the phc string and return the algorithm.
///
fn select(phc: &str) -> Result<Algorithm, AuditError> {
    let mut split = phc.split('$');
    split.next(); /* Skip first it's blank */

    match split.next() {
        Some(algorithm) => Algorithm::from_str(algorithm),
        None => Err(ErrorCode::InvalidPHCFormat.with_msg("The PHC is invalid, there's no algorithm")),
    }
}

impl Algorithm {
    ///
    /// Parse the configuration name of an algorithm (as it's displayed), rather than a PHC identifier.
    ///
    pub fn from_name(name: &str) -> Result<Algorithm, AuditError> {
        match name {
            "Argon"  => Ok(Algorithm::Argon),
            "BCrypt" => Ok(Algorithm::BCrypt),
            "PBKDF2" => Ok(Algorithm::PBKDF2),
            _ => Err(ErrorCode::InvalidPolicySetting.with_msg(&format!("hash algorithm {} is un-handled", name))),
        }
    }
}

impl FromStr for Algorithm {
    type Err = AuditError;

    fn from_str(input: &str) -> Result<Algorithm, Self::Err> {
        match input {
            "argon2i"  |
            "argon2d"  |
            "argon2id" => Ok(Algorithm::Argon),

            "2a" |
            "2b" |
            "2x" |
            "2y" => Ok(Algorithm::BCrypt),

            "pbkdf2-sha256" => Ok(Algorithm::PBKDF2),

            _ => Err(ErrorCode::InvalidPHCFormat.with_msg(&format!("algorithm {} is un-handled", input))),
        }
    }
}
