use std::str::FromStr;
use derive_more::Display;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{dictionary::CommonStatus, strength::StrengthFlags};
use crate::utils::errors::{AuditError, ErrorCode};

///
/// The label the reporting surface shows for an account's password.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PasswordStatus {
    Strong,
    Weak,
    Common,
}

///
/// Which structural attributes a password needs before it may be called Strong.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq)]
pub enum WeaknessRule {
    /// Length, an uppercase letter and a digit.
    Observed,
    /// All five attributes.
    Strict,
}

///
/// What happens to a new password that raises a concern.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq)]
pub enum Enforcement {
    Block,
    Warn,
    Ignore,
}

///
/// Why a password was warned about or rejected.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq)]
pub enum Concern {
    CommonPassword,
    CommonStatusUnknown,
    PersonalInfo,
    Weak,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Warned(Vec<Concern>),
    Rejected(Vec<Concern>),
}

///
/// The classification and enforcement rules, passed explicitly to every call that needs them so
/// different callers can apply different rules side by side.
///
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClassificationPolicy {
    pub weakness_rule: WeaknessRule,
    pub common: Enforcement,
    pub personal_info: Enforcement,
    pub weak: Enforcement,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            weakness_rule: WeaknessRule::Observed,
            common: Enforcement::Block,
            personal_info: Enforcement::Warn,
            weak: Enforcement::Warn,
        }
    }
}

impl ClassificationPolicy {
    ///
    /// Decide what to do with a freshly assessed password.
    ///
    /// Concerns are gathered in a fixed order. Any concern whose enforcement is Block rejects the
    /// password, otherwise any Warn concern warns. An unknown common status is enforced like a
    /// common password would have been.
    ///
    pub fn enforce(&self, flags: &StrengthFlags, common: CommonStatus, used_personal_info: bool) -> Outcome {
        let mut blocked = vec!();
        let mut warned = vec!();

        let mut raise = |concern: Concern, enforcement: Enforcement| match enforcement {
            Enforcement::Block  => blocked.push(concern),
            Enforcement::Warn   => warned.push(concern),
            Enforcement::Ignore => {},
        };

        match common {
            CommonStatus::Common    => raise(Concern::CommonPassword, self.common),
            CommonStatus::Unknown   => raise(Concern::CommonStatusUnknown, self.common),
            CommonStatus::NotCommon => {},
        }

        if used_personal_info {
            raise(Concern::PersonalInfo, self.personal_info);
        }

        if !self.structurally_strong(flags) {
            raise(Concern::Weak, self.weak);
        }

        match (blocked.is_empty(), warned.is_empty()) {
            (false, _)    => Outcome::Rejected(blocked),
            (true, false) => Outcome::Warned(warned),
            (true, true)  => Outcome::Accepted,
        }
    }

    fn structurally_strong(&self, flags: &StrengthFlags) -> bool {
        let observed = flags.length_ok && flags.has_upper && flags.has_digit;

        match self.weakness_rule {
            WeaknessRule::Observed => observed,
            WeaknessRule::Strict   => observed && flags.has_lower && flags.has_special,
        }
    }
}

///
/// Label a password. First match wins: Common, then Weak, then Strong.
///
/// A password whose common status is unknown is never called Strong.
///
pub fn classify(flags: &StrengthFlags, common: CommonStatus, used_personal_info: bool, policy: &ClassificationPolicy) -> PasswordStatus {
    if common == CommonStatus::Common {
        return PasswordStatus::Common
    }

    if used_personal_info
        || common == CommonStatus::Unknown
        || !policy.structurally_strong(flags) {
        return PasswordStatus::Weak
    }

    PasswordStatus::Strong
}

///
/// The persisted security record for one account. Every field describes the password whose
/// hash is in `phc` - they are recomputed together whenever the hash changes.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RiskVerdict {
    pub email: String,
    pub phc: String,
    pub flags: StrengthFlags,
    pub common_password: Option<bool>,  // None if the dictionary couldn't be checked.
    pub used_personal_info: bool,
    pub evaluated_on: DateTime<Utc>,
}

impl RiskVerdict {
    pub fn common_status(&self) -> CommonStatus {
        CommonStatus::from(self.common_password)
    }

    pub fn status(&self, policy: &ClassificationPolicy) -> PasswordStatus {
        classify(&self.flags, self.common_status(), self.used_personal_info, policy)
    }
}

impl FromStr for WeaknessRule {
    type Err = AuditError;

    fn from_str(input: &str) -> Result<WeaknessRule, Self::Err> {
        match input {
            "Observed" => Ok(WeaknessRule::Observed),
            "Strict"   => Ok(WeaknessRule::Strict),
            _ => Err(ErrorCode::InvalidPolicySetting.with_msg(&format!("weakness rule {} is un-handled", input))),
        }
    }
}

impl FromStr for Enforcement {
    type Err = AuditError;

    fn from_str(input: &str) -> Result<Enforcement, Self::Err> {
        match input {
            "Block"  => Ok(Enforcement::Block),
            "Warn"   => Ok(Enforcement::Warn),
            "Ignore" => Ok(Enforcement::Ignore),
            _ => Err(ErrorCode::InvalidPolicySetting.with_msg(&format!("enforcement {} is un-handled", input))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::strength::analyze;

    const ALL: StrengthFlags = StrengthFlags { length_ok: true, has_upper: true, has_lower: true, has_digit: true, has_special: true };

    #[test]
    fn test_strong_random_password() {
        let policy = ClassificationPolicy::default();
        let flags = analyze("Xk9#mQ2!vL");
        assert_eq!(classify(&flags, CommonStatus::NotCommon, false, &policy), PasswordStatus::Strong);
    }

    #[test]
    fn test_common_wins_regardless_of_structure() {
        let policy = ClassificationPolicy::default();
        assert_eq!(classify(&analyze("password"), CommonStatus::Common, false, &policy), PasswordStatus::Common);
        assert_eq!(classify(&ALL, CommonStatus::Common, true, &policy), PasswordStatus::Common);
    }

    #[test]
    fn test_personal_info_is_weak() {
        let policy = ClassificationPolicy::default();
        assert_eq!(classify(&ALL, CommonStatus::NotCommon, true, &policy), PasswordStatus::Weak);
    }

    #[test]
    fn test_unknown_common_status_is_never_strong() {
        let policy = ClassificationPolicy::default();
        assert_eq!(classify(&ALL, CommonStatus::Unknown, false, &policy), PasswordStatus::Weak);
    }

    #[test]
    fn test_each_observed_attribute_is_required() {
        let policy = ClassificationPolicy::default();
        let missing = vec!(
            StrengthFlags { length_ok: false, ..ALL },
            StrengthFlags { has_upper: false, ..ALL },
            StrengthFlags { has_digit: false, ..ALL },
        );

        for flags in missing {
            assert_eq!(classify(&flags, CommonStatus::NotCommon, false, &policy), PasswordStatus::Weak);
        }
    }

    #[test]
    fn test_lower_and_special_only_matter_when_strict() {
        let observed = ClassificationPolicy::default();
        let strict = ClassificationPolicy { weakness_rule: WeaknessRule::Strict, ..Default::default() };
        let flags = StrengthFlags { has_lower: false, has_special: false, ..ALL };

        assert_eq!(classify(&flags, CommonStatus::NotCommon, false, &observed), PasswordStatus::Strong);
        assert_eq!(classify(&flags, CommonStatus::NotCommon, false, &strict), PasswordStatus::Weak);
    }

    #[test]
    fn test_default_enforcement() {
        let policy = ClassificationPolicy::default();

        assert_eq!(policy.enforce(&ALL, CommonStatus::NotCommon, false), Outcome::Accepted);
        assert_eq!(policy.enforce(&ALL, CommonStatus::NotCommon, true), Outcome::Warned(vec!(Concern::PersonalInfo)));
        assert_eq!(
            policy.enforce(&analyze("password"), CommonStatus::Common, false),
            Outcome::Rejected(vec!(Concern::CommonPassword)));
        assert_eq!(
            policy.enforce(&ALL, CommonStatus::Unknown, false),
            Outcome::Rejected(vec!(Concern::CommonStatusUnknown)));
    }

    #[test]
    fn test_policies_do_not_share_state() {
        let lenient = ClassificationPolicy { personal_info: Enforcement::Ignore, ..Default::default() };
        let blocking = ClassificationPolicy { personal_info: Enforcement::Block, ..Default::default() };

        assert_eq!(lenient.enforce(&ALL, CommonStatus::NotCommon, true), Outcome::Accepted);
        assert_eq!(blocking.enforce(&ALL, CommonStatus::NotCommon, true), Outcome::Rejected(vec!(Concern::PersonalInfo)));
        assert_eq!(lenient.enforce(&ALL, CommonStatus::NotCommon, true), Outcome::Accepted);
    }

    #[test]
    fn test_blocked_concerns_hide_warnings() {
        let policy = ClassificationPolicy::default();
        let flags = analyze("testuser");

        // Common blocks; personal info and weak would only warn.
        assert_eq!(policy.enforce(&flags, CommonStatus::Common, true), Outcome::Rejected(vec!(Concern::CommonPassword)));
        assert_eq!(
            policy.enforce(&flags, CommonStatus::NotCommon, true),
            Outcome::Warned(vec!(Concern::PersonalInfo, Concern::Weak)));
    }

    #[test]
    fn test_settings_parse() -> Result<(), AuditError> {
        assert_eq!(WeaknessRule::from_str("Strict")?, WeaknessRule::Strict);
        assert_eq!(Enforcement::from_str("Ignore")?, Enforcement::Ignore);
        assert!(Enforcement::from_str("block").is_err());
        Ok(())
    }
}
