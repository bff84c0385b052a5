use tracing::instrument;
use serde::{Deserialize, Serialize};
use crate::{db::{Account, AccountStore}, model::{algorithm, dictionary::CommonStatus, personal, record::PersonalRecord, strength::{self, StrengthFlags}, verdict::{ClassificationPolicy, Concern, Outcome, PasswordStatus, RiskVerdict, classify}}, utils::{context::AuditContext, errors::{AuditError, ErrorCode}}};

///
/// Everything learnt about a plain text password while it was still available.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Assessment {
    pub flags: StrengthFlags,
    pub common: CommonStatus,
    pub used_personal_info: bool,
    pub status: PasswordStatus,
    pub outcome: Outcome,
}

///
/// The verdict that was persisted for a new credential and the assessment that produced it.
///
#[derive(Clone, Debug, PartialEq)]
pub struct AssessedCredential {
    pub verdict: RiskVerdict,
    pub assessment: Assessment,
}

///
/// Run the structural, dictionary and personal information checks on a plain text password.
///
/// Cheap - no hashing is involved.
///
pub fn assess(ctx: &AuditContext, plain_text_password: &str, record: &PersonalRecord, policy: &ClassificationPolicy) -> Assessment {
    let flags = strength::analyze(plain_text_password);
    let common = ctx.common_status(plain_text_password);
    let used_personal_info = personal::matches_plaintext(plain_text_password, record);

    Assessment {
        flags,
        common,
        used_personal_info,
        status: classify(&flags, common, used_personal_info, policy),
        outcome: policy.enforce(&flags, common, used_personal_info),
    }
}

///
/// Assess and hash the first password of a new account, then store the account.
///
/// A password the policy rejects is never hashed or stored.
///
#[instrument(skip(ctx, store, record, plain_text_password, policy), fields(email = %record.email))]
pub async fn register(ctx: &AuditContext, store: &dyn AccountStore, record: PersonalRecord, plain_text_password: &str, policy: &ClassificationPolicy)
    -> Result<AssessedCredential, AuditError> {

    if record.email.trim().is_empty() {
        return Err(ErrorCode::EmailMandatory.with_msg("An account must have an email address"))
    }

    let _lock = ctx.account_lock(&record.email).await;

    if store.load(&record.email).is_ok() {
        return Err(ErrorCode::AccountExists.with_msg(&format!("The account {} already exists", record.email)))
    }

    let assessment = accept(assess(ctx, plain_text_password, &record, policy))?;
    let verdict = hash_into_verdict(ctx, &record.email, plain_text_password, &assessment).await?;

    store.insert(Account { record, verdict: verdict.clone() })?;

    tracing::info!("Registered account with a {} password", assessment.status);
    Ok(AssessedCredential { verdict, assessment })
}

///
/// Replace an account's password. The old password must verify against the stored hash.
///
/// The whole verdict is recomputed for the new password so it never describes a stale hash.
///
#[instrument(skip(ctx, store, old_password, new_password, policy))]
pub async fn reset_password(ctx: &AuditContext, store: &dyn AccountStore, email: &str, old_password: &str, new_password: &str, policy: &ClassificationPolicy)
    -> Result<AssessedCredential, AuditError> {

    let _lock = ctx.account_lock(email).await;
    let account = store.load(email)?;

    // Verifying is as slow as hashing - keep it off the event loop.
    let phc = account.verdict.phc.clone();
    let old_password_copy = old_password.to_string();
    let valid = tokio::task::spawn_blocking(move || algorithm::validate(&old_password_copy, &phc))
        .await
        .map_err(AuditError::from)?
        ?;

    if !valid {
        return Err(ErrorCode::PasswordNotMatch.with_msg("The old password is incorrect"))
    }

    let assessment = accept(assess(ctx, new_password, &account.record, policy))?;
    let verdict = hash_into_verdict(ctx, email, new_password, &assessment).await?;

    store.save_verdict(verdict.clone())?;

    tracing::info!("Password reset to a {} password", assessment.status);
    Ok(AssessedCredential { verdict, assessment })
}

///
/// Turn a rejected assessment into an error listing the concerns.
///
fn accept(assessment: Assessment) -> Result<Assessment, AuditError> {
    match &assessment.outcome {
        Outcome::Rejected(concerns) => Err(ErrorCode::PasswordRejected
            .with_msg(&format!("The password was rejected: {}", describe(concerns)))),
        Outcome::Warned(concerns) => {
            tracing::warn!("Password accepted with concerns: {}", describe(concerns));
            Ok(assessment)
        },
        Outcome::Accepted => Ok(assessment),
    }
}

fn describe(concerns: &[Concern]) -> String {
    concerns
        .iter()
        .map(|concern| concern.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

///
/// Hash the password with the configured algorithm on the blocking thread pool and build the
/// verdict to persist alongside it.
///
async fn hash_into_verdict(ctx: &AuditContext, email: &str, plain_text_password: &str, assessment: &Assessment)
    -> Result<RiskVerdict, AuditError> {

    let hashing_policy = ctx.hashing_policy().clone();
    let plain_text_password = plain_text_password.to_string();
    let phc = tokio::task::spawn_blocking(move || hashing_policy.hash_into_phc(&plain_text_password))
        .await
        .map_err(AuditError::from)?
        ?;

    Ok(RiskVerdict {
        email: email.to_string(),
        phc,
        flags: assessment.flags,
        common_password: assessment.common.as_flag(),
        used_personal_info: assessment.used_personal_info,
        evaluated_on: ctx.now(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dictionary::CommonPasswords;
    use crate::utils::config::Configuration;

    fn ctx() -> AuditContext {
        let config = Configuration { bcrypt_cost: 4, ..Default::default() };
        AuditContext::with_dictionary(config, Some(CommonPasswords::from_lines(vec!("password", "letmein")))).unwrap()
    }

    fn scenario() -> PersonalRecord {
        PersonalRecord {
            fullname: "Test User".to_string(),
            email: "testuser@x.com".to_string(),
            phone: "5551234567".to_string(),
            dob: "1990-05-12".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_assess_strong_password() {
        let ctx = ctx();
        let assessment = assess(&ctx, "Xk9#mQ2!vL", &scenario(), ctx.policy());

        assert_eq!(assessment.common, CommonStatus::NotCommon);
        assert!(!assessment.used_personal_info);
        assert_eq!(assessment.status, PasswordStatus::Strong);
        assert_eq!(assessment.outcome, Outcome::Accepted);
    }

    #[test]
    fn test_assess_personal_password() {
        let ctx = ctx();
        let assessment = assess(&ctx, "Testuser1990", &scenario(), ctx.policy());

        assert!(assessment.used_personal_info);
        assert_eq!(assessment.status, PasswordStatus::Weak);
        assert_eq!(assessment.outcome, Outcome::Warned(vec!(Concern::PersonalInfo)));
    }

    #[test]
    fn test_assess_common_password() {
        let ctx = ctx();
        let assessment = assess(&ctx, "Password", &scenario(), ctx.policy());

        assert_eq!(assessment.common, CommonStatus::Common);
        assert_eq!(assessment.status, PasswordStatus::Common);
        assert_eq!(accept(assessment).unwrap_err().error_code(), ErrorCode::PasswordRejected);
    }
}
