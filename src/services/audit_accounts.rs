use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use chrono::{DateTime, Utc};
use tracing::Instrument;
use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::UnboundedReceiverStream;
use crate::{db::AccountStore, model::personal, utils::{self, context::AuditContext, errors::AuditError}};

///
/// Progress notifications from a running audit, one per account.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum AuditEvent {
    AccountAudited { email: String, used_personal_info: bool },
    AccountFailed { email: String, message: String },
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FailedAccount {
    pub email: String,
    pub error_code: u32,
    pub message: String,
}

///
/// The result of a finished (or cancelled) audit job.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AuditReport {
    pub job_id: String,
    pub started_on: DateTime<Utc>,
    pub completed_on: DateTime<Utc>,
    pub audited: usize,
    pub flagged: Vec<String>,
    pub failed: Vec<FailedAccount>,
    pub cancelled: bool,
}

///
/// Cancels the audit it came from. Cheap to clone and hand to another task.
///
#[derive(Clone, Debug)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///
/// A running audit job. Dropping the handle does not stop the job - call cancel for that.
///
pub struct AuditHandle {
    job_id: String,
    cancel: CancelSignal,
    events: Option<mpsc::UnboundedReceiver<AuditEvent>>,
    task: JoinHandle<AuditReport>,
}

impl AuditHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    ///
    /// Ask the job to stop. It finishes the account in hand first.
    ///
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    ///
    /// The job's progress events. Only available once - later calls return None.
    ///
    pub fn events(&mut self) -> Option<UnboundedReceiverStream<AuditEvent>> {
        self.events.take().map(UnboundedReceiverStream::new)
    }

    ///
    /// Wait for the job to finish and collect its report.
    ///
    pub async fn wait(self) -> Result<AuditReport, AuditError> {
        Ok(self.task.await?)
    }
}

///
/// Re-check every account's stored hash against its owner's personal wordlist, in the background.
///
/// Returns immediately. Accounts which can't be checked (a corrupt hash, a vanished account) are
/// reported in the result and the job moves on. Cancellation is checked before each account.
///
pub fn start_audit(ctx: Arc<AuditContext>, store: Arc<dyn AccountStore>) -> AuditHandle {
    let job_id = utils::generate_id();
    let cancel = CancelSignal(Arc::new(AtomicBool::new(false)));
    let (tx, rx) = mpsc::unbounded_channel();

    let span = tracing::info_span!("audit", job_id = %job_id);
    let task = tokio::spawn(run_audit(job_id.clone(), ctx, store, cancel.clone(), tx).instrument(span));

    AuditHandle { job_id, cancel, events: Some(rx), task }
}

async fn run_audit(job_id: String, ctx: Arc<AuditContext>, store: Arc<dyn AccountStore>, cancel: CancelSignal, tx: mpsc::UnboundedSender<AuditEvent>)
    -> AuditReport {

    let emails = store.emails();
    tracing::info!("Audit started over {} accounts", emails.len());

    let mut report = AuditReport {
        job_id,
        started_on: ctx.now(),
        completed_on: ctx.now(),
        audited: 0,
        flagged: vec!(),
        failed: vec!(),
        cancelled: false,
    };

    for email in emails {
        if cancel.is_cancelled() {
            tracing::info!("Audit cancelled after {} accounts", report.audited + report.failed.len());
            report.cancelled = true;
            break;
        }

        let event = match audit_account(&ctx, store.as_ref(), &email).await {
            Ok(used_personal_info) => {
                report.audited += 1;
                if used_personal_info {
                    report.flagged.push(email.clone());
                }
                AuditEvent::AccountAudited { email, used_personal_info }
            },
            Err(err) => {
                tracing::warn!("Unable to audit account {}: {}", email, err);
                report.failed.push(FailedAccount {
                    email: email.clone(),
                    error_code: err.error_code() as u32,
                    message: err.message().to_string(),
                });
                AuditEvent::AccountFailed { email, message: err.message().to_string() }
            },
        };

        // Nobody listening to events is fine - the report still has everything.
        if let Err(err) = tx.send(event) {
            tracing::trace!("Audit event dropped: {:?}", err.0);
        }
    }

    report.completed_on = ctx.now();
    tracing::info!("Audit finished: {} audited, {} flagged, {} failed",
        report.audited, report.flagged.len(), report.failed.len());

    report
}

///
/// Re-evaluate one account's personal information flag from its stored hash and save it.
///
/// The hash can only reveal a password that IS a derived word, not one that merely contains one, so
/// the audit only ever raises the flag. An account already flagged when its plain text was checked
/// keeps the flag and isn't re-hashed. Returns the flag as saved.
///
/// Holds the account's write lock throughout so the hash can't change underneath us.
///
pub async fn audit_account(ctx: &AuditContext, store: &dyn AccountStore, email: &str) -> Result<bool, AuditError> {
    let _lock = ctx.account_lock(email).await;
    let account = store.load(email)?;
    let mut verdict = account.verdict;

    if !verdict.used_personal_info {
        // Dozens of slow-hash verifications - run them on the blocking pool.
        let phc = verdict.phc.clone();
        let record = account.record;
        verdict.used_personal_info = tokio::task::spawn_blocking(move || personal::matches_hash(&phc, &record))
            .await
            .map_err(AuditError::from)?
            ?;
    }

    tracing::debug!("Account {} audited", email);

    verdict.evaluated_on = ctx.now();
    let used_personal_info = verdict.used_personal_info;
    store.save_verdict(verdict)?;

    Ok(used_personal_info)
}
