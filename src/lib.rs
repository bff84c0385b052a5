pub mod db;
pub mod model;
pub mod services;
pub mod utils;

use db::snapshot;
use tokio::signal;
use dotenv::dotenv;
use std::sync::Arc;
use futures::StreamExt;
use utils::errors::AuditError;
use utils::context::AuditContext;
use crate::utils::errors::ErrorCode;
use utils::config::{Configuration, self};
use tokio::sync::oneshot::{self};
use services::{audit_accounts::{self, AuditEvent}, report};
use opentelemetry::{global, sdk::{propagation::TraceContextPropagator,trace,trace::Sampler}};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

const APP_NAME: &str = "pwaudit";

///
/// Entry point to run an offline audit over the account snapshot.
///
pub async fn lib_main() -> Result<(), AuditError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    config::default_env("RUST_LOG", "INFO");

    // Load the engine configuration into struct.
    let config = Configuration::from_env()?;

    // Initialise open-telemetry distributed tracing.
    let tracing = init_tracing(&config)?;

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    // The context gives every flow access to the dictionary, policies, clock and account locks.
    let ctx = Arc::new(AuditContext::new(config.clone())?);

    let store = Arc::new(snapshot::load(&config.accounts_path).await?);

    let mut audit = audit_accounts::start_audit(ctx.clone(), store.clone());
    tracing::info!("Started audit job {}", audit.job_id());

    // SIGINT/ctrl+c stops the audit after the account in hand.
    let (signal_tx, signal_rx) = oneshot::channel();
    let _signal = tokio::spawn(wait_for_signal(signal_tx));
    let cancel = audit.cancel_signal();
    tokio::spawn(async move {
        if signal_rx.await.is_ok() {
            cancel.cancel();
        }
    });

    if let Some(mut events) = audit.events() {
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let AuditEvent::AccountAudited { email, used_personal_info: true } = event {
                    tracing::info!("Account {} has a password derived from personal information", email);
                }
            }
        });
    }

    let audit_report = audit.wait().await?;

    for failed in &audit_report.failed {
        tracing::error!("Account {} could not be audited: {}", failed.email, failed.message);
    }

    // A cancelled audit still saves whatever it completed.
    snapshot::save(&*store, &config.accounts_path).await?;

    let summary = report::summarize(&*store, ctx.policy());
    tracing::info!("Audit {} complete\n{}", audit_report.job_id, summary.fmt_console());

    if tracing {
        opentelemetry::global::shutdown_tracer_provider(); // sending remaining spans
    }

    Ok(())
}

///
/// Sends a oneshot signal when a SIGINT is received (Ctrl+C)
///
async fn wait_for_signal(tx: oneshot::Sender<()>) {
    let _ = signal::ctrl_c().await;
    tracing::info!("SIGINT received: cancelling audit");
    let _ = tx.send(());
}

///
/// Initialise tracing and plug-in the Jaeger feature if enabled.
///
fn init_tracing(config: &Configuration) -> Result<bool, AuditError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    match config.distributed_tracing {
        true => { // Install the Jaeger pipeline.
            let tracer = opentelemetry_jaeger::new_pipeline()
                .with_service_name(APP_NAME)
                .with_trace_config(trace::config().with_sampler(Sampler::AlwaysOn))
                .with_agent_endpoint(config.jaeger_endpoint.clone().unwrap_or_default())
                .install_batch(opentelemetry::runtime::Tokio)
                .map_err(|err| ErrorCode::ConfigError.with_msg(&format!("Unable to build Jaeger pipeline: {}", err)))?;

            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init() {
                    tracing::info!("Tracing already initialised: {}", err.to_string());
            }

            Ok(true)
        },
        false => {
            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
                .try_init() {
                    tracing::info!("Tracing already initialised: {}", err.to_string());
            }

            Ok(false)
        }
    }
}

const BANNER: &str = r#"
                                   .___.__  __
________  _  _______    __ __  __| _/|__|/  |_
\____ \ \/ \/ /\__  \  |  |  \/ __ | |  \   __\
|  |_> >     /  / __ \_|  |  / /_/ | |  ||  |
|   __/ \/\_/  (____  /|____/\____ | |__||__|
|__|                \/            \/
"#;
