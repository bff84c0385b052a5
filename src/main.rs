use pwaudit::utils::errors::{AuditError, ErrorCode};

fn main() -> Result<(), AuditError> {
    tokio::runtime::Builder::new_multi_thread()
        // Cap the number of blocking threads - every hash-only check runs dozens of slow
        // verifications so constraining here prohibits too much resource use.
        .max_blocking_threads(num_cpus::get())
        .enable_all()
        .build()
        .map_err(|err| ErrorCode::AuditThreadingIssue.with_msg(&format!("Unable to start the runtime: {}", err)))?
        .block_on(async {
            pwaudit::lib_main().await
        })
}
