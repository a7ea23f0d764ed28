//! One-shot synchronization and status

use crate::context::AppContext;
use crate::utils::output::print_json;

/// Run a single cycle and print its outcome.
pub async fn sync_once(context: &AppContext) -> anyhow::Result<bool> {
    let outcome = context.engine.force_sync().await;
    print_json(&outcome)?;
    Ok(outcome.succeeded())
}

/// Print the effective config with the snapshot of this process's engine.
///
/// The engine here is freshly built and idle. A separate `punchsync run`
/// process reports its own status in its log once per polling interval.
pub fn status(context: &AppContext) -> anyhow::Result<bool> {
    print_json(&context.engine.status())?;
    Ok(true)
}
