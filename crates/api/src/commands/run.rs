//! Long-running mode

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use punchsync_domain::{EnginePhase, SyncStatus};
use tokio::time::Instant;
use tracing::{error, info};

use crate::context::AppContext;

/// How often the engine phase is checked for a tripped circuit.
const PHASE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Start the engine and keep it running until Ctrl-C or a tripped circuit.
pub async fn run(context: &AppContext) -> anyhow::Result<bool> {
    run_until(context, async {
        tokio::signal::ctrl_c().await.context("cannot listen for Ctrl-C")
    })
    .await
}

/// Run the engine until `shutdown` resolves or the circuit opens.
///
/// Returns `false` when the circuit breaker stopped the engine, so a
/// supervisor sees a failing exit status. The status snapshot is logged
/// once per polling interval while running.
pub async fn run_until<F>(context: &AppContext, shutdown: F) -> anyhow::Result<bool>
where
    F: Future<Output = anyhow::Result<()>>,
{
    let config = context.config();
    info!(
        device = %config.device_address(),
        endpoint = %config.endpoint.url,
        polling_interval_secs = config.sync.polling_interval_seconds,
        "Starting punchsync"
    );

    context.engine.start().await;

    tokio::pin!(shutdown);
    let mut checks = tokio::time::interval(PHASE_CHECK_INTERVAL);
    let mut last_report = Instant::now();
    let result = loop {
        tokio::select! {
            signal = &mut shutdown => {
                info!("Interrupt received");
                break signal.map(|()| true);
            }
            _ = checks.tick() => {
                let status = context.engine.status();
                if status.phase == EnginePhase::CircuitOpen {
                    error!(
                        error_count = status.error_count,
                        "Circuit breaker tripped, exiting"
                    );
                    break Ok(false);
                }
                if last_report.elapsed() >= status.config.sync.polling_interval() {
                    log_status(&status, "Engine status");
                    last_report = Instant::now();
                }
            }
        }
    };

    context.shutdown().await;
    log_status(&context.engine.status(), "Stopped");
    result
}

fn log_status(status: &SyncStatus, message: &str) {
    info!(
        phase = %status.phase,
        error_count = status.error_count,
        last_check = ?status.last_check.map(|at| at.to_string()),
        last_successful_sync = ?status.last_successful_sync.map(|at| at.to_string()),
        "{}",
        message
    );
}
