//! Connectivity check

use punchsync_infra::detect_port;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::utils::output::print_json;

/// Probe both sides. When the terminal does not answer on its configured
/// port, scan the candidate ports and log any that is open.
pub async fn test_connection(context: &AppContext) -> anyhow::Result<bool> {
    let report = context.engine.test_connection().await;
    print_json(&report)?;

    if !report.device_reachable {
        let device = context.config().device;
        match detect_port(&device.ip, &device.candidate_ports).await {
            Some(port) if port != device.port => {
                warn!(
                    ip = %device.ip,
                    configured = device.port,
                    open = port,
                    "Terminal answers on another port"
                );
            }
            Some(_) => {}
            None => info!(ip = %device.ip, "No candidate port is open on the terminal"),
        }
    }

    Ok(report.all_reachable())
}
