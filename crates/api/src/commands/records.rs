//! Manual fetch and send

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::context::AppContext;
use crate::utils::output::{print_json, read_records, write_records};

/// Fetch records in `[from, to]`, to `output` or stdout.
pub async fn fetch(
    context: &AppContext,
    from: &str,
    to: &str,
    output: Option<&Path>,
) -> anyhow::Result<bool> {
    let records = context
        .engine
        .fetch_range(from, to)
        .await
        .with_context(|| format!("cannot fetch records between {from} and {to}"))?;

    match output {
        Some(path) => {
            write_records(path, &records)?;
            info!(record_count = records.len(), path = %path.display(), "Records saved");
        }
        None => print_json(&records)?,
    }
    Ok(true)
}

/// Deliver the records stored in `input`.
pub async fn send(context: &AppContext, input: &Path) -> anyhow::Result<bool> {
    let records = read_records(input)?;
    let receipt = context
        .engine
        .send_manual(&records)
        .await
        .with_context(|| format!("cannot deliver records from {}", input.display()))?;
    print_json(&receipt)?;
    Ok(true)
}
