//! JSON rendering for command results

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use punchsync_domain::AttendanceRecord;
use serde::Serialize;

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("cannot render JSON")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").context("cannot write to stdout")?;
    Ok(())
}

/// Write records to `path` in the endpoint wire format.
pub fn write_records(path: &Path, records: &[AttendanceRecord]) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(records).context("cannot render records")?;
    std::fs::write(path, rendered).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

/// Read a wire-format JSON array of records.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<AttendanceRecord>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of attendance records", path.display()))
}
