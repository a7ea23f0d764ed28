//! Configuration inspection and bootstrap

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use punchsync_domain::Config;
use punchsync_infra::config::save_to_file;

use crate::context::AppContext;

pub fn show(context: &AppContext) -> anyhow::Result<bool> {
    let rendered =
        toml::to_string_pretty(&context.config()).context("cannot render configuration")?;
    let mut stdout = std::io::stdout().lock();
    if let Some(path) = &context.config_path {
        writeln!(stdout, "# {}", path.display())?;
    }
    write!(stdout, "{rendered}")?;
    Ok(true)
}

/// Write defaults to `path`. An existing file is kept unless `force`.
pub fn init(path: &Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    save_to_file(&Config::default(), path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Wrote default configuration to {}", path.display())?;
    Ok(true)
}
