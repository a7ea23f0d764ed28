//! # PunchSync App
//!
//! Command-line application layer.
//!
//! This crate contains:
//! - The `punchsync` command-line definition
//! - Command handlers
//! - Application context (dependency injection)
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

use std::process::ExitCode;

use anyhow::Context;

pub use cli::{Cli, Commands, ConfigCommand};
pub use context::AppContext;
use crate::utils::logging::{self, LogOptions};

/// Execute a parsed command line.
pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let succeeded = dispatch(cli).await?;
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn dispatch(cli: Cli) -> anyhow::Result<bool> {
    if let Commands::Config(ConfigCommand::Init { path, force }) = &cli.command {
        return commands::config::init(path, *force);
    }

    let context = AppContext::load(cli.config.as_deref()).context("cannot load configuration")?;
    let _log_guard = logging::init(
        LogOptions { verbose: cli.verbose, json: cli.json },
        &context.config().logging,
    )?;

    match cli.command {
        Commands::Run => commands::run::run(&context).await,
        Commands::Sync => commands::sync::sync_once(&context).await,
        Commands::Status => commands::sync::status(&context),
        Commands::Test => commands::connection::test_connection(&context).await,
        Commands::Fetch { from, to, output } => {
            commands::records::fetch(&context, &from, &to, output.as_deref()).await
        }
        Commands::Send { input } => commands::records::send(&context, &input).await,
        Commands::Config(ConfigCommand::Show) => commands::config::show(&context),
        Commands::Config(ConfigCommand::Init { path, force }) => {
            commands::config::init(&path, force)
        }
    }
}
