//! PunchSync - attendance punch synchronization
//!
//! Main entry point for the command-line application.

use std::process::ExitCode;

use clap::Parser;
use punchsync_app::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    punchsync_app::execute(cli).await
}
