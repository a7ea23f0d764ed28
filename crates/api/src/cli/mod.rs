//! Command-line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mirror attendance punches from a time-clock terminal to an HTTP endpoint.
#[derive(Parser, Debug)]
#[command(name = "punchsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or TOML, chosen by extension)
    #[arg(global = true, short, long)]
    pub config: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(global = true, short, long)]
    pub verbose: bool,

    /// Emit log lines on stderr as JSON
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sync loop until Ctrl-C; exits non-zero if the circuit breaker trips
    Run,

    /// Run one synchronization cycle now
    Sync,

    /// Print the effective config and an idle status snapshot as JSON
    Status,

    /// Check that the terminal and the endpoint are reachable
    Test,

    /// Fetch punches in an inclusive time range
    Fetch {
        /// Range start, `YYYY-MM-DD HH:MM:SS`
        #[arg(long)]
        from: String,

        /// Range end, `YYYY-MM-DD HH:MM:SS`
        #[arg(long)]
        to: String,

        /// Write the records to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Deliver punches from a JSON file
    Send {
        /// JSON array in the endpoint wire format
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect or create configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration to a file
    Init {
        /// Target file
        #[arg(short, long, default_value = "punchsync.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fetch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "punchsync",
            "fetch",
            "--from",
            "2024-05-01 00:00:00",
            "--to",
            "2024-05-01 23:59:59",
            "--config",
            "site.toml",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        match cli.command {
            Commands::Fetch { from, to, output } => {
                assert_eq!(from, "2024-05-01 00:00:00");
                assert_eq!(to, "2024-05-01 23:59:59");
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_init_defaults_path() {
        let cli = Cli::try_parse_from(["punchsync", "config", "init"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommand::Init { path, force }) => {
                assert_eq!(path, PathBuf::from("punchsync.toml"));
                assert!(!force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn send_requires_input() {
        assert!(Cli::try_parse_from(["punchsync", "send"]).is_err());
    }
}
