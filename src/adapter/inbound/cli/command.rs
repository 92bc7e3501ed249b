//! Command-line interface definitions.
//!
//! Defines the CLI structure for the bankroll application using `clap`.
//! Subcommands cover allocation cycles, recording realized portfolio values,
//! inspecting risk, listing strategy profiles, and validating configuration.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Kelly-based capital allocation and risk monitoring for forecasts
#[derive(Parser, Debug)]
#[command(name = "bankroll")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the bankroll CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one allocation cycle over a forecast batch
    Allocate(AllocateArgs),

    /// Record a realized portfolio value for a strategy
    Record(RecordArgs),

    /// Show risk metrics and position reduction for strategies
    Risk(RiskArgs),

    /// List strategy profiles
    Profiles(ProfilesArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `bankroll config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
}

/// Subcommands for `bankroll check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
    /// Open the snapshot database and verify stored histories replay.
    Database(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for `bankroll allocate`.
#[derive(Parser, Debug)]
pub struct AllocateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Forecast batch JSON file, or `-` for stdin
    #[arg(short, long)]
    pub batch: PathBuf,

    /// Only run this strategy (default: every configured strategy)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Ignore recorded risk history when sizing
    #[arg(long)]
    pub no_reduction: bool,
}

/// Arguments for `bankroll record`.
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Strategy the value belongs to
    #[arg(short, long)]
    pub strategy: String,

    /// Realized portfolio value
    #[arg(long)]
    pub value: f64,

    /// Observation time, RFC 3339 (default: now)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for `bankroll risk`.
#[derive(Parser, Debug)]
pub struct RiskArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Only show this strategy
    #[arg(short, long)]
    pub strategy: Option<String>,
}

/// Arguments for `bankroll profiles`.
#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    /// Show the strategies resolved from this configuration file instead of
    /// the built-in presets
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `bankroll config init`.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Path to write
    #[arg(default_value = "config.toml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_record_with_timestamp() {
        let cli = Cli::try_parse_from([
            "bankroll",
            "record",
            "--strategy",
            "balanced",
            "--value",
            "52.5",
            "--at",
            "2026-03-01T00:00:00Z",
        ])
        .unwrap();

        let Commands::Record(args) = cli.command else {
            panic!("expected record");
        };
        assert_eq!(args.strategy, "balanced");
        assert_eq!(args.value, 52.5);
        assert!(args.at.is_some());
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["bankroll", "profiles", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
