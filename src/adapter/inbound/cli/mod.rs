//! CLI module graph and command dispatch.

pub mod allocate;
pub mod check;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod output;
pub mod profile;
pub mod record;
pub mod risk;

use command::{CheckCommand, Cli, Commands, ConfigCommand};

/// Run the parsed command line.
///
/// # Errors
///
/// Returns a rendered diagnostic for any failure.
pub async fn execute(cli: Cli) -> miette::Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Allocate(args) => allocate::execute(&args).await,
        Commands::Record(args) => record::execute(&args),
        Commands::Risk(args) => risk::execute(&args),
        Commands::Profiles(args) => profile::list(args.config.as_deref()),
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config),
        Commands::Check(CheckCommand::Database(args)) => check::execute_database(&args.config),
    }
}
