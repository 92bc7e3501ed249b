use bankroll::adapter::inbound::cli::command::Cli;
use bankroll::adapter::inbound::cli::execute;
use clap::Parser;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    execute(cli).await
}
