use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod session;
mod templates;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(&args).await.map(|()| ExitCode::SUCCESS),
        Commands::Health(args) => commands::health::run(&args).await,
    }
}
