use std::process::ExitCode;

use clap::Parser;
use review_snapshot::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => cli::run::run(args).await,
        Command::ClearCache(args) => cli::run::clear_cache(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
