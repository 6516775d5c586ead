//! CLI module for Review Snapshot
//!
//! Provides subcommands:
//! - `run`: summarize reviews for a game title
//! - `clear-cache`: drop every cached summary

pub mod render;
pub mod run;

use clap::{Parser, Subcommand};

use crate::domain::{DomainError, ErrorKind};

/// Review Snapshot - One-sentence verdicts from Steam reviews
#[derive(Parser)]
#[command(name = "review-snapshot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch reviews for a game and summarize them
    Run(run::RunArgs),

    /// Remove every cached summary
    ClearCache(run::ClearCacheArgs),
}

/// Process exit code for a failed command
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let Some(domain) = error.downcast_ref::<DomainError>() else {
        return 1;
    };

    match domain.kind() {
        ErrorKind::InvalidArgument => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::UpstreamUnavailable => 4,
        ErrorKind::MalformedResponse => 5,
        ErrorKind::Summarization => 6,
        ErrorKind::Configuration | ErrorKind::Storage => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes: Vec<u8> = [
            DomainError::invalid_argument("x"),
            DomainError::not_found("x"),
            DomainError::upstream_unavailable(3, "x"),
            DomainError::malformed_response("x"),
            DomainError::summarization("x"),
        ]
        .into_iter()
        .map(|e| exit_code(&anyhow::Error::new(e)))
        .collect();

        assert_eq!(codes, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("disk on fire")), 1);
        assert_eq!(exit_code(&anyhow::Error::new(DomainError::configuration("no key"))), 1);
    }

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::parse_from([
            "review-snapshot",
            "run",
            "Half-Life",
            "--count",
            "5",
            "--fuzzy",
            "--format",
            "json",
            "--mode",
            "per-review",
            "--no-cache",
        ]);

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.game, "Half-Life");
        assert_eq!(args.count, 5);
        assert!(args.fuzzy);
        assert!(args.no_cache);
        assert_eq!(args.format, render::OutputFormat::Json);
        assert_eq!(args.mode, run::ModeArg::PerReview);
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["review-snapshot", "run", "Halo"]);

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.count, 3);
        assert_eq!(args.format, render::OutputFormat::Table);
        assert_eq!(args.mode, run::ModeArg::Aggregate);
        assert!(args.cache_file.is_none());
    }
}
