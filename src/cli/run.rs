//! `run` and `clear-cache` commands

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::{info, warn};

use super::render::{self, OutputFormat};
use crate::config::AppConfig;
use crate::domain::DomainError;
use crate::infrastructure::logging;
use crate::infrastructure::services::{CacheMode, SnapshotRequest, SummaryMode};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Exact (or, with --fuzzy, approximate) Steam game title
    pub game: String,

    /// Number of reviews to summarize
    #[arg(long, default_value_t = 3)]
    pub count: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Also save the report as JSON to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Accept the closest title when there is no exact match
    #[arg(long)]
    pub fuzzy: bool,

    /// Summary cache file (defaults to the configured cache path)
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Ignore cached summaries and ask the model again
    #[arg(long)]
    pub no_cache: bool,

    /// One summary for all reviews, or one per review
    #[arg(long, value_enum, default_value_t = ModeArg::Aggregate)]
    pub mode: ModeArg,

    /// Verbose logging and raw reviews in the report
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args)]
pub struct ClearCacheArgs {
    /// Summary cache file (defaults to the configured cache path)
    #[arg(long)]
    pub cache_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Aggregate,
    PerReview,
}

impl From<ModeArg> for SummaryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Aggregate => SummaryMode::Aggregate,
            ModeArg::PerReview => SummaryMode::PerReview,
        }
    }
}

impl RunArgs {
    fn to_request(&self, cache_enabled: bool) -> SnapshotRequest {
        let cache_mode = if !cache_enabled {
            CacheMode::Disabled
        } else if self.no_cache {
            CacheMode::Refresh
        } else {
            CacheMode::ReadWrite
        };

        SnapshotRequest::new(&self.game, self.count)
            .with_fuzzy(self.fuzzy)
            .with_cache_mode(cache_mode)
            .with_mode(self.mode.into())
            .with_reviews(self.debug)
    }
}

/// Run the snapshot pipeline and print the report
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.debug);

    let max = config.catalog.max_reviews;
    if args.count == 0 || args.count > max {
        return Err(DomainError::invalid_argument(format!(
            "--count must be between 1 and {}, got {}",
            max, args.count
        ))
        .into());
    }

    let cache_path = cache_path(&config, args.cache_file.clone());
    if cache_path.is_none() {
        info!("No cache path configured, summary caching disabled");
    }

    let service = crate::create_snapshot_service(&config, cache_path.as_deref())?;
    let report = service.run(&args.to_request(cache_path.is_some())).await?;

    let rendered = render::render(&report, args.format)?;
    std::io::stdout().write_all(rendered.as_bytes())?;

    if let Some(out) = &args.out {
        render::write_json(&report, out)?;
        info!(path = %out.display(), "Saved report");
    }

    Ok(())
}

/// Remove every cached summary
pub async fn clear_cache(args: ClearCacheArgs) -> anyhow::Result<()> {
    let config = load_config(false);
    let Some(cache_path) = cache_path(&config, args.cache_file) else {
        println!("No cache path configured, nothing to clear");
        return Ok(());
    };

    let removed = crate::open_summary_cache(Some(&cache_path)).clear().await?;
    println!("Removed {} cached summaries from {}", removed, cache_path.display());

    Ok(())
}

fn load_config(debug: bool) -> AppConfig {
    dotenvy::dotenv().ok();

    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    logging::init_logging(&config.logging, debug);

    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    config
}

/// The flag wins; an empty configured path turns caching off
fn cache_path(config: &AppConfig, flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        let configured = config.cache.path.trim();
        (!configured.is_empty()).then(|| PathBuf::from(configured))
    })
}
