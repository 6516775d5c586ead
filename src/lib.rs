//! Review Snapshot
//!
//! Resolves a Steam game title, pulls its most helpful reviews and asks
//! Gemini for a one-sentence verdict, caching summaries on disk.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use domain::{CatalogApi, DomainError, ReviewCollector, SummaryStore, TitleResolver};
use infrastructure::{
    cache::{InMemorySummaryStore, JsonFileSummaryStore},
    catalog::SteamCatalogClient,
    http::{Fetcher, HttpClient},
    llm::GeminiProvider,
    services::{SnapshotService, SummarizerService, SummaryCacheService},
};
use tracing::debug;

/// Opens the summary cache at `path`, or a throwaway in-memory one without a path
pub fn open_summary_cache(path: Option<&Path>) -> SummaryCacheService {
    let store: Arc<dyn SummaryStore> = match path {
        Some(path) => Arc::new(JsonFileSummaryStore::open(path)),
        None => Arc::new(InMemorySummaryStore::new()),
    };
    SummaryCacheService::new(store)
}

/// Wires the Steam client, Gemini provider and summary cache into a [`SnapshotService`]
pub fn create_snapshot_service(
    config: &AppConfig,
    cache_path: Option<&Path>,
) -> Result<SnapshotService, DomainError> {
    let api_key = config.summarizer.resolve_api_key().ok_or_else(|| {
        DomainError::configuration(
            "Gemini API key missing: set GEMINI_API_KEY or APP__SUMMARIZER__API_KEY",
        )
    })?;

    let catalog_http = HttpClient::with_timeout(Duration::from_secs(config.catalog.timeout_secs))?;
    let catalog: Arc<dyn CatalogApi> = Arc::new(SteamCatalogClient::new(
        Fetcher::new(catalog_http, config.catalog.retry.to_policy()),
        config.catalog.steam_api(),
    ));

    let llm_http =
        HttpClient::with_timeout(Duration::from_secs(config.summarizer.timeout_secs))?;
    let provider = Arc::new(GeminiProvider::with_base_url(
        llm_http,
        api_key,
        config.summarizer.base_url.clone(),
    ));

    let summarizer = SummarizerService::with_config(provider, config.summarizer.summarizer());

    debug!(
        model = %config.summarizer.model,
        cache = ?cache_path,
        "Snapshot service configured"
    );

    Ok(SnapshotService::new(
        TitleResolver::with_config(catalog.clone(), config.catalog.matching()),
        ReviewCollector::with_config(catalog, config.catalog.collector()),
        Arc::new(summarizer),
        open_summary_cache(cache_path),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::cache::CacheKey;
    use domain::summary::{Sentiment, Summary};
    use infrastructure::services::CacheMode;

    #[tokio::test]
    async fn test_cache_without_path_keeps_summaries_in_memory() {
        let cache = open_summary_cache(None);
        let key = CacheKey::from_raw("k");

        let first = cache
            .get_or_compute(&key, CacheMode::ReadWrite, || async {
                Summary::new(Sentiment::Pos, "Kept in memory only.")
            })
            .await
            .unwrap();
        let second = cache
            .get_or_compute(&key, CacheMode::ReadWrite, || async {
                Summary::new(Sentiment::Neg, "Never computed.")
            })
            .await
            .unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.summary.tldr, "Kept in memory only.");
        assert_eq!(cache.clear().await.unwrap(), 1);
    }
}
