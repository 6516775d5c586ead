//! Summary caching service

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::cache::{CacheKey, SummaryStore};
use crate::domain::summary::Summary;
use crate::domain::DomainError;

/// How the cache participates in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Look up first, store on miss
    #[default]
    ReadWrite,
    /// Skip the lookup, always compute, still store the result
    Refresh,
    /// Neither read nor write
    Disabled,
}

/// A summary plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSummary {
    pub summary: Summary,
    pub from_cache: bool,
}

/// Memoizes summaries by cache key
#[derive(Debug, Clone)]
pub struct SummaryCacheService {
    store: Arc<dyn SummaryStore>,
}

impl SummaryCacheService {
    pub fn new(store: Arc<dyn SummaryStore>) -> Self {
        Self { store }
    }

    /// Returns the cached summary for `key`, or computes and stores it.
    ///
    /// Errors from `compute` propagate and leave the store untouched.
    /// Store failures are logged and never fail the call.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &CacheKey,
        mode: CacheMode,
        compute: F,
    ) -> Result<CachedSummary, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Summary, DomainError>>,
    {
        if mode == CacheMode::ReadWrite {
            match self.store.get(key).await {
                Ok(Some(summary)) => {
                    debug!(key = %key, "Summary cache hit");
                    return Ok(CachedSummary {
                        summary,
                        from_cache: true,
                    });
                }
                Ok(None) => debug!(key = %key, "Summary cache miss"),
                Err(e) => warn!(key = %key, error = %e, "Summary cache lookup failed, treating as miss"),
            }
        }

        let summary = compute().await?;

        if mode != CacheMode::Disabled {
            if let Err(e) = self.store.put(key, &summary).await {
                warn!(key = %key, error = %e, "Failed to persist summary cache");
            }
        }

        Ok(CachedSummary {
            summary,
            from_cache: false,
        })
    }

    /// Removes every cached summary, returning how many were dropped
    pub async fn clear(&self) -> Result<usize, DomainError> {
        let removed = self.store.len().await?;
        self.store.clear().await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::summary::Sentiment;
    use crate::domain::ErrorKind;
    use crate::infrastructure::cache::InMemorySummaryStore;

    fn summary(tldr: &str) -> Summary {
        Summary::new(Sentiment::Pos, tldr).unwrap()
    }

    fn service() -> (SummaryCacheService, Arc<InMemorySummaryStore>) {
        let store = Arc::new(InMemorySummaryStore::new());
        (SummaryCacheService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let (service, _) = service();
        let key = CacheKey::from_raw("k");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let result = service
                .get_or_compute(&key, CacheMode::ReadWrite, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(summary("Players praise the atmosphere."))
                })
                .await
                .unwrap();
            assert_eq!(result.summary.tldr, "Players praise the atmosphere.");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_reports_from_cache() {
        let (service, store) = service();
        let key = CacheKey::from_raw("k");
        store.put(&key, &summary("Stored earlier.")).await.unwrap();

        let result = service
            .get_or_compute(&key, CacheMode::ReadWrite, || async {
                Err(DomainError::summarization("must not be called"))
            })
            .await
            .unwrap();

        assert!(result.from_cache);
        assert_eq!(result.summary.tldr, "Stored earlier.");
    }

    #[tokio::test]
    async fn test_refresh_recomputes_and_overwrites() {
        let (service, store) = service();
        let key = CacheKey::from_raw("k");
        store.put(&key, &summary("Stale.")).await.unwrap();

        let result = service
            .get_or_compute(&key, CacheMode::Refresh, || async { Ok(summary("Fresh.")) })
            .await
            .unwrap();

        assert!(!result.from_cache);
        assert_eq!(store.get(&key).await.unwrap().unwrap().tldr, "Fresh.");
    }

    #[tokio::test]
    async fn test_disabled_neither_reads_nor_writes() {
        let (service, store) = service();
        let key = CacheKey::from_raw("k");
        store.put(&key, &summary("Ignored.")).await.unwrap();

        let result = service
            .get_or_compute(&key, CacheMode::Disabled, || async { Ok(summary("Computed.")) })
            .await
            .unwrap();

        assert_eq!(result.summary.tldr, "Computed.");
        assert_eq!(store.get(&key).await.unwrap().unwrap().tldr, "Ignored.");
    }

    #[tokio::test]
    async fn test_compute_error_is_not_stored() {
        let (service, store) = service();
        let key = CacheKey::from_raw("k");

        let err = service
            .get_or_compute(&key, CacheMode::ReadWrite, || async {
                Err(DomainError::summarization("empty tldr"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Summarization);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_still_returns_summary() {
        let store = Arc::new(InMemorySummaryStore::new().with_write_error("read-only disk"));
        let service = SummaryCacheService::new(store);

        let result = service
            .get_or_compute(&CacheKey::from_raw("k"), CacheMode::ReadWrite, || async {
                Ok(summary("Still returned."))
            })
            .await
            .unwrap();

        assert_eq!(result.summary.tldr, "Still returned.");
    }

    #[tokio::test]
    async fn test_clear_reports_removed_entries() {
        let (service, store) = service();
        store.put(&CacheKey::from_raw("a"), &summary("One.")).await.unwrap();
        store.put(&CacheKey::from_raw("b"), &summary("Two.")).await.unwrap();

        assert_eq!(service.clear().await.unwrap(), 2);
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
