//! End-to-end snapshot orchestration: resolve, collect, summarize

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::summarizer_service::SummarizerService;
use super::summary_cache_service::{CacheMode, CachedSummary, SummaryCacheService};
use crate::domain::cache::CacheKey;
use crate::domain::catalog::{CatalogEntry, Review, ReviewCollector, TitleResolver};
use crate::domain::summary::{ReviewSnapshot, SnapshotReport};
use crate::domain::DomainError;

/// Granularity of the generated summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryMode {
    /// One summary for the whole review set
    #[default]
    Aggregate,
    /// One summary per review
    PerReview,
}

/// Parameters of a single snapshot run
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRequest {
    pub query: String,
    pub count: usize,
    pub fuzzy: bool,
    pub cache_mode: CacheMode,
    pub mode: SummaryMode,
    pub include_reviews: bool,
}

impl SnapshotRequest {
    pub fn new(query: impl Into<String>, count: usize) -> Self {
        Self {
            query: query.into(),
            count,
            fuzzy: false,
            cache_mode: CacheMode::default(),
            mode: SummaryMode::default(),
            include_reviews: false,
        }
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn with_mode(mut self, mode: SummaryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_reviews(mut self, include_reviews: bool) -> Self {
        self.include_reviews = include_reviews;
        self
    }
}

/// Runs the resolve → collect → summarize pipeline for one title
#[derive(Debug)]
pub struct SnapshotService {
    resolver: TitleResolver,
    collector: ReviewCollector,
    summarizer: Arc<SummarizerService>,
    cache: SummaryCacheService,
}

impl SnapshotService {
    pub fn new(
        resolver: TitleResolver,
        collector: ReviewCollector,
        summarizer: Arc<SummarizerService>,
        cache: SummaryCacheService,
    ) -> Self {
        Self {
            resolver,
            collector,
            summarizer,
            cache,
        }
    }

    pub async fn run(&self, request: &SnapshotRequest) -> Result<SnapshotReport, DomainError> {
        let entry = self.resolver.resolve(&request.query, request.fuzzy).await?;
        let reviews = self.collector.collect(&entry, request.count).await?;

        info!(
            app_id = %entry.app_id(),
            title = entry.title(),
            reviews = reviews.len(),
            mode = ?request.mode,
            "Collected reviews"
        );

        let mut report = SnapshotReport {
            entry,
            review_count: reviews.len(),
            summary: None,
            from_cache: false,
            snapshots: Vec::new(),
            reviews: None,
        };

        if !reviews.is_empty() {
            match request.mode {
                SummaryMode::Aggregate => {
                    let cached = self
                        .summarize_cached(&report.entry, &reviews, request.cache_mode)
                        .await?;
                    report.summary = Some(cached.summary);
                    report.from_cache = cached.from_cache;
                }
                SummaryMode::PerReview => {
                    report.snapshots = self
                        .summarize_each(&report.entry, &reviews, request.cache_mode)
                        .await;
                    report.from_cache =
                        report.snapshots.iter().all(|snapshot| snapshot.from_cache);
                }
            }
        }

        if request.include_reviews {
            report.reviews = Some(reviews);
        }

        Ok(report)
    }

    async fn summarize_cached(
        &self,
        entry: &CatalogEntry,
        reviews: &[Review],
        cache_mode: CacheMode,
    ) -> Result<CachedSummary, DomainError> {
        let key = CacheKey::derive(entry.app_id(), reviews, &self.summarizer.version_tag());

        self.cache
            .get_or_compute(&key, cache_mode, || self.summarizer.summarize(reviews))
            .await
    }

    async fn summarize_each(
        &self,
        entry: &CatalogEntry,
        reviews: &[Review],
        cache_mode: CacheMode,
    ) -> Vec<ReviewSnapshot> {
        let mut snapshots = Vec::with_capacity(reviews.len());

        for (index, review) in reviews.iter().enumerate() {
            let single = std::slice::from_ref(review);

            let snapshot = match self.summarize_cached(entry, single, cache_mode).await {
                Ok(cached) => ReviewSnapshot::summarised(review, cached.summary, cached.from_cache),
                Err(e) => {
                    warn!(app_id = %entry.app_id(), review = index + 1, error = %e, "Review summary failed");
                    ReviewSnapshot::failed(review, &e)
                }
            };

            snapshots.push(snapshot);
        }

        snapshots
    }
}
