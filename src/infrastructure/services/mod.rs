//! Application services

mod snapshot_service;
mod summarizer_service;
mod summary_cache_service;

pub use snapshot_service::{SnapshotRequest, SnapshotService, SummaryMode};
pub use summarizer_service::{
    LengthPolicy, SummarizerConfig, SummarizerService, DEFAULT_SUMMARY_MODEL,
};
pub use summary_cache_service::{CacheMode, CachedSummary, SummaryCacheService};
