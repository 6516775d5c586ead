//! Summary store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::CacheKey;
use crate::domain::summary::Summary;
use crate::domain::DomainError;

/// Persistent key-value store of summaries.
///
/// `put` and `clear` update the in-memory view first and then persist it;
/// an `Err` from them means only the persistence step failed.
#[async_trait]
pub trait SummaryStore: Send + Sync + Debug {
    /// Gets the summary stored under `key`
    async fn get(&self, key: &CacheKey) -> Result<Option<Summary>, DomainError>;

    /// Stores `summary` under `key`, replacing any previous value
    async fn put(&self, key: &CacheKey, summary: &Summary) -> Result<(), DomainError>;

    /// Removes every entry
    async fn clear(&self) -> Result<(), DomainError>;

    /// Number of stored entries
    async fn len(&self) -> Result<usize, DomainError>;
}
