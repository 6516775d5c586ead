//! In-memory summary store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::cache::{CacheKey, SummaryStore};
use crate::domain::summary::Summary;
use crate::domain::DomainError;

/// Non-persistent summary store, used when no cache path is configured
#[derive(Debug, Default)]
pub struct InMemorySummaryStore {
    entries: RwLock<HashMap<CacheKey, Summary>>,
    #[cfg(test)]
    write_error: Option<String>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `put` and `clear` report a persistence failure after
    /// updating memory, mirroring a file store whose disk is unwritable.
    #[cfg(test)]
    pub fn with_write_error(mut self, message: impl Into<String>) -> Self {
        self.write_error = Some(message.into());
        self
    }

    #[cfg(test)]
    fn persisted(&self) -> Result<(), DomainError> {
        match &self.write_error {
            Some(message) => Err(DomainError::storage(message.clone())),
            None => Ok(()),
        }
    }

    #[cfg(not(test))]
    fn persisted(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl SummaryStore for InMemorySummaryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Summary>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::storage("summary store lock poisoned"))?;

        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, summary: &Summary) -> Result<(), DomainError> {
        self.entries
            .write()
            .map_err(|_| DomainError::storage("summary store lock poisoned"))?
            .insert(key.clone(), summary.clone());

        self.persisted()
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries
            .write()
            .map_err(|_| DomainError::storage("summary store lock poisoned"))?
            .clear();

        self.persisted()
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::storage("summary store lock poisoned"))?;

        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::Sentiment;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemorySummaryStore::new();
        let key = CacheKey::from_raw("k");
        let summary = Summary::new(Sentiment::Mixed, "Fun but buggy.").unwrap();

        assert!(store.get(&key).await.unwrap().is_none());
        store.put(&key, &summary).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(summary));
    }

    #[tokio::test]
    async fn test_write_error_still_updates_memory() {
        let store = InMemorySummaryStore::new().with_write_error("disk full");
        let key = CacheKey::from_raw("k");
        let summary = Summary::new(Sentiment::Neg, "Crashes constantly.").unwrap();

        assert!(store.put(&key, &summary).await.is_err());
        assert_eq!(store.len().await.unwrap(), 1);
    }
}
