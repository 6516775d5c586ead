//! JSON file backed summary store

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::cache::{CacheKey, SummaryStore};
use crate::domain::summary::Summary;
use crate::domain::DomainError;

/// Default location of the summary cache, relative to the working directory
pub const DEFAULT_CACHE_PATH: &str = ".cache/llm_cache.json";

/// Summary store persisted as a single pretty-printed JSON object.
///
/// Entries are kept sorted by key so that loading and saving an unchanged
/// store reproduces the file byte for byte. A missing, unreadable or corrupt
/// file is treated as an empty store, and entries that do not form a valid
/// summary are dropped on load.
#[derive(Debug)]
pub struct JsonFileSummaryStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<CacheKey, Summary>>,
}

impl JsonFileSummaryStore {
    /// Opens the store at `path`, loading any existing entries
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);

        debug!(path = %path.display(), entries = entries.len(), "Opened summary cache");

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<CacheKey, Summary>>, DomainError> {
        self.entries
            .lock()
            .map_err(|_| DomainError::storage("summary cache lock poisoned"))
    }

    fn persist(&self, entries: &BTreeMap<CacheKey, Summary>) -> Result<(), DomainError> {
        let mut content = serde_json::to_string_pretty(entries)
            .map_err(|e| DomainError::storage(format!("failed to serialize cache: {}", e)))?;
        content.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            DomainError::storage(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DomainError::storage(format!("failed to replace {}: {}", self.path.display(), e))
        })
    }
}

fn load_entries(path: &Path) -> BTreeMap<CacheKey, Summary> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == IoErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Summary cache unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    let raw: BTreeMap<CacheKey, Summary> = match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Summary cache corrupt, starting empty");
            return BTreeMap::new();
        }
    };

    raw.into_iter()
        .filter_map(|(key, entry)| match Summary::new(entry.sentiment, entry.tldr) {
            Ok(summary) => Some((key, summary)),
            Err(e) => {
                warn!(key = %key, error = %e, "Dropping invalid summary cache entry");
                None
            }
        })
        .collect()
}

#[async_trait]
impl SummaryStore for JsonFileSummaryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Summary>, DomainError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, summary: &Summary) -> Result<(), DomainError> {
        let mut entries = self.lock()?;
        entries.insert(key.clone(), summary.clone());
        self.persist(&entries)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut entries = self.lock()?;
        entries.clear();
        self.persist(&entries)
    }

    async fn len(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::Sentiment;
    use crate::domain::ErrorKind;
    use tempfile::TempDir;

    fn summary(tldr: &str) -> Summary {
        Summary::new(Sentiment::Pos, tldr).unwrap()
    }

    #[tokio::test]
    async fn test_put_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("llm_cache.json");

        let store = JsonFileSummaryStore::open(&path);
        store
            .put(&CacheKey::from_raw("k1"), &summary("Players praise the atmosphere."))
            .await
            .unwrap();

        let reopened = JsonFileSummaryStore::open(&path);
        let cached = reopened.get(&CacheKey::from_raw("k1")).await.unwrap().unwrap();
        assert_eq!(cached.tldr, "Players praise the atmosphere.");
        assert_eq!(reopened.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_then_save_is_byte_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm_cache.json");

        let store = JsonFileSummaryStore::open(&path);
        store.put(&CacheKey::from_raw("b"), &summary("Second entry.")).await.unwrap();
        store.put(&CacheKey::from_raw("a"), &summary("First entry.")).await.unwrap();
        let original = fs::read_to_string(&path).unwrap();

        let reopened = JsonFileSummaryStore::open(&path);
        let existing = reopened.get(&CacheKey::from_raw("a")).await.unwrap().unwrap();
        reopened.put(&CacheKey::from_raw("a"), &existing).await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert!(original.find("\"a\"").unwrap() < original.find("\"b\"").unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm_cache.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileSummaryStore::open(&path);
        assert_eq!(store.len().await.unwrap(), 0);

        store.put(&CacheKey::from_raw("k"), &summary("Recovered.")).await.unwrap();
        assert_eq!(JsonFileSummaryStore::open(&path).len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unwritable_path_keeps_value_in_memory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = JsonFileSummaryStore::open(blocker.join("llm_cache.json"));
        let err = store
            .put(&CacheKey::from_raw("k"), &summary("Still returned."))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(store.get(&CacheKey::from_raw("k")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_entries_are_dropped_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm_cache.json");
        fs::write(
            &path,
            r#"{"blank":{"sentiment":"pos","tldr":"   "},"good":{"sentiment":"neg","tldr":"Crashes a lot."}}"#,
        )
        .unwrap();

        let store = JsonFileSummaryStore::open(&path);

        assert_eq!(store.len().await.unwrap(), 1);
        assert!(store.get(&CacheKey::from_raw("blank")).await.unwrap().is_none());
        assert!(store.get(&CacheKey::from_raw("good")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_replace_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm_cache.json");
        fs::create_dir(&path).unwrap();

        let store = JsonFileSummaryStore::open(&path);
        let err = store
            .put(&CacheKey::from_raw("k"), &summary("Not written."))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!dir.path().join("llm_cache.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_clear_removes_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llm_cache.json");

        let store = JsonFileSummaryStore::open(&path);
        store.put(&CacheKey::from_raw("k"), &summary("Gone soon.")).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
