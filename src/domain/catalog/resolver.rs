//! Title resolution against the catalog

use std::sync::Arc;

use tracing::{debug, info};

use super::matching::{best_match, find_exact, MatchConfig};
use super::{CatalogApi, CatalogEntry};
use crate::domain::error::DomainError;

/// Resolves free-text titles to catalog entries
pub struct TitleResolver {
    api: Arc<dyn CatalogApi>,
    config: MatchConfig,
}

impl std::fmt::Debug for TitleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleResolver")
            .field("config", &self.config)
            .finish()
    }
}

impl TitleResolver {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_config(api, MatchConfig::default())
    }

    pub fn with_config(api: Arc<dyn CatalogApi>, config: MatchConfig) -> Self {
        Self { api, config }
    }

    /// Resolves `query` to a single catalog entry.
    ///
    /// An exact (case- and whitespace-insensitive) title match always wins;
    /// duplicates resolve to the first entry in upstream order. With `fuzzy`
    /// set, the closest title scoring at least the configured threshold is
    /// accepted, earliest entry first on ties.
    pub async fn resolve(&self, query: &str, fuzzy: bool) -> Result<CatalogEntry, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::invalid_argument("Title query must not be empty"));
        }

        let candidates = self.api.search(query).await?;
        debug!(query, candidates = candidates.len(), "Fetched catalog candidates");

        if let Some(entry) = find_exact(query, &candidates) {
            info!(query, app_id = %entry.app_id(), title = entry.title(), "Resolved title exactly");
            return Ok(entry.clone());
        }

        if !fuzzy {
            return Err(DomainError::not_found(format!(
                "No catalog entry titled '{}' (try fuzzy matching)",
                query
            )));
        }

        match best_match(query, &candidates) {
            Some(candidate) if candidate.score >= self.config.threshold => {
                info!(
                    query,
                    app_id = %candidate.entry.app_id(),
                    title = candidate.entry.title(),
                    score = candidate.score,
                    "Resolved title by fuzzy match"
                );
                Ok(candidate.entry.clone())
            }
            Some(candidate) => Err(DomainError::not_found(format!(
                "No catalog entry close to '{}' (best was '{}' at {:.2}, threshold {:.2})",
                query,
                candidate.entry.title(),
                candidate.score,
                self.config.threshold
            ))),
            None => Err(DomainError::not_found(format!(
                "No catalog entry close to '{}'",
                query
            ))),
        }
    }
}
