//! Review collection across upstream pages

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repository::FIRST_PAGE_CURSOR;
use super::{CatalogApi, CatalogEntry, Review};
use crate::domain::error::DomainError;

/// Limits for review collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Largest page requested from upstream in one call
    pub page_size: usize,
    /// Largest review count a caller may ask for
    pub max_reviews: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_reviews: 20,
        }
    }
}

/// Collects up to N reviews for a catalog entry
pub struct ReviewCollector {
    api: Arc<dyn CatalogApi>,
    config: CollectorConfig,
}

impl std::fmt::Debug for ReviewCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewCollector")
            .field("config", &self.config)
            .finish()
    }
}

impl ReviewCollector {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_config(api, CollectorConfig::default())
    }

    pub fn with_config(api: Arc<dyn CatalogApi>, config: CollectorConfig) -> Self {
        Self { api, config }
    }

    /// Returns at most `count` reviews in upstream order.
    ///
    /// Fewer reviews are returned, without error, when upstream runs out.
    pub async fn collect(
        &self,
        entry: &CatalogEntry,
        count: usize,
    ) -> Result<Vec<Review>, DomainError> {
        if count == 0 || count > self.config.max_reviews {
            return Err(DomainError::invalid_argument(format!(
                "Review count must be between 1 and {}, got {}",
                self.config.max_reviews, count
            )));
        }

        let page_size = self.config.page_size.max(1);
        let mut reviews: Vec<Review> = Vec::with_capacity(count);
        let mut cursor = FIRST_PAGE_CURSOR.to_string();

        while reviews.len() < count {
            let wanted = (count - reviews.len()).min(page_size);
            let page = self
                .api
                .review_page(entry.app_id(), &cursor, wanted)
                .await?;

            debug!(
                app_id = %entry.app_id(),
                received = page.reviews.len(),
                collected = reviews.len(),
                "Fetched review page"
            );

            if page.is_empty() {
                break;
            }

            reviews.extend(page.reviews);

            match page.next_cursor {
                Some(next) if next != cursor => cursor = next,
                _ => break,
            }
        }

        reviews.truncate(count);
        Ok(reviews)
    }
}
