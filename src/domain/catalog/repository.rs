//! Catalog API trait

use async_trait::async_trait;

use super::{AppId, CatalogEntry, ReviewPage};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Cursor value that requests the first page of reviews
pub const FIRST_PAGE_CURSOR: &str = "*";

/// Read access to the store catalog and its reviews
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Returns candidate entries for a title query, in upstream order.
    ///
    /// Backends without server-side search return their full catalog.
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, DomainError>;

    /// Fetches one page of reviews for an entry
    async fn review_page(
        &self,
        app_id: AppId,
        cursor: &str,
        page_size: usize,
    ) -> Result<ReviewPage, DomainError>;
}
