//! Catalog entry and review entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Steam application identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(u64);

impl AppId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for AppId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single title in the store catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    app_id: AppId,
    title: String,
}

impl CatalogEntry {
    pub fn new(app_id: impl Into<AppId>, title: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            title: title.into(),
        }
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A user review as returned by the review API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: None,
            recommended: None,
            created_at: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_recommended(mut self, recommended: bool) -> Self {
        self.recommended = Some(recommended);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn recommended(&self) -> Option<bool> {
        self.recommended
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// One page of reviews plus the cursor for the next page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    /// Cursor to pass for the following page; `None` when upstream has no more
    pub next_cursor: Option<String>,
}

impl ReviewPage {
    pub fn new(reviews: Vec<Review>, next_cursor: Option<String>) -> Self {
        Self {
            reviews,
            next_cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}
