use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use crate::domain::catalog::{AppId, CatalogApi, CatalogEntry, Review, ReviewPage};
use crate::domain::DomainError;
use crate::infrastructure::http::{Fetcher, HttpClientTrait};

const DEFAULT_API_BASE_URL: &str = "https://api.steampowered.com";
const DEFAULT_STORE_BASE_URL: &str = "https://store.steampowered.com";

/// Steam reviews endpoint accepts at most this many reviews per page
pub const MAX_PAGE_SIZE: usize = 100;

/// Endpoints and query options for the Steam catalog
#[derive(Debug, Clone)]
pub struct SteamApiConfig {
    pub api_base_url: String,
    pub store_base_url: String,
    /// Review language filter, e.g. `english` or `all`
    pub language: String,
    /// Review ordering: `all` (by helpfulness), `recent` or `updated`
    pub filter: String,
}

impl Default for SteamApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            store_base_url: DEFAULT_STORE_BASE_URL.to_string(),
            language: "english".to_string(),
            filter: "all".to_string(),
        }
    }
}

impl SteamApiConfig {
    pub fn with_base_urls(
        mut self,
        api_base_url: impl Into<String>,
        store_base_url: impl Into<String>,
    ) -> Self {
        self.api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        self.store_base_url = store_base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Steam Web API client for the app list and app reviews
#[derive(Debug)]
pub struct SteamCatalogClient<C: HttpClientTrait> {
    fetcher: Fetcher<C>,
    config: SteamApiConfig,
}

impl<C: HttpClientTrait> SteamCatalogClient<C> {
    pub fn new(fetcher: Fetcher<C>, config: SteamApiConfig) -> Self {
        Self { fetcher, config }
    }

    fn app_list_url(&self) -> String {
        format!("{}/ISteamApps/GetAppList/v2/", self.config.api_base_url)
    }

    fn reviews_url(&self, app_id: AppId) -> String {
        format!("{}/appreviews/{}", self.config.store_base_url, app_id)
    }
}

#[async_trait]
impl<C: HttpClientTrait> CatalogApi for SteamCatalogClient<C> {
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, DomainError> {
        // The app list endpoint has no server-side filtering; return everything.
        let envelope: SteamAppListEnvelope = self.fetcher.fetch(&self.app_list_url(), &[]).await?;

        debug!(
            query,
            apps = envelope.applist.apps.len(),
            "Fetched Steam app list"
        );

        Ok(envelope
            .applist
            .apps
            .into_iter()
            .map(|app| CatalogEntry::new(app.appid, app.name))
            .collect())
    }

    async fn review_page(
        &self,
        app_id: AppId,
        cursor: &str,
        page_size: usize,
    ) -> Result<ReviewPage, DomainError> {
        let params = [
            ("json", "1".to_string()),
            ("num_per_page", page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("cursor", cursor.to_string()),
            ("language", self.config.language.clone()),
            ("filter", self.config.filter.clone()),
            ("purchase_type", "all".to_string()),
        ];

        let envelope: SteamReviewsEnvelope =
            self.fetcher.fetch(&self.reviews_url(app_id), &params).await?;

        if envelope.success != 1 {
            return Err(DomainError::malformed_response(format!(
                "Steam reviews for app {} returned success={}",
                app_id, envelope.success
            )));
        }

        let reviews = envelope
            .reviews
            .into_iter()
            .map(SteamReview::into_domain)
            .collect();

        Ok(ReviewPage::new(reviews, envelope.cursor))
    }
}

// Steam API types

#[derive(Debug, Deserialize)]
struct SteamAppListEnvelope {
    applist: SteamAppList,
}

#[derive(Debug, Deserialize)]
struct SteamAppList {
    apps: Vec<SteamApp>,
}

#[derive(Debug, Deserialize)]
struct SteamApp {
    appid: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SteamReviewsEnvelope {
    success: i64,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    reviews: Vec<SteamReview>,
}

#[derive(Debug, Deserialize)]
struct SteamReview {
    review: String,
    #[serde(default)]
    voted_up: Option<bool>,
    #[serde(default)]
    timestamp_created: Option<i64>,
    #[serde(default)]
    author: Option<SteamAuthor>,
}

#[derive(Debug, Deserialize)]
struct SteamAuthor {
    steamid: String,
}

impl SteamReview {
    fn into_domain(self) -> Review {
        let mut review = Review::new(self.review);

        if let Some(author) = self.author {
            review = review.with_author(author.steamid);
        }

        if let Some(voted_up) = self.voted_up {
            review = review.with_recommended(voted_up);
        }

        if let Some(created_at) = self
            .timestamp_created
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            review = review.with_created_at(created_at);
        }

        review
    }
}
