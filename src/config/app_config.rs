use serde::Deserialize;

use crate::domain::catalog::matching::DEFAULT_FUZZY_THRESHOLD;
use crate::domain::{CollectorConfig, MatchConfig, RetryPolicy};
use crate::infrastructure::cache::DEFAULT_CACHE_PATH;
use crate::infrastructure::catalog::{SteamApiConfig, MAX_PAGE_SIZE};
use crate::infrastructure::services::{LengthPolicy, SummarizerConfig, DEFAULT_SUMMARY_MODEL};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub summarizer: SummarizerSettings,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Retry settings as they appear in configuration files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

/// Steam catalog and review API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub store_base_url: String,
    pub timeout_secs: u64,
    pub retry: RetrySettings,
    pub page_size: usize,
    pub max_reviews: usize,
    pub fuzzy_threshold: f64,
    pub language: String,
    pub filter: String,
}

/// Gemini summarizer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    pub base_url: String,
    pub model: String,
    /// Falls back to the `GEMINI_API_KEY` environment variable when unset
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let steam = SteamApiConfig::default();
        let collector = CollectorConfig::default();

        Self {
            api_base_url: steam.api_base_url,
            store_base_url: steam.store_base_url,
            timeout_secs: 10,
            retry: RetrySettings::default(),
            page_size: collector.page_size,
            max_reviews: collector.max_reviews,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            language: steam.language,
            filter: steam.filter,
        }
    }
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            api_key: None,
            timeout_secs: 60,
            retry: RetrySettings {
                initial_delay_ms: 800,
                ..Default::default()
            },
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CACHE_PATH.to_string(),
        }
    }
}

impl RetrySettings {
    pub fn to_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.max_attempts)
            .with_initial_delay(self.initial_delay_ms)
            .with_max_delay(self.max_delay_ms)
            .with_backoff_multiplier(self.backoff_multiplier);

        if self.jitter {
            policy
        } else {
            policy.without_jitter()
        }
    }
}

impl CatalogConfig {
    pub fn steam_api(&self) -> SteamApiConfig {
        SteamApiConfig {
            language: self.language.clone(),
            filter: self.filter.clone(),
            ..Default::default()
        }
        .with_base_urls(&self.api_base_url, &self.store_base_url)
    }

    pub fn collector(&self) -> CollectorConfig {
        CollectorConfig {
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
            max_reviews: self.max_reviews.max(1),
        }
    }

    pub fn matching(&self) -> MatchConfig {
        MatchConfig::default().with_threshold(self.fuzzy_threshold)
    }
}

impl SummarizerSettings {
    pub fn summarizer(&self) -> SummarizerConfig {
        SummarizerConfig {
            model: self.model.clone(),
            retry: self.retry.to_policy(),
            length: LengthPolicy::default(),
        }
    }

    /// API key from configuration, else from `GEMINI_API_KEY`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
