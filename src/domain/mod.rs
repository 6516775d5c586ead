//! Domain layer - Core business logic and entities

pub mod cache;
pub mod catalog;
pub mod error;
pub mod llm;
pub mod retry;
pub mod summary;

pub use cache::{CacheKey, CacheKeyParams, SummaryStore};
pub use catalog::{
    AppId, CatalogApi, CatalogEntry, CollectorConfig, MatchConfig, Review, ReviewCollector,
    ReviewPage, TitleResolver,
};
pub use error::{DomainError, ErrorKind};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use retry::RetryPolicy;
pub use summary::{ReviewSnapshot, Sentiment, SnapshotReport, Summary};
