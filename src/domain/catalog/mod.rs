//! Catalog domain - Title resolution and review collection

mod collector;
mod entity;
pub mod matching;
mod repository;
mod resolver;

pub use collector::{CollectorConfig, ReviewCollector};
pub use entity::{AppId, CatalogEntry, Review, ReviewPage};
pub use matching::{MatchCandidate, MatchConfig, DEFAULT_FUZZY_THRESHOLD};
pub use repository::{CatalogApi, FIRST_PAGE_CURSOR};
pub use resolver::TitleResolver;

#[cfg(test)]
pub use repository::MockCatalogApi;
