//! Cache domain - Summary cache keys and store abstraction

mod key;
mod repository;

pub use key::{CacheKey, CacheKeyParams};
pub use repository::SummaryStore;
