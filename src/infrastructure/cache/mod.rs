//! Summary store implementations

mod file_store;
mod in_memory;

pub use file_store::{JsonFileSummaryStore, DEFAULT_CACHE_PATH};
pub use in_memory::InMemorySummaryStore;
