//! Catalog infrastructure - Steam Web API client

mod steam;

pub use steam::{SteamApiConfig, SteamCatalogClient, MAX_PAGE_SIZE};
