//! HTTP plumbing shared by the catalog client and the LLM provider

pub mod client;
mod fetcher;

pub use client::{HttpClient, HttpClientTrait, HttpResponse, StatusClass, TransportError};
pub use fetcher::Fetcher;
