//! Cache key derivation for review summaries

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::catalog::{AppId, Review};

/// Hex SHA-256 digest identifying an (entry, review set, model config) combination
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a summary request
    pub fn derive(app_id: AppId, reviews: &[Review], version_tag: &str) -> Self {
        CacheKeyParams::new(app_id, version_tag)
            .with_reviews(reviews)
            .generate()
    }

    /// Wraps an existing key, e.g. one read back from the store
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs of a cache key. Review order is significant.
#[derive(Debug, Clone)]
pub struct CacheKeyParams {
    /// Catalog entry identifier
    pub entry_id: String,
    /// Prompt/model configuration tag
    pub version_tag: String,
    /// Review bodies in prompt order
    pub bodies: Vec<String>,
}

impl CacheKeyParams {
    pub fn new(app_id: AppId, version_tag: impl Into<String>) -> Self {
        Self {
            entry_id: app_id.to_string(),
            version_tag: version_tag.into(),
            bodies: Vec::new(),
        }
    }

    pub fn with_reviews(mut self, reviews: &[Review]) -> Self {
        self.bodies
            .extend(reviews.iter().map(|r| r.body().to_string()));
        self
    }

    /// Hashes every field with a length prefix so that field boundaries
    /// cannot be shifted between entries without changing the digest.
    pub fn generate(&self) -> CacheKey {
        let mut hasher = Sha256::new();

        write_field(&mut hasher, b"review-summary/1");
        write_field(&mut hasher, self.entry_id.as_bytes());
        write_field(&mut hasher, self.version_tag.as_bytes());
        hasher.update((self.bodies.len() as u64).to_le_bytes());

        for body in &self.bodies {
            write_field(&mut hasher, body.as_bytes());
        }

        CacheKey(hex::encode(hasher.finalize()))
    }
}

fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "gemini-2.5-flash-lite:v1";

    fn reviews(bodies: &[&str]) -> Vec<Review> {
        bodies.iter().map(|b| Review::new(*b)).collect()
    }

    #[test]
    fn test_identical_inputs_give_identical_keys() {
        let a = CacheKey::derive(AppId::new(70), &reviews(&["good", "bad"]), TAG);
        let b = CacheKey::derive(AppId::new(70), &reviews(&["good", "bad"]), TAG);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_review_order_changes_key() {
        let a = CacheKey::derive(AppId::new(70), &reviews(&["good", "bad"]), TAG);
        let b = CacheKey::derive(AppId::new(70), &reviews(&["bad", "good"]), TAG);
        assert_ne!(a, b);
    }

    #[test]
    fn test_version_tag_changes_key() {
        let a = CacheKey::derive(AppId::new(70), &reviews(&["good"]), TAG);
        let b = CacheKey::derive(AppId::new(70), &reviews(&["good"]), "gemini-2.5-pro:v1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_changes_key() {
        let a = CacheKey::derive(AppId::new(70), &reviews(&["good"]), TAG);
        let b = CacheKey::derive(AppId::new(12), &reviews(&["good"]), TAG);
        assert_ne!(a, b);
    }

    #[test]
    fn test_field_boundaries_matter() {
        let a = CacheKey::derive(AppId::new(70), &reviews(&["ab", "c"]), TAG);
        let b = CacheKey::derive(AppId::new(70), &reviews(&["a", "bc"]), TAG);
        assert_ne!(a, b);
    }

    #[test]
    fn test_params_builder_matches_derive() {
        let from_params = CacheKeyParams::new(AppId::new(70), TAG)
            .with_reviews(&reviews(&["good", "bad"]))
            .generate();

        assert_eq!(
            from_params,
            CacheKey::derive(AppId::new(70), &reviews(&["good", "bad"]), TAG)
        );
    }
}
