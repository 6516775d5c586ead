//! Title normalization and approximate matching

use serde::{Deserialize, Serialize};

use super::CatalogEntry;

/// Minimum similarity a fuzzy match must reach to be accepted.
///
/// Scores come from normalized Levenshtein similarity over punctuation-free
/// titles, so 0.68 tolerates roughly one edit per three characters.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.68;

/// Tunables for title matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Acceptance threshold for fuzzy matches, in `[0.0, 1.0]`
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl MatchConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// A catalog entry scored against a query
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate<'a> {
    pub entry: &'a CatalogEntry,
    pub score: f64,
}

/// Lowercases, trims and collapses whitespace runs
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized title with punctuation removed, used for similarity scoring
pub fn fold_title(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    normalize_title(&stripped)
}

/// First candidate whose normalized title equals the normalized query
pub fn find_exact<'a>(query: &str, candidates: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    let wanted = normalize_title(query);

    candidates
        .iter()
        .find(|entry| normalize_title(entry.title()) == wanted)
}

/// Highest-scoring candidate; ties keep the earliest one
pub fn best_match<'a>(query: &str, candidates: &'a [CatalogEntry]) -> Option<MatchCandidate<'a>> {
    let folded_query = fold_title(query);
    if folded_query.is_empty() {
        return None;
    }

    let mut best: Option<MatchCandidate<'a>> = None;

    for entry in candidates {
        let folded = fold_title(entry.title());
        if folded.is_empty() {
            continue;
        }

        let score = strsim::normalized_levenshtein(&folded_query, &folded);

        if best.as_ref().is_none_or(|current| score > current.score) {
            best = Some(MatchCandidate { entry, score });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new(70, "Half-Life"),
            CatalogEntry::new(12, "Halo"),
        ]
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Half-Life   2 "), "half-life 2");
        assert_eq!(normalize_title("PORTAL\t2"), "portal 2");
    }

    #[test]
    fn test_fold_title_strips_punctuation() {
        assert_eq!(fold_title("Half-Life: Alyx"), "halflife alyx");
        assert_eq!(fold_title("!!!"), "");
    }

    #[test]
    fn test_find_exact_is_case_and_whitespace_insensitive() {
        let entries = catalog();
        let found = find_exact("  half-life ", &entries).unwrap();
        assert_eq!(found.app_id().value(), 70);
    }

    #[test]
    fn test_find_exact_keeps_first_duplicate() {
        let entries = vec![
            CatalogEntry::new(1, "Doom"),
            CatalogEntry::new(2, "DOOM"),
        ];

        assert_eq!(find_exact("doom", &entries).unwrap().app_id().value(), 1);
    }

    #[test]
    fn test_best_match_prefers_closer_title() {
        let entries = catalog();
        let best = best_match("Halflife", &entries).unwrap();

        assert_eq!(best.entry.app_id().value(), 70);
        assert!(best.score > 0.99);
    }

    #[test]
    fn test_best_match_ties_keep_earliest() {
        let entries = vec![
            CatalogEntry::new(1, "Portal"),
            CatalogEntry::new(2, "Portal"),
        ];

        assert_eq!(best_match("Portl", &entries).unwrap().entry.app_id().value(), 1);
    }

    #[test]
    fn test_best_match_skips_untitled_entries() {
        let entries = vec![CatalogEntry::new(5, ""), CatalogEntry::new(6, "Celeste")];
        assert_eq!(best_match("Celest", &entries).unwrap().entry.app_id().value(), 6);
    }

    #[test]
    fn test_best_match_score_bounds() {
        let same = [CatalogEntry::new(1, "celeste")];
        assert_eq!(best_match("Celeste", &same).unwrap().score, 1.0);

        let other = [CatalogEntry::new(2, "Factorio")];
        assert!(best_match("Celeste", &other).unwrap().score < DEFAULT_FUZZY_THRESHOLD);
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(MatchConfig::default().with_threshold(1.5).threshold, 1.0);
    }
}
