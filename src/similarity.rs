//! String similarity scoring for catalog matching
//!
//! A narrow interface over the actual algorithm: edit distance blended with
//! token-set overlap so multi-word names still match when word order or
//! extra words differ.

use ahash::AHashSet;

/// Similarity score between two normalized names in [0, 1].
///
/// Exact equality is the only way to score 1.0. Otherwise the score is the
/// better of strsim's normalized Levenshtein ratio and a capped token-set
/// Jaccard overlap.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let edit = strsim::normalized_levenshtein(a, b);
    let tokens = token_overlap(a, b) * 0.95;
    edit.max(tokens)
}

fn token_overlap(a: &str, b: &str) -> f64 {
    let a_tokens: AHashSet<&str> = a.split_whitespace().collect();
    let b_tokens: AHashSet<&str> = b.split_whitespace().collect();
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }
    let intersection = a_tokens.intersection(&b_tokens).count() as f64;
    let union = a_tokens.union(&b_tokens).count() as f64;
    intersection / union
}
