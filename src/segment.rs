//! Utterance segmentation
//!
//! Splits one normalized utterance into one span per product mention.
//! Commas and conjunction words are the boundaries; segment order follows
//! their order of appearance, which governs product-action ordering
//! downstream.

use once_cell::sync::Lazy;
use regex::Regex;

/// Conjunction words that separate product mentions. Multi-word
/// conjunctions come first so they win over their single-word prefixes.
const CONJUNCTIONS: &[&str] = &[
    "along with",
    "together with",
    "as well as",
    "and",
    "also",
    "plus",
    "with",
];

static DELIMITER: Lazy<Regex> = Lazy::new(|| {
    let words = CONJUNCTIONS.join("|");
    Regex::new(&format!(
        r"\s*,\s*(?:(?:{words})\s+)?|\s+(?:{words})\s+"
    ))
    .expect("Invalid regex pattern")
});

/// Split `text` into per-product segments. Empty segments are dropped; a
/// text with no delimiter comes back as a single segment.
pub fn segment(text: &str) -> Vec<String> {
    DELIMITER
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
