//! Intent classification over normalized utterance text
//!
//! Keyword families are checked in a fixed priority order; the first family
//! with a hit wins. No family is scored numerically.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::unit_pattern;
use crate::types::Intent;

const BILL_PHRASES: &[&str] = &[
    "create bill",
    "create a bill",
    "make bill",
    "make a bill",
    "generate bill",
    "generate a bill",
    "new bill",
];

const ADD_KEYWORDS: &[&str] = &[
    "add", "create", "insert", "put", "place", "stock", "buy", "purchase",
];

const REMOVE_KEYWORDS: &[&str] = &["remove", "delete", "discard", "subtract", "minus", "sold"];

const UPDATE_KEYWORDS: &[&str] = &["update", "change", "modify", "edit", "set", "correct"];

const SEARCH_KEYWORDS: &[&str] = &["search", "find", "locate", "show", "check", "where", "look"];

static QUANTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b\d+(?:\.\d+)?\s*(?:{})\b", unit_pattern()))
        .expect("Invalid regex pattern")
});

fn contains_phrase(text: &str, phrase: &str) -> bool {
    format!(" {} ", text).contains(&format!(" {} ", phrase))
}

fn contains_any_word(text: &str, words: &[&str]) -> bool {
    text.split_whitespace().any(|t| words.contains(&t))
}

/// Classify one normalized utterance. An utterance with no recognizable
/// keyword but a `<number><unit>` pattern is treated as an addition.
pub fn classify(text: &str) -> Intent {
    if BILL_PHRASES.iter().any(|p| contains_phrase(text, p)) {
        return Intent::CreateBill;
    }
    if contains_any_word(text, ADD_KEYWORDS) {
        return Intent::AddProduct;
    }
    if contains_any_word(text, REMOVE_KEYWORDS) {
        return Intent::RemoveProduct;
    }
    if contains_any_word(text, UPDATE_KEYWORDS) {
        return Intent::UpdateProduct;
    }
    if contains_any_word(text, SEARCH_KEYWORDS) {
        return Intent::SearchProduct;
    }
    if QUANTITY_PATTERN.is_match(text) {
        return Intent::AddProduct;
    }
    Intent::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        assert_eq!(classify("add 5 kg rice"), Intent::AddProduct);
        assert_eq!(classify("put 2 packet sugar on shelf 1"), Intent::AddProduct);
    }

    #[test]
    fn test_remove() {
        assert_eq!(classify("remove rice"), Intent::RemoveProduct);
        assert_eq!(classify("delete 2 kg sugar"), Intent::RemoveProduct);
    }

    #[test]
    fn test_update() {
        assert_eq!(classify("update rice quantity"), Intent::UpdateProduct);
        assert_eq!(classify("set price of rice to 60"), Intent::UpdateProduct);
    }

    #[test]
    fn test_search() {
        assert_eq!(classify("where is sugar"), Intent::SearchProduct);
        assert_eq!(classify("find rice"), Intent::SearchProduct);
    }

    #[test]
    fn test_bill_beats_add() {
        assert_eq!(classify("create bill"), Intent::CreateBill);
        assert_eq!(classify("make a bill for ramesh"), Intent::CreateBill);
        // "create" alone is still an addition
        assert_eq!(classify("create rice entry"), Intent::AddProduct);
    }

    #[test]
    fn test_add_beats_remove() {
        assert_eq!(classify("add rice remove sugar"), Intent::AddProduct);
    }

    #[test]
    fn test_quantity_fallback() {
        assert_eq!(classify("5 kg rice"), Intent::AddProduct);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("hello there"), Intent::Unknown);
        assert_eq!(classify(""), Intent::Unknown);
    }
}
