//! Catalog matcher - resolves extracted names against known products
//!
//! Matching attempts run in a fixed order, first hit wins: exact name,
//! known synonym, fuzzy similarity, low-confidence passthrough.

use crate::similarity::similarity;
use crate::types::CatalogItem;

/// Confidence of a case-insensitive exact catalog match.
pub const EXACT_CONFIDENCE: f64 = 1.0;
/// Confidence of a known-synonym match; also the ceiling for fuzzy scores.
pub const SYNONYM_CONFIDENCE: f64 = 0.9;
/// Minimum similarity for a fuzzy match to be accepted.
pub const FUZZY_THRESHOLD: f64 = 0.4;
/// Passthrough confidence when a catalog exists but nothing matched.
pub const NO_MATCH_CONFIDENCE: f64 = 0.3;
/// Passthrough confidence when no catalog was supplied at all.
pub const EMPTY_CATALOG_CONFIDENCE: f64 = 0.5;

/// Spoken shorthand mapped to the canonical product name it stands for.
/// A synonym only matches when its canonical name is in the catalog.
const NAME_SYNONYMS: &[(&str, &str)] = &[
    ("coke", "coca-cola"),
    ("atta", "wheat flour"),
    ("maida", "refined flour"),
    ("chini", "sugar"),
    ("chawal", "rice"),
    ("namak", "salt"),
    ("doodh", "milk"),
    ("dahi", "curd"),
    ("tel", "cooking oil"),
    ("dal", "lentils"),
];

/// Outcome of one catalog lookup.
#[derive(Debug, Clone)]
pub struct CatalogMatch {
    pub name: String,
    pub confidence: f64,
}

/// Resolve `candidate` against the catalog. Read-only with respect to the
/// catalog; total for any input including an empty candidate or catalog.
pub fn match_catalog(candidate: &str, catalog: &[CatalogItem]) -> CatalogMatch {
    let wanted = candidate.trim().to_lowercase();
    if catalog.is_empty() {
        return CatalogMatch {
            name: candidate.trim().to_string(),
            confidence: EMPTY_CATALOG_CONFIDENCE,
        };
    }

    for item in catalog {
        if item.name.to_lowercase() == wanted {
            return CatalogMatch {
                name: item.name.clone(),
                confidence: EXACT_CONFIDENCE,
            };
        }
    }

    if let Some((_, canonical)) = NAME_SYNONYMS.iter().find(|(s, _)| *s == wanted) {
        if let Some(item) = catalog.iter().find(|i| i.name.to_lowercase() == *canonical) {
            return CatalogMatch {
                name: item.name.clone(),
                confidence: SYNONYM_CONFIDENCE,
            };
        }
    }

    let mut best: Option<(&CatalogItem, f64)> = None;
    for item in catalog {
        let score = similarity(&wanted, &item.name.to_lowercase());
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((item, score));
        }
    }
    if let Some((item, score)) = best {
        if score >= FUZZY_THRESHOLD {
            return CatalogMatch {
                name: item.name.clone(),
                confidence: score.min(SYNONYM_CONFIDENCE),
            };
        }
    }

    CatalogMatch {
        name: candidate.trim().to_string(),
        confidence: NO_MATCH_CONFIDENCE,
    }
}

/// Best-scoring catalog names for `candidate`, highest similarity first.
/// Only names at or above the fuzzy threshold qualify; may be empty.
pub fn top_matches(candidate: &str, catalog: &[CatalogItem], limit: usize) -> Vec<String> {
    let wanted = candidate.trim().to_lowercase();
    let mut scored: Vec<(f64, &CatalogItem)> = catalog
        .iter()
        .map(|item| (similarity(&wanted, &item.name.to_lowercase()), item))
        .filter(|(score, _)| *score >= FUZZY_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut seen: Vec<String> = Vec::new();
    for (_, item) in scored {
        if seen.iter().any(|n| n.eq_ignore_ascii_case(&item.name)) {
            continue;
        }
        seen.push(item.name.clone());
        if seen.len() == limit {
            break;
        }
    }
    seen
}
