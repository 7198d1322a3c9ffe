//! Entity extraction from utterance segments
//!
//! Applies an ordered list of extraction rules to one segment. Each rule
//! consumes the span it matched so later rules see a cleaner residual
//! string; whatever survives every rule is the candidate product name.

use regex::Regex;
use tracing::trace;

use crate::normalize::{normalize_unit, unit_pattern};
use crate::types::{ProductEntity, Variant};

/// Shelf-style location words that take a number ("rack 3").
const LOCATION_WORDS: &[&str] = &[
    "shelf", "rack", "aisle", "section", "position", "bin", "box", "cabinet", "drawer", "counter",
];

/// Standalone location words that name a place without a number.
const FREEFORM_LOCATIONS: &[&str] = &[
    "storage", "godown", "warehouse", "freezer", "fridge", "pantry",
];

/// Relative qualifiers for shelf-style locations ("top shelf").
const RELATIVE_WORDS: &[&str] = &["top", "bottom", "middle", "upper", "lower", "left", "right"];

const COLORS: &[&str] = &[
    "red", "green", "blue", "yellow", "black", "white", "brown", "pink", "purple", "gray",
    "grey", "golden", "silver",
];

const SIZES: &[&str] = &[
    "small", "medium", "large", "big", "mini", "tiny", "jumbo", "huge", "regular", "xl",
];

const KINDS: &[&str] = &[
    "fresh", "frozen", "organic", "local", "imported", "premium", "instant", "raw", "dried",
    "roasted", "salted", "unsalted", "whole", "refined", "diet",
];

/// Connective noise dropped from the residual product name.
const FILLERS: &[&str] = &[
    "of", "the", "a", "an", "some", "few", "little", "to", "for", "me", "my", "i", "you",
    "want", "need", "please", "kindly", "and", "also", "plus", "more", "it", "them", "bill",
    "on", "in", "at", "from", "number", "price", "cost", "rate", "worth", "rs", "rupees", "₹",
    ",", "is", "are", "where", "what",
];

/// Extracts structured fields from one segment of an utterance.
///
/// Patterns are compiled once in `new()`; the extractor itself is immutable
/// and can be shared freely.
pub struct EntityExtractor {
    action_verb: Regex,
    quantity: Regex,
    bare_quantity: Regex,
    numbered_location: Regex,
    relative_location: Regex,
    freeform_location: Regex,
    price: Regex,
    expiry_marker: Regex,
}

impl EntityExtractor {
    pub fn new() -> Self {
        // Compile regex patterns once - these should never fail
        let units = unit_pattern();
        let locations = LOCATION_WORDS.join("|");
        let relatives = RELATIVE_WORDS.join("|");
        let freeforms = FREEFORM_LOCATIONS.join("|");

        Self {
            action_verb: Regex::new(
                r"^(?:(?:i|we)\s+(?:want|need)\s+to\s+)?(?:please\s+)?(?:kindly\s+)?(?:add|create|insert|put|place|stock|buy|purchase|remove|delete|discard|update|change|modify|edit|set|search|find|show|check|locate)\b\s*",
            )
            .expect("Invalid regex pattern"),
            quantity: Regex::new(&format!(r"\b(\d+(?:\.\d+)?)\s*({units})\b"))
                .expect("Invalid regex pattern"),
            bare_quantity: Regex::new(r"^\s*(\d+(?:\.\d+)?)\s+").expect("Invalid regex pattern"),
            numbered_location: Regex::new(&format!(
                r"\b(?:in|at|on|from)\s+(?:the\s+)?({locations})\s+(?:number\s+)?(\d+)\b"
            ))
            .expect("Invalid regex pattern"),
            relative_location: Regex::new(&format!(
                r"\b(?:(?:in|at|on|from)\s+)?(?:the\s+)?({relatives})\s+({locations})\b"
            ))
            .expect("Invalid regex pattern"),
            freeform_location: Regex::new(&format!(
                r"\b(?:in|at|on|from)\s+(?:the\s+)?({freeforms})\b"
            ))
            .expect("Invalid regex pattern"),
            price: Regex::new(
                r"\b(?:price|cost|costs|costing|worth|for|at|to|is)\s+(?:₹\s*|rs\s+|rupees\s+)?(\d+(?:\.\d+)?)\b|\b(?:rs|rupees)\s+(\d+(?:\.\d+)?)\b|₹\s*(\d+(?:\.\d+)?)\b|\b(\d+(?:\.\d+)?)\s+(?:rs|rupees)\b",
            )
            .expect("Invalid regex pattern"),
            expiry_marker: Regex::new(
                r"\b(?:expiry|expires?|expiring|valid\s+(?:until|till)|use\s+by|best\s+before|good\s+(?:until|till)|sell\s+by)\b",
            )
            .expect("Invalid regex pattern"),
        }
    }

    /// Extract a partial entity from one segment. Never fails; a segment
    /// with no recognizable product yields an entity with an empty name,
    /// which the aggregator drops.
    pub fn extract(&self, segment: &str) -> ProductEntity {
        let mut working = segment.trim().to_string();

        let _ = take_first(&self.action_verb, &mut working);

        let mut quantity = None;
        let mut unit = None;
        if let Some(groups) = take_first(&self.quantity, &mut working) {
            quantity = parse_group(&groups, 0);
            unit = group(&groups, 1).and_then(normalize_unit).map(str::to_string);
        } else if let Some(groups) = take_first(&self.bare_quantity, &mut working) {
            quantity = parse_group(&groups, 0);
        }

        let position = self.take_location(&mut working);

        self.strip_expiry_phrase(&mut working);

        let mut price = None;
        if let Some(groups) = take_first(&self.price, &mut working) {
            price = groups.iter().flatten().next().and_then(|v| v.parse::<f64>().ok());
        }

        let (name, variant) = collect_name(&working);

        let mut entity = ProductEntity::new(name);
        if let Some(q) = quantity {
            if q > 0.0 {
                entity.quantity = q;
            }
        }
        if let Some(u) = unit {
            entity.unit = u;
        }
        entity.position = position;
        entity.price = price;
        entity.variant = variant;
        trace!(segment = %segment, name = %entity.name, "segment extracted");
        entity
    }

    /// Utterance-wide location scan. Read-only; used by the aggregator as a
    /// fallback for entities without their own position.
    pub fn extract_location(&self, text: &str) -> Option<String> {
        if let Some(cap) = self.numbered_location.captures(text) {
            if let (Some(word), Some(num)) = (cap.get(1), cap.get(2)) {
                return Some(format!("{} {}", capitalize(word.as_str()), num.as_str()));
            }
        }
        if let Some(cap) = self.relative_location.captures(text) {
            if let (Some(rel), Some(word)) = (cap.get(1), cap.get(2)) {
                return Some(format!(
                    "{} {}",
                    capitalize(rel.as_str()),
                    capitalize(word.as_str())
                ));
            }
        }
        if let Some(cap) = self.freeform_location.captures(text) {
            if let Some(word) = cap.get(1) {
                return Some(capitalize(word.as_str()));
            }
        }
        None
    }

    fn take_location(&self, working: &mut String) -> Option<String> {
        if let Some(groups) = take_first(&self.numbered_location, working) {
            if let (Some(word), Some(num)) = (group(&groups, 0), group(&groups, 1)) {
                return Some(format!("{} {}", capitalize(word), num));
            }
            return None;
        }
        if let Some(groups) = take_first(&self.relative_location, working) {
            if let (Some(rel), Some(word)) = (group(&groups, 0), group(&groups, 1)) {
                return Some(format!("{} {}", capitalize(rel), capitalize(word)));
            }
            return None;
        }
        if let Some(groups) = take_first(&self.freeform_location, working) {
            if let Some(word) = group(&groups, 0) {
                return Some(capitalize(word));
            }
        }
        None
    }

    /// Remove an expiry keyword and the date tokens that follow it, so the
    /// date text never leaks into the product name. The date value itself is
    /// produced by the date resolver, which sees the full segment.
    fn strip_expiry_phrase(&self, working: &mut String) {
        let (start, end) = match self.expiry_marker.find(working) {
            Some(m) => (m.start(), m.end()),
            None => return,
        };
        let head = working[..start].to_string();
        let tail = working[end..].trim_start().to_string();
        let mut tokens: Vec<&str> = tail.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() && is_date_token(tokens[i]) {
            i += 1;
        }
        let remainder = tokens.split_off(i).join(" ");
        *working = format!("{} {}", head.trim_end(), remainder).trim().to_string();
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `regex` to `working` once: return its capture groups and blank the
/// matched span so later rules see a cleaner residual.
fn take_first(regex: &Regex, working: &mut String) -> Option<Vec<Option<String>>> {
    let (range, groups) = {
        let cap = regex.captures(working)?;
        let whole = cap.get(0)?;
        let groups = (1..cap.len())
            .map(|i| cap.get(i).map(|m| m.as_str().to_string()))
            .collect();
        (whole.range(), groups)
    };
    working.replace_range(range, " ");
    Some(groups)
}

fn group(groups: &[Option<String>], idx: usize) -> Option<&str> {
    groups.get(idx).and_then(|g| g.as_deref())
}

fn parse_group(groups: &[Option<String>], idx: usize) -> Option<f64> {
    group(groups, idx).and_then(|v| v.parse::<f64>().ok())
}

fn collect_name(working: &str) -> (String, Variant) {
    let mut variant = Variant::default();
    let mut name_tokens: Vec<&str> = Vec::new();
    for tok in working.split_whitespace() {
        if COLORS.contains(&tok) {
            if variant.color.is_none() {
                variant.color = Some(tok.to_string());
            }
            continue;
        }
        if SIZES.contains(&tok) {
            if variant.size.is_none() {
                variant.size = Some(tok.to_string());
            }
            continue;
        }
        if KINDS.contains(&tok) {
            if variant.kind.is_none() {
                variant.kind = Some(tok.to_string());
            }
            continue;
        }
        if FILLERS.contains(&tok) {
            continue;
        }
        name_tokens.push(tok);
    }
    (name_tokens.join(" "), variant)
}

fn is_date_token(tok: &str) -> bool {
    if tok.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        return true;
    }
    const DATE_WORDS: &[&str] = &[
        "on", "in", "of", "the", "is", "at", "by", "until", "till", "before", "next", "this",
        "coming", "from", "now", "after", "today", "tonight", "tomorrow", "day", "days", "week",
        "weeks", "month", "months", "year", "years", "monday", "tuesday", "wednesday",
        "thursday", "friday", "saturday", "sunday", "january", "february", "march", "april",
        "may", "june", "july", "august", "september", "october", "november", "december", "jan",
        "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    ];
    DATE_WORDS.contains(&tok)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
