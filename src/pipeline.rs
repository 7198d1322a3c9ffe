//! Parse pipeline - wires the stages together and aggregates per-segment
//! results into a single `ParseResult`.
//!
//! The pipeline is a pure, synchronous computation over one utterance at a
//! time. A `VoiceParser` holds only compiled patterns and configuration, so
//! one instance can serve any number of concurrent callers as long as the
//! catalog snapshot they pass is not mutated mid-parse.

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::dates::{DateOrder, ExpiryResolver};
use crate::entities::EntityExtractor;
use crate::intent::classify;
use crate::matcher::{match_catalog, top_matches};
use crate::normalize::normalize;
use crate::segment::segment;
use crate::types::{CatalogItem, Intent, ParseResult, ProductEntity};

/// Default confidence below which an entity triggers clarification. The same
/// threshold applies on single- and multi-product paths.
pub const DEFAULT_CLARIFICATION_THRESHOLD: f64 = 0.8;

/// Position assigned when neither the segment nor the utterance names one.
pub const UNSPECIFIED_POSITION: &str = "unspecified";

/// Tuning knobs for a `VoiceParser`.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub date_order: DateOrder,
    pub clarification_threshold: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            date_order: DateOrder::DayFirst,
            clarification_threshold: DEFAULT_CLARIFICATION_THRESHOLD,
        }
    }
}

/// Voice command interpreter.
pub struct VoiceParser {
    extractor: EntityExtractor,
    resolver: ExpiryResolver,
    config: ParserConfig,
}

impl VoiceParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            extractor: EntityExtractor::new(),
            resolver: ExpiryResolver::new(config.date_order),
            config,
        }
    }

    /// Interpret one utterance against the caller's catalog, anchoring
    /// relative expiry phrases at the current local date.
    pub fn parse(&self, text: &str, catalog: &[CatalogItem]) -> ParseResult {
        self.parse_at(text, catalog, Local::now().date_naive())
    }

    /// Deterministic core of `parse`; `today` anchors relative dates.
    pub fn parse_at(&self, text: &str, catalog: &[CatalogItem], today: NaiveDate) -> ParseResult {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return ParseResult::empty(Intent::Unknown);
        }
        let intent = classify(&normalized);
        let detected_location = self.extractor.extract_location(&normalized);
        let segments = segment(&normalized);
        debug!(?intent, segments = segments.len(), "utterance segmented");

        let mut raw: Vec<ProductEntity> = Vec::with_capacity(segments.len());
        for seg in &segments {
            let mut entity = self.extractor.extract(seg);
            entity.expiry = self.resolver.resolve(seg, today);
            raw.push(entity);
        }
        self.aggregate(intent, raw, detected_location, catalog)
    }

    fn aggregate(
        &self,
        intent: Intent,
        raw: Vec<ProductEntity>,
        detected_location: Option<String>,
        catalog: &[CatalogItem],
    ) -> ParseResult {
        let mut needs_clarification = false;
        let mut clarification_question = None;
        let mut clarification_options = Vec::new();
        let mut products = Vec::new();

        for mut entity in raw {
            if entity.name.is_empty() {
                continue;
            }
            let candidate = entity.name.clone();
            let matched = match_catalog(&candidate, catalog);
            entity.name = matched.name;
            entity.confidence = matched.confidence;
            if entity.position.is_none() {
                entity.position = detected_location
                    .clone()
                    .or_else(|| Some(UNSPECIFIED_POSITION.to_string()));
            }
            if entity.quantity <= 0.0 {
                entity.quantity = 1.0;
            }
            if entity.unit.is_empty() {
                entity.unit = "pcs".to_string();
            }

            if entity.confidence < self.config.clarification_threshold {
                // The first uncertain entity raises the question; none of
                // them are committed.
                if !needs_clarification {
                    needs_clarification = true;
                    let mut options = top_matches(&candidate, catalog, 3);
                    let suggested = options
                        .first()
                        .cloned()
                        .unwrap_or_else(|| candidate.clone());
                    clarification_question = Some(format!("Did you mean \"{}\"?", suggested));
                    if !options.is_empty()
                        && !options.iter().any(|o| o.eq_ignore_ascii_case(&candidate))
                    {
                        options.push(candidate);
                    }
                    clarification_options = options;
                }
                continue;
            }
            products.push(entity);
        }

        debug!(
            products = products.len(),
            needs_clarification, "utterance aggregated"
        );
        ParseResult {
            intent,
            products,
            detected_location,
            needs_clarification,
            clarification_question,
            clarification_options,
        }
    }
}

impl Default for VoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn catalog(names: &[&str]) -> Vec<CatalogItem> {
        names.iter().map(|n| CatalogItem::new(n.to_string())).collect()
    }

    // 2025-03-10 is a Monday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_single_product_exact() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("add 5 kg rice", &catalog(&["rice"]), today());
        assert_eq!(result.intent, Intent::AddProduct);
        assert_eq!(result.products.len(), 1);
        let p = &result.products[0];
        assert_eq!(p.name, "rice");
        assert_eq!(p.quantity, 5.0);
        assert_eq!(p.unit, "kg");
        assert_eq!(p.confidence, 1.0);
        assert_eq!(p.position.as_deref(), Some("unspecified"));
        assert!(!result.needs_clarification);
    }

    #[test]
    fn test_multi_product_order_and_location_fallback() {
        let parser = VoiceParser::new();
        let result = parser.parse_at(
            "add 5 kg rice and 2 packets sugar on rack 3",
            &catalog(&["rice", "sugar"]),
            today(),
        );
        assert_eq!(result.products.len(), 2);
        assert_eq!(result.products[0].name, "rice");
        assert_eq!(result.products[1].name, "sugar");
        assert_eq!(result.products[1].unit, "packet");
        assert_eq!(result.detected_location.as_deref(), Some("Rack 3"));
        // the first product inherits the utterance-level location
        assert_eq!(result.products[0].position.as_deref(), Some("Rack 3"));
        assert_eq!(result.products[1].position.as_deref(), Some("Rack 3"));
    }

    #[test]
    fn test_freeform_storage_location() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("add 3 cans of beans from storage", &catalog(&["beans"]), today());
        assert_eq!(result.products.len(), 1);
        let p = &result.products[0];
        assert_eq!(p.name, "beans");
        assert_eq!(p.quantity, 3.0);
        assert_eq!(p.unit, "can");
        assert_eq!(p.position.as_deref(), Some("Storage"));
    }

    #[test]
    fn test_defaults_applied() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("add rice", &catalog(&["rice"]), today());
        let p = &result.products[0];
        assert_eq!(p.quantity, 1.0);
        assert_eq!(p.unit, "pcs");
    }

    #[test]
    fn test_unknown_name_needs_clarification() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("add xyzzy", &catalog(&["rice", "sugar"]), today());
        assert!(result.products.is_empty());
        assert!(result.needs_clarification);
        assert!(result.clarification_question.is_some());
    }

    #[test]
    fn test_near_miss_offers_options() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("add 5 kg rce", &catalog(&["rice", "sugar"]), today());
        assert!(result.needs_clarification);
        assert_eq!(
            result.clarification_question.as_deref(),
            Some("Did you mean \"rice\"?")
        );
        assert_eq!(result.clarification_options[0], "rice");
        assert!(result.clarification_options.contains(&"rce".to_string()));
        assert!(result.products.is_empty());
    }

    #[test]
    fn test_fuzzy_above_threshold_commits() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("add 2 kg ricee", &catalog(&["rice"]), today());
        assert!(!result.needs_clarification);
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].name, "rice");
        assert!((result.products[0].confidence - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_low_confidence_never_committed_alongside_good() {
        let parser = VoiceParser::new();
        let result = parser.parse_at(
            "add 5 kg rice and 2 packets xyzzy",
            &catalog(&["rice", "sugar"]),
            today(),
        );
        assert!(result.needs_clarification);
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].name, "rice");
    }

    #[test]
    fn test_empty_input() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("", &catalog(&["rice"]), today());
        assert_eq!(result.intent, Intent::Unknown);
        assert!(result.products.is_empty());
        assert!(!result.needs_clarification);
    }

    #[test]
    fn test_create_bill_has_no_phantom_product() {
        let parser = VoiceParser::new();
        let result = parser.parse_at("create bill", &catalog(&["rice"]), today());
        assert_eq!(result.intent, Intent::CreateBill);
        assert!(result.products.is_empty());
        assert!(!result.needs_clarification);
    }

    #[test]
    fn test_expiry_resolved_and_stripped() {
        let parser = VoiceParser::new();
        let result = parser.parse_at(
            "add 2 kg rice expiry 12/5/2026",
            &catalog(&["rice"]),
            today(),
        );
        let p = &result.products[0];
        assert_eq!(p.name, "rice");
        assert_eq!(p.expiry, NaiveDate::from_ymd_opt(2026, 5, 12));
    }

    #[test]
    fn test_month_first_config() {
        let parser = VoiceParser::with_config(ParserConfig {
            date_order: DateOrder::MonthFirst,
            ..ParserConfig::default()
        });
        let result = parser.parse_at(
            "add 2 kg rice expiry 5/12/2026",
            &catalog(&["rice"]),
            today(),
        );
        assert_eq!(
            result.products[0].expiry,
            NaiveDate::from_ymd_opt(2026, 5, 12)
        );
    }

    #[test]
    fn test_custom_clarification_threshold() {
        let parser = VoiceParser::with_config(ParserConfig {
            clarification_threshold: 0.5,
            ..ParserConfig::default()
        });
        // 0.75 similarity passes a 0.5 threshold
        let result = parser.parse_at("add 5 kg rce", &catalog(&["rice"]), today());
        assert!(!result.needs_clarification);
        assert_eq!(result.products[0].name, "rice");
    }

    #[test]
    fn test_deterministic_for_fixed_date() {
        let parser = VoiceParser::new();
        let items = catalog(&["rice"]);
        let a = parser.parse_at("add 2 kg rice expiry next week", &items, today());
        let b = parser.parse_at("add 2 kg rice expiry next week", &items, today());
        assert_eq!(a.products[0].expiry, b.products[0].expiry);
        assert_eq!(
            a.products[0].expiry,
            NaiveDate::from_ymd_opt(2025, 3, 17)
        );
    }

    #[test]
    fn test_price_attached_to_product() {
        let parser = VoiceParser::new();
        let result = parser.parse_at(
            "add 5 kg rice for ₹200",
            &catalog(&["rice"]),
            today(),
        );
        assert_eq!(result.products[0].price, Some(200.0));
        assert_eq!(result.products[0].name, "rice");
    }
}
