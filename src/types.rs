//! Core data types for voice parse results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Purpose of a spoken command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AddProduct,
    RemoveProduct,
    UpdateProduct,
    SearchProduct,
    CreateBill,
    Unknown,
}

/// Descriptive attributes that qualify a product without identifying it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Variant {
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.color.is_none() && self.kind.is_none()
    }
}

/// One structured inventory action extracted from a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntity {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub position: Option<String>,
    pub price: Option<f64>,
    pub expiry: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Variant::is_empty")]
    pub variant: Variant,
    /// Certainty of the catalog match, in [0, 1]. Exactly 1.0 only for an
    /// exact catalog-name match.
    pub confidence: f64,
}

impl ProductEntity {
    pub fn new(name: String) -> Self {
        Self {
            name,
            quantity: 1.0,
            unit: "pcs".to_string(),
            position: None,
            price: None,
            expiry: None,
            variant: Variant::default(),
            confidence: 0.0,
        }
    }
}

/// A known product name supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
}

impl CatalogItem {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}

/// Aggregate outcome of interpreting one utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub intent: Intent,
    /// Accepted entities, in the order their segments appeared.
    pub products: Vec<ProductEntity>,
    /// Utterance-wide location, applied to entities lacking their own.
    pub detected_location: Option<String>,
    pub needs_clarification: bool,
    pub clarification_question: Option<String>,
    /// Candidate canonical names, highest similarity first.
    pub clarification_options: Vec<String>,
}

impl ParseResult {
    pub fn empty(intent: Intent) -> Self {
        Self {
            intent,
            products: Vec::new(),
            detected_location: None,
            needs_clarification: false,
            clarification_question: None,
            clarification_options: Vec::new(),
        }
    }
}
