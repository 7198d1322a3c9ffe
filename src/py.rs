//! Python bindings for the voice command engine using PyO3

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::dates::DateOrder;
use crate::normalize::normalize;
use crate::pipeline::{ParserConfig, VoiceParser};
use crate::similarity::similarity;
use crate::types::{CatalogItem, Intent};

/// Normalize a raw transcript (Python function)
#[pyfunction]
pub fn py_normalize_text(text: &str) -> String {
    normalize(text)
}

/// Similarity score between two names (Python function)
#[pyfunction]
pub fn py_similarity(a: &str, b: &str) -> f64 {
    similarity(a, b)
}

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::AddProduct => "add_product",
        Intent::RemoveProduct => "remove_product",
        Intent::UpdateProduct => "update_product",
        Intent::SearchProduct => "search_product",
        Intent::CreateBill => "create_bill",
        Intent::Unknown => "unknown",
    }
}

/// Python wrapper for the voice command parser
#[pyclass]
pub struct PyVoiceParser {
    parser: VoiceParser,
}

#[pymethods]
impl PyVoiceParser {
    #[new]
    #[pyo3(signature = (month_first=false, clarification_threshold=None))]
    fn new(month_first: bool, clarification_threshold: Option<f64>) -> Self {
        let mut config = ParserConfig::default();
        if month_first {
            config.date_order = DateOrder::MonthFirst;
        }
        if let Some(threshold) = clarification_threshold {
            config.clarification_threshold = threshold;
        }
        Self {
            parser: VoiceParser::with_config(config),
        }
    }

    /// Parse one utterance against the supplied catalog names
    fn parse<'py>(
        &self,
        text: &str,
        catalog: Vec<String>,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let items: Vec<CatalogItem> = catalog.into_iter().map(CatalogItem::new).collect();
        let result = self.parser.parse(text, &items);

        let dict = PyDict::new_bound(py);
        dict.set_item("intent", intent_label(result.intent))?;
        dict.set_item("detected_location", result.detected_location)?;
        dict.set_item("needs_clarification", result.needs_clarification)?;
        dict.set_item("clarification_question", result.clarification_question)?;
        dict.set_item("clarification_options", result.clarification_options)?;
        // Products carry nested structure; hand them over as JSON
        let products_json = serde_json::to_string(&result.products).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to serialize products: {}",
                e
            ))
        })?;
        dict.set_item("products", products_json)?;
        Ok(dict)
    }
}
