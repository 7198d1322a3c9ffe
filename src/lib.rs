//! Voice core - Rust implementation of the voice command interpretation
//! engine for the shop assistant
//!
//! Takes a finalized speech transcript such as "add 5 kg rice and 2 packets
//! sugar on rack 3 for ₹200" and turns it into structured inventory
//! actions: intent classification, per-product segmentation, entity
//! extraction, expiry date resolution and fuzzy catalog matching with a
//! clarification protocol for uncertain names.

pub mod types;
pub mod normalize;
pub mod intent;
pub mod segment;
pub mod entities;
pub mod dates;
pub mod similarity;
pub mod matcher;
pub mod pipeline;

pub use types::*;
pub use normalize::{normalize, normalize_unit};
pub use intent::classify;
pub use segment::segment;
pub use entities::*;
pub use dates::*;
pub use similarity::*;
pub use matcher::*;
pub use pipeline::*;

// Python bindings
#[cfg(feature = "extension-module")]
pub mod py;

#[cfg(feature = "extension-module")]
use pyo3::prelude::*;

#[cfg(feature = "extension-module")]
#[pymodule]
fn voice_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyVoiceParser>()?;
    m.add_function(wrap_pyfunction!(py_normalize_text, m)?)?;
    m.add_function(wrap_pyfunction!(py_similarity, m)?)?;
    Ok(())
}
