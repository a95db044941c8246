//! Cross-reference service facade.
//!
//! The single entry point used by transport layers: lookups, manual edits
//! and on-demand refreshes.

mod xref_model;
mod xref_service;
mod xref_traits;


pub use xref_model::{CircuitStatus, ServiceHealth};
pub use xref_service::CrossReferenceService;
pub use xref_traits::CrossReferenceServiceTrait;
