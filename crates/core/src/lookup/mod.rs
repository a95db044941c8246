//! Resilient identifier lookups.

mod lookup_model;
mod lookup_service;


pub use lookup_model::{invalid_response, LookupOutcome, LookupRequest, LookupResponse};
pub use lookup_service::LookupService;
