//! Symbol records and identifier types.

mod symbols_model;

#[cfg(test)]
mod symbols_model_tests;

pub use symbols_model::{normalize_identifier, symbol_key, IdentifierType, IndexKey, SymbolRecord};
