//! Symbol source trait definition.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::SourceSymbol;

/// Trait for downstream snapshot sources.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use xref_source::{SourceError, SourceSymbol, SymbolSource};
///
/// struct FixtureSource(Vec<SourceSymbol>);
///
/// #[async_trait]
/// impl SymbolSource for FixtureSource {
///     fn id(&self) -> &'static str {
///         "FIXTURE"
///     }
///
///     async fn fetch_all_symbols(&self) -> Result<Vec<SourceSymbol>, SourceError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait SymbolSource: Send + Sync {
    /// Unique identifier for this source.
    ///
    /// Used for logging and circuit breaker tracking.
    fn id(&self) -> &'static str;

    /// Fetch the full current universe of symbols.
    ///
    /// An `Ok` result is authoritative: an empty vector means the downstream
    /// genuinely serves no symbols. Any failure must be an `Err`.
    async fn fetch_all_symbols(&self) -> Result<Vec<SourceSymbol>, SourceError>;
}
