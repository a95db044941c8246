use async_trait::async_trait;

use crate::errors::Result;
use crate::symbols::SymbolRecord;

/// Supplies the authoritative set of symbols.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Fetch the complete current snapshot.
    ///
    /// A failed or short-circuited fetch is reported as
    /// [`Error::Unavailable`](crate::errors::Error::Unavailable), never as an
    /// empty snapshot. `Ok(vec![])` means the downstream genuinely holds no
    /// symbols.
    async fn fetch_snapshot(&self) -> Result<Vec<SymbolRecord>>;
}
