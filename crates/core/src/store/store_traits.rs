use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::errors::Result;

/// Minimal key-value operations the cross-reference index needs.
///
/// Keys hold either a plain string value (index entries) or a field map
/// (canonical records). Implementations report transport failures as
/// [`StoreError::ConnectionFailed`](crate::errors::StoreError::ConnectionFailed)
/// or [`StoreError::CommandFailed`](crate::errors::StoreError::CommandFailed).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a string value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a string value, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key of any kind. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically delete `key` only if its current value equals `expected`.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool>;

    /// Read every field of a field map. A missing key yields an empty map.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Atomically replace the whole field map stored at `key`.
    async fn hash_replace(&self, key: &str, fields: &BTreeMap<String, String>) -> Result<()>;

    /// List every key starting with `prefix`.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}
