use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info};

use super::KeyLocks;
use crate::constants::SYMBOL_KEY_PREFIX;
use crate::errors::{Result, ValidationError};
use crate::store::KeyValueStore;
use crate::symbols::{symbol_key, IdentifierType, IndexKey, SymbolRecord};

/// What [`SymbolIndex::upsert`] did to the stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
    Unchanged,
}

/// Bidirectional mapping between identifiers and canonical records.
///
/// Records live under `symbol:{symbolId}`; each non-blank identifier maps
/// `xref:{type}:{VALUE}` to the owning symbol id. Mutations of one symbol
/// are serialized through [`KeyLocks`]. When two symbols claim the same
/// identifier the last write wins.
pub struct SymbolIndex {
    store: Arc<dyn KeyValueStore>,
    locks: KeyLocks,
}

impl SymbolIndex {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            locks: KeyLocks::new(),
        }
    }

    /// Resolve an identifier to the owning symbol id.
    pub async fn resolve(&self, id_type: IdentifierType, value: &str) -> Result<Option<String>> {
        let key = IndexKey::new(id_type, value).ok_or(ValidationError::EmptyIdentifierValue)?;
        self.store.get(&key.storage_key()).await
    }

    /// Fetch the canonical record of a symbol.
    pub async fn get_record(&self, symbol_id: &str) -> Result<Option<SymbolRecord>> {
        if symbol_id.trim().is_empty() {
            return Err(ValidationError::EmptySymbolId.into());
        }
        let fields = self.store.hash_get_all(&symbol_key(symbol_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(SymbolRecord::from_fields(symbol_id, &fields)))
    }

    /// Write a record and index each of its non-blank identifiers.
    ///
    /// Idempotent. Does not retract entries of a previously stored version
    /// of the record; use [`replace`](Self::replace) for that.
    pub async fn put(&self, record: &SymbolRecord) -> Result<()> {
        record.validate()?;
        let _guard = self.locks.lock(&record.symbol_id).await;
        self.write_record(record).await
    }

    /// Move a record from `old` to `new`.
    ///
    /// Entries implied by `old` that `new` no longer carries are retracted
    /// first, then `new` is written as by [`put`](Self::put). Entries of the
    /// version stored when the symbol lock is taken are retracted as well,
    /// so a caller holding an outdated `old` cannot leave one behind.
    pub async fn replace(&self, old: &SymbolRecord, new: &SymbolRecord) -> Result<()> {
        new.validate()?;
        if old.symbol_id != new.symbol_id {
            return Err(ValidationError::SymbolIdMismatch {
                old: old.symbol_id.clone(),
                new: new.symbol_id.clone(),
            }
            .into());
        }

        let _guard = self.locks.lock(&new.symbol_id).await;

        let stored = self.get_record(&new.symbol_id).await?;
        let mut stale = old.index_keys();
        if let Some(stored) = &stored {
            stale.extend(stored.index_keys());
        }
        self.retract_stale(&new.symbol_id, stale, new).await?;
        self.write_record(new).await
    }

    /// Bring the stored version of `record` up to date.
    ///
    /// The read, the comparison of tracked identifiers and the re-indexing
    /// all run under one symbol lock. Changes to untracked fields alone
    /// leave the stored version as it is.
    pub async fn upsert(&self, record: &SymbolRecord) -> Result<UpsertOutcome> {
        record.validate()?;
        let _guard = self.locks.lock(&record.symbol_id).await;

        let Some(stored) = self.get_record(&record.symbol_id).await? else {
            self.write_record(record).await?;
            return Ok(UpsertOutcome::Added);
        };
        if !stored.tracked_identifiers_differ(record) {
            debug!("Symbol {} unchanged", record.symbol_id);
            return Ok(UpsertOutcome::Unchanged);
        }

        self.retract_stale(&record.symbol_id, stored.index_keys(), record)
            .await?;
        self.write_record(record).await?;
        Ok(UpsertOutcome::Updated)
    }

    /// Remove a symbol and every index entry it owns.
    ///
    /// Returns `false` when the symbol was not stored.
    pub async fn remove(&self, symbol_id: &str) -> Result<bool> {
        if symbol_id.trim().is_empty() {
            return Err(ValidationError::EmptySymbolId.into());
        }
        let _guard = self.locks.lock(symbol_id).await;

        let Some(record) = self.get_record(symbol_id).await? else {
            debug!("Symbol {} not stored, nothing to remove", symbol_id);
            return Ok(false);
        };

        for key in record.index_keys() {
            self.retract(&key, symbol_id).await?;
        }
        self.store.delete(&symbol_key(symbol_id)).await?;
        info!("Deleted symbol: {}", symbol_id);
        Ok(true)
    }

    /// Every symbol id with a stored record.
    pub async fn list_all_symbol_ids(&self) -> Result<HashSet<String>> {
        let keys = self.store.scan_prefix(SYMBOL_KEY_PREFIX).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(SYMBOL_KEY_PREFIX).map(str::to_string))
            .collect())
    }

    async fn write_record(&self, record: &SymbolRecord) -> Result<()> {
        self.store
            .hash_replace(&symbol_key(&record.symbol_id), &record.to_fields())
            .await?;
        for key in record.index_keys() {
            self.store
                .set(&key.storage_key(), &record.symbol_id)
                .await?;
        }
        info!("Saved symbol: {}", record.symbol_id);
        Ok(())
    }

    /// Retract each of `keys` that `new` does not carry.
    async fn retract_stale(
        &self,
        symbol_id: &str,
        keys: Vec<IndexKey>,
        new: &SymbolRecord,
    ) -> Result<()> {
        let retained: HashSet<IndexKey> = new.index_keys().into_iter().collect();
        let stale: HashSet<IndexKey> = keys
            .into_iter()
            .filter(|key| !retained.contains(key))
            .collect();
        for key in &stale {
            self.retract(key, symbol_id).await?;
        }
        Ok(())
    }

    /// Delete an index entry only while it still points at `symbol_id`.
    async fn retract(&self, key: &IndexKey, symbol_id: &str) -> Result<()> {
        let removed = self
            .store
            .delete_if_equals(&key.storage_key(), symbol_id)
            .await?;
        if !removed {
            debug!(
                "Index entry {} no longer owned by {}, left in place",
                key.storage_key(),
                symbol_id
            );
        }
        Ok(())
    }
}

