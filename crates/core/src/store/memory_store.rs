use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::warn;

use super::KeyValueStore;
use crate::errors::{Result, StoreError};

#[derive(Clone, Debug)]
enum Value {
    Text(String),
    Hash(BTreeMap<String, String>),
}

/// In-process [`KeyValueStore`].
///
/// Every operation is applied under a single lock, so each call is atomic.
/// [`set_unavailable`](Self::set_unavailable) makes every call fail with a
/// connection error, which is how degraded mode is exercised without a
/// real outage.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys currently held, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionFailed("memory store marked unavailable".into()).into());
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("MemoryStore lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("MemoryStore lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

fn wrong_type(key: &str) -> crate::errors::Error {
    StoreError::UnexpectedReply(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
        key
    ))
    .into()
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        match self.read().get(key) {
            None => Ok(None),
            Some(Value::Text(v)) => Ok(Some(v.clone())),
            Some(Value::Hash(_)) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.write()
            .insert(key.to_string(), Value::Text(value.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self.write().remove(key).is_some())
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool> {
        self.check_available()?;
        let mut entries = self.write();
        match entries.get(key) {
            Some(Value::Text(v)) if v == expected => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        self.check_available()?;
        match self.read().get(key) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(fields)) => Ok(fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Some(Value::Text(_)) => Err(wrong_type(key)),
        }
    }

    async fn hash_replace(&self, key: &str, fields: &BTreeMap<String, String>) -> Result<()> {
        self.check_available()?;
        let mut entries = self.write();
        if fields.is_empty() {
            entries.remove(key);
        } else {
            entries.insert(key.to_string(), Value::Hash(fields.clone()));
        }
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
