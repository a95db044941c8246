use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{KeyValueStore, MemoryStore};
use crate::errors::Result;

/// [`MemoryStore`] wrapper that lets tests steer task interleaving.
///
/// With `yielding` set every call gives the scheduler a chance to run another
/// task first. A read armed with [`pause_on_read`](Self::pause_on_read) blocks
/// the reading task until [`resume`](Self::resume) is called.
#[derive(Default)]
pub struct ControlledStore {
    inner: MemoryStore,
    yielding: bool,
    pause_on: Mutex<Option<String>>,
    paused: Notify,
    resumed: Notify,
}

impl ControlledStore {
    pub fn yielding() -> Self {
        Self {
            yielding: true,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Pause the next `hash_get_all` of `key`.
    pub fn pause_on_read(&self, key: &str) {
        *self.pause_on.lock().unwrap() = Some(key.to_string());
    }

    /// Wait until a task is paused in the armed read.
    pub async fn wait_paused(&self) {
        self.paused.notified().await;
    }

    pub fn resume(&self) {
        self.resumed.notify_one();
    }

    async fn step(&self) {
        if self.yielding {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl KeyValueStore for ControlledStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.step().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.step().await;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.step().await;
        self.inner.delete(key).await
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool> {
        self.step().await;
        self.inner.delete_if_equals(key, expected).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        self.step().await;
        let armed = {
            let mut pause_on = self.pause_on.lock().unwrap();
            if pause_on.as_deref() == Some(key) {
                pause_on.take()
            } else {
                None
            }
        };
        let fields = self.inner.hash_get_all(key).await;
        if armed.is_some() {
            self.paused.notify_one();
            self.resumed.notified().await;
        }
        fields
    }

    async fn hash_replace(&self, key: &str, fields: &BTreeMap<String, String>) -> Result<()> {
        self.step().await;
        self.inner.hash_replace(key, fields).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.step().await;
        self.inner.scan_prefix(prefix).await
    }
}
