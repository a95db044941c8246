use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key async locks.
///
/// Mutations of the same symbol are serialized; mutations of different
/// symbols proceed in parallel. Entries are dropped once no task holds or
/// waits on them, so the map only tracks symbols currently being mutated.
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// RAII guard returned by [`KeyLocks::lock`]. Releases on drop.
pub struct KeyLockGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `key` is free and take it.
    pub async fn lock(&self, key: &str) -> KeyLockGuard<'_> {
        let mutex = self.locks.entry(key.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;
        KeyLockGuard {
            locks: &self.locks,
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for KeyLockGuard<'_> {
    fn drop(&mut self) {
        // One reference in the map, one in our guard: nobody else is waiting.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 2);
    }
}
