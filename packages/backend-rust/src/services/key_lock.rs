use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-key async critical sections. Entries are weak, so a key's mutex
/// lives only while someone holds or waits for it.
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Weak<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock();
            match locks.get(key).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    locks.retain(|_, weak| weak.strong_count() > 0);
                    let created = Arc::new(AsyncMutex::new(()));
                    locks.insert(key.clone(), Arc::downgrade(&created));
                    created
                }
            }
        };
        mutex.lock_owned().await
    }

    /// Keys with a live mutex.
    pub fn active(&self) -> usize {
        self.locks.lock().values().filter(|weak| weak.strong_count() > 0).count()
    }
}
