use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

struct Slot<V> {
    cell: Arc<OnceCell<V>>,
    touched: u64,
}

struct Inner<K, V> {
    slots: HashMap<K, Slot<V>>,
    recency: BTreeMap<u64, K>,
    tick: u64,
}

/// Bounded least-recently-used memo with at most one in-flight
/// computation per key.
///
/// Concurrent callers for the same key share one `OnceCell`; the first
/// runs the initializer, the rest await its result. A failed initializer
/// leaves no slot behind so the next caller computes again. Eviction only
/// drops resolved slots; while every older slot is still in flight the
/// cache may briefly hold more than `capacity` keys.
pub struct SingleFlightCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                recency: BTreeMap::new(),
                tick: 0,
            }),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.touch(key.clone());

        if let Some(value) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }

        let mut ran_init = false;
        let result = cell
            .get_or_try_init(|| {
                ran_init = true;
                init()
            })
            .await
            .map(V::clone);

        if ran_init {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else if result.is_ok() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        if result.is_err() {
            self.discard_failed(&key, cell);
        }
        result
    }

    /// Cached value without computing or refreshing recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        let inner = self.inner.lock();
        inner.slots.get(key).and_then(|slot| slot.cell.get().cloned())
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: inner.slots.values().filter(|slot| slot.cell.initialized()).count(),
            capacity: self.capacity,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.recency.clear();
    }

    fn touch(&self, key: K) -> Arc<OnceCell<V>> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(slot) = inner.slots.get_mut(&key) {
            let previous = std::mem::replace(&mut slot.touched, tick);
            let cell = Arc::clone(&slot.cell);
            inner.recency.remove(&previous);
            inner.recency.insert(tick, key);
            return cell;
        }

        let cell = Arc::new(OnceCell::new());
        inner.slots.insert(
            key.clone(),
            Slot {
                cell: Arc::clone(&cell),
                touched: tick,
            },
        );
        inner.recency.insert(tick, key);

        while inner.slots.len() > self.capacity {
            let victim = inner
                .recency
                .iter()
                .find(|(_, k)| inner.slots.get(*k).is_some_and(|slot| slot.cell.initialized()))
                .map(|(&touched, k)| (touched, k.clone()));
            let Some((touched, oldest)) = victim else {
                break;
            };
            inner.recency.remove(&touched);
            inner.slots.remove(&oldest);
        }
        cell
    }

    /// Drop the slot of a failed computation unless another caller still
    /// holds its cell or it has been replaced or resolved meanwhile.
    fn discard_failed(&self, key: &K, cell: Arc<OnceCell<V>>) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let stale = inner.slots.get(key).is_some_and(|slot| {
            Arc::ptr_eq(&slot.cell, &cell) && !cell.initialized() && Arc::strong_count(&cell) == 2
        });
        if stale {
            if let Some(slot) = inner.slots.remove(key) {
                inner.recency.remove(&slot.touched);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let cache = Arc::new(SingleFlightCache::<String, u32>::new(8));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .get_or_try_insert_with("k".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(42)
                    })
                    .await
            }
        });
        let results = futures_util::future::join_all(tasks).await;

        assert!(results.iter().all(|r| *r == Ok(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let cache = SingleFlightCache::<u32, u32>::new(2);
        for key in [1, 2] {
            cache.get_or_try_insert_with(key, || async move { Ok::<_, ()>(key * 10) }).await.unwrap();
        }
        // refresh 1 so that 2 becomes the eviction candidate
        cache.get_or_try_insert_with(1, || async { Ok::<_, ()>(0) }).await.unwrap();
        cache.get_or_try_insert_with(3, || async { Ok::<_, ()>(30) }).await.unwrap();

        assert_eq!(cache.peek(&1), Some(10));
        assert_eq!(cache.peek(&2), None);
        assert_eq!(cache.peek(&3), Some(30));
        assert_eq!(cache.stats().entries, 2);
    }

    #[tokio::test]
    async fn test_failed_initializer_is_not_cached() {
        let cache = SingleFlightCache::<&'static str, u32>::new(4);
        let err = cache
            .get_or_try_insert_with("k", || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(err, Err("boom"));
        assert_eq!(cache.peek(&"k"), None);
        assert_eq!(cache.stats().entries, 0);

        let ok = cache.get_or_try_insert_with("k", || async { Ok::<_, &str>(7) }).await;
        assert_eq!(ok, Ok(7));
        assert_eq!(cache.stats().misses, 2);
    }

    #[tokio::test]
    async fn test_in_flight_key_survives_eviction_pressure() {
        let cache = Arc::new(SingleFlightCache::<u32, u32>::new(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow = |cache: Arc<SingleFlightCache<u32, u32>>, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_try_insert_with(1, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, ()>(10)
                })
                .await
        };

        let first = tokio::spawn(slow(Arc::clone(&cache), Arc::clone(&calls)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.get_or_try_insert_with(2, || async { Ok::<_, ()>(20) }).await.unwrap();
        let second = tokio::spawn(slow(Arc::clone(&cache), Arc::clone(&calls)));

        assert_eq!(first.await.unwrap(), Ok(10));
        assert_eq!(second.await.unwrap(), Ok(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_or_try_insert_with(3, || async { Ok::<_, ()>(30) }).await.unwrap();
        assert_eq!(cache.stats().entries, 1);
        assert_eq!(cache.peek(&3), Some(30));
    }

    #[tokio::test]
    async fn test_failed_keys_do_not_evict_cached_values() {
        let cache = SingleFlightCache::<u32, u32>::new(2);
        cache.get_or_try_insert_with(1, || async { Ok::<_, &str>(10) }).await.unwrap();
        for key in [2, 3] {
            let result = cache.get_or_try_insert_with(key, || async { Err::<u32, _>("boom") }).await;
            assert_eq!(result, Err("boom"));
        }

        assert_eq!(cache.peek(&1), Some(10));
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.misses, 3);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let cache = SingleFlightCache::<u8, u8>::new(0);
        assert_eq!(cache.stats().capacity, 1);
    }
}
