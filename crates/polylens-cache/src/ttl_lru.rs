//! TTL + LRU keyed store.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// A cached value plus the instant it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Snapshot of one tier's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

/// Map plus recency order, guarded together so concurrent `set` calls for
/// the same key cannot desynchronize them.
struct Inner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Recency of access, least-recently-used at the front.
    order: VecDeque<K>,
}

/// Keyed store with per-entry timestamp, fixed TTL and LRU-bounded capacity.
///
/// Expired entries are treated as absent and removed lazily on the next
/// lookup; `len() <= capacity` holds after every `set`.
pub struct TtlLruCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    ttl: Duration,
    capacity: usize,
    counters: Counters,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlLruCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            // A zero-capacity cache would evict every insert; clamp to 1.
            capacity: capacity.max(1),
            counters: Counters::default(),
        }
    }

    /// Look up a key, evicting it first if its TTL has elapsed.
    ///
    /// A hit promotes the key to most-recently-used and clones out the value.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let live = match inner.entries.get(key) {
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Some(entry) if entry.stored_at.elapsed() >= self.ttl => None,
            Some(entry) => Some(entry.value.clone()),
        };
        match live {
            Some(value) => {
                promote(&mut inner.order, key);
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                inner.entries.remove(key);
                inner.order.retain(|k| k != key);
                self.counters.expirations.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert as most-recently-used, evicting least-recently-used entries
    /// until the capacity bound holds. Re-`set` of a live key replaces the
    /// value and promotes.
    pub fn set(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&key) {
            promote(&mut inner.order, &key);
            inner.entries.insert(key, entry);
            return;
        }
        while inner.entries.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(lru) => {
                    inner.entries.remove(&lru);
                    self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                    trace!(len = inner.entries.len(), "evicted LRU entry");
                }
                None => break,
            }
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
        }
    }
}

/// Move `key` to the most-recently-used position.
fn promote<K: PartialEq + Clone>(order: &mut VecDeque<K>, key: &K) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        order.remove(pos);
    }
    order.push_back(key.clone());
}
