//! Generic TTL + LRU cache.
//!
//! One reusable keyed store instantiated per resource kind (catalog, item
//! detail, quotes, history, aggregate pages), each tier with its own TTL and
//! capacity. Interior mutex so a single instance is shared behind `&self`
//! across tasks.

mod ttl_lru;

pub use ttl_lru::{CacheStats, TtlLruCache};
