//! Core domain types for the polylens market read path.
//!
//! Shared records exchanged between the client, cache and market layers:
//! catalog entries, market items, derived quotes, order books, the fetch
//! error taxonomy and the client configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CacheTierConfig, ClientConfig, RetryConfig, TierConfig};
pub use error::{ConfigError, FetchError, FetchResult};
pub use types::{
    BookLevel, MarketItem, OrderBook, OutcomeQuote, PricePoint, QuotePair, TopicCatalogEntry,
};
