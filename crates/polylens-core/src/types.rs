//! Domain records for markets, quotes and order books.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry of the provider's topic catalog.
///
/// Fetched in bulk, cached wholesale with a short TTL and replaced on
/// refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCatalogEntry {
    /// Provider-internal numeric identifier.
    pub id: u64,
    /// Canonical slug (e.g., "fed_rates").
    pub slug: String,
    /// Human-readable display label (e.g., "Fed Rates").
    pub label: String,
}

/// One outcome of a market with its listed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeQuote {
    pub label: String,
    /// Listed price; None when the upstream price field was absent or malformed.
    pub price: Option<Decimal>,
}

/// The aggregated market entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    /// Stable upstream identifier.
    pub id: String,
    pub question: String,
    pub slug: String,
    /// Trading volume in USD.
    pub volume: Option<Decimal>,
    /// Resting liquidity in USD.
    pub liquidity: Option<Decimal>,
    pub outcomes: Vec<OutcomeQuote>,
    /// Order-book token ids, one per outcome. Binary markets carry exactly two.
    pub clob_token_ids: Vec<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub closed: bool,
}

impl MarketItem {
    /// Ranking weight used by the aggregator: volume, falling back to
    /// liquidity, then zero.
    pub fn ranking_weight(&self) -> Decimal {
        self.volume.or(self.liquidity).unwrap_or(Decimal::ZERO)
    }
}

/// One price level of an order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// Order book for a single outcome token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    /// Highest resting bid.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.iter().map(|level| level.price).max()
    }

    /// Lowest resting ask.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.iter().map(|level| level.price).min()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Derived two-sided quote for a binary market.
///
/// Computed from two order-book reads and cached under the parent item id
/// with a shorter TTL than the item itself, since quotes move faster than
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotePair {
    pub yes: Decimal,
    pub no: Decimal,
    /// Best ask minus best bid on the yes book, scaled to 4 decimal places.
    pub spread: Decimal,
    /// True when a side's book was empty and the neutral 0.50 fallback was
    /// substituted. Lets callers distinguish "no liquidity" from a real even
    /// market.
    pub synthetic: bool,
}

/// One sample of an outcome's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in seconds.
    pub t: i64,
    pub p: Decimal,
}
