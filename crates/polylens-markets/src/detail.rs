//! Item detail and quote resolver.
//!
//! Upstream has no by-id endpoint, so single-item lookups scan one bounded
//! bulk page of active markets. Quote pairs are derived from two concurrent
//! order-book reads and cached in a faster-expiring tier than the item
//! metadata.

use polylens_cache::TtlLruCache;
use polylens_client::MarketApi;
use polylens_core::{
    ClientConfig, FetchError, FetchResult, MarketItem, OrderBook, PricePoint, QuotePair,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Single-item lookups: detail, derived quotes and price history.
pub struct DetailResolver {
    api: Arc<dyn MarketApi>,
    details: TtlLruCache<String, MarketItem>,
    quotes: TtlLruCache<String, QuotePair>,
    history: TtlLruCache<(String, String), Vec<PricePoint>>,
    bulk_page_size: usize,
    history_fidelity: u32,
}

impl DetailResolver {
    pub fn new(api: Arc<dyn MarketApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            details: TtlLruCache::new(config.tiers.detail.capacity, config.tiers.detail.ttl()),
            quotes: TtlLruCache::new(config.tiers.quote.capacity, config.tiers.quote.ttl()),
            history: TtlLruCache::new(config.tiers.history.capacity, config.tiers.history.ttl()),
            bulk_page_size: config.bulk_page_size,
            history_fidelity: config.history_fidelity,
        }
    }

    /// Look up one market by id or slug.
    ///
    /// A full-scan miss of the bulk page is terminal `NotFound`.
    pub async fn get_detail(&self, item_id: &str) -> FetchResult<MarketItem> {
        let key = item_id.to_string();
        if let Some(item) = self.details.get(&key) {
            return Ok(item);
        }

        let page = self.api.fetch_active_markets(self.bulk_page_size).await?;
        let hit = page
            .into_iter()
            .find(|m| m.id == item_id || m.slug == item_id);
        match hit {
            Some(item) => {
                debug!(item_id, market_id = %item.id, "detail resolved via bulk scan");
                self.details.set(key, item.clone());
                Ok(item)
            }
            None => Err(FetchError::NotFound(format!(
                "market {item_id} not in active listing"
            ))),
        }
    }

    /// Derive the two-sided quote for a binary market.
    ///
    /// Both outcome books are fetched concurrently; one side failing
    /// degrades that side to an empty book rather than failing the call.
    pub async fn get_quotes(&self, item_id: &str) -> FetchResult<QuotePair> {
        let key = item_id.to_string();
        if let Some(pair) = self.quotes.get(&key) {
            return Ok(pair);
        }

        let item = self.get_detail(item_id).await?;
        let (yes_token, no_token) = match item.clob_token_ids.as_slice() {
            [yes, no] => (yes.clone(), no.clone()),
            _ => {
                return Err(FetchError::NotFound(format!(
                    "market {item_id} does not have exactly two outcome tokens"
                )))
            }
        };

        let (yes_book, no_book) =
            tokio::join!(self.fetch_book(&yes_token), self.fetch_book(&no_token));
        let yes = side_quote(&yes_book);
        let no = side_quote(&no_book);

        let pair = QuotePair {
            yes: yes.price,
            no: no.price,
            spread: yes.spread.round_dp(4),
            synthetic: yes.synthetic || no.synthetic,
        };
        self.quotes.set(key, pair);
        Ok(pair)
    }

    /// Price history for the item's first outcome token, cached per
    /// (item, interval).
    pub async fn get_price_history(
        &self,
        item_id: &str,
        interval: &str,
    ) -> FetchResult<Vec<PricePoint>> {
        let key = (item_id.to_string(), interval.to_string());
        if let Some(points) = self.history.get(&key) {
            return Ok(points);
        }

        let item = self.get_detail(item_id).await?;
        let token = item.clob_token_ids.first().ok_or_else(|| {
            FetchError::NotFound(format!("market {item_id} has no outcome tokens"))
        })?;
        let points = self
            .api
            .fetch_price_history(token, interval, self.history_fidelity)
            .await?;
        self.history.set(key, points.clone());
        Ok(points)
    }

    async fn fetch_book(&self, token_id: &str) -> OrderBook {
        match self.api.fetch_order_book(token_id).await {
            Ok(book) => book,
            Err(err) => {
                warn!(token_id, error = %err, "order book fetch failed, treating as empty");
                OrderBook::default()
            }
        }
    }
}

struct SideQuote {
    price: Decimal,
    spread: Decimal,
    synthetic: bool,
}

/// Best-price mid for one side's book.
///
/// An empty or one-sided book yields the fixed neutral 0.50 instead of an
/// error: no liquidity is reported as maximum uncertainty, flagged
/// `synthetic` so callers can tell it from a real even market.
fn side_quote(book: &OrderBook) -> SideQuote {
    match (book.best_bid(), book.best_ask()) {
        (Some(bid), Some(ask)) => SideQuote {
            price: (bid + ask) / Decimal::TWO,
            spread: ask - bid,
            synthetic: false,
        },
        _ => SideQuote {
            price: Decimal::new(50, 2),
            spread: Decimal::ZERO,
            synthetic: true,
        },
    }
}
