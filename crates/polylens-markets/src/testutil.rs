//! Hand-rolled `MarketApi` mock shared by the in-crate tests.

use polylens_client::{BoxFuture, MarketApi};
use polylens_core::{
    FetchError, FetchResult, MarketItem, OrderBook, PricePoint, TopicCatalogEntry,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Canned upstream: every call counts against `calls` and answers from the
/// configured fixtures.
#[derive(Default)]
pub(crate) struct MockApi {
    pub tags: Vec<TopicCatalogEntry>,
    pub direct: HashMap<String, TopicCatalogEntry>,
    pub direct_failure: bool,
    pub markets_by_tag: HashMap<u64, Vec<MarketItem>>,
    pub tag_failures: HashSet<u64>,
    pub active: Vec<MarketItem>,
    pub active_failure: bool,
    pub books: HashMap<String, OrderBook>,
    pub book_failures: HashSet<String>,
    pub history: HashMap<String, Vec<PricePoint>>,
    pub calls: AtomicU64,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, tags: Vec<TopicCatalogEntry>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_direct_tag(mut self, slug: &str, entry: TopicCatalogEntry) -> Self {
        self.direct.insert(slug.to_string(), entry);
        self
    }

    pub fn with_direct_failure(mut self) -> Self {
        self.direct_failure = true;
        self
    }

    pub fn with_tag_markets(mut self, tag_id: u64, markets: Vec<MarketItem>) -> Self {
        self.markets_by_tag.insert(tag_id, markets);
        self
    }

    pub fn with_tag_failure(mut self, tag_id: u64) -> Self {
        self.tag_failures.insert(tag_id);
        self
    }

    pub fn with_active(mut self, markets: Vec<MarketItem>) -> Self {
        self.active = markets;
        self
    }

    pub fn with_active_failure(mut self) -> Self {
        self.active_failure = true;
        self
    }

    pub fn with_book(mut self, token_id: &str, book: OrderBook) -> Self {
        self.books.insert(token_id.to_string(), book);
        self
    }

    pub fn with_book_failure(mut self, token_id: &str) -> Self {
        self.book_failures.insert(token_id.to_string());
        self
    }

    pub fn with_history(mut self, token_id: &str, points: Vec<PricePoint>) -> Self {
        self.history.insert(token_id.to_string(), points);
        self
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl MarketApi for MockApi {
    fn fetch_tags(&self, _limit: usize) -> BoxFuture<'_, FetchResult<Vec<TopicCatalogEntry>>> {
        self.count();
        let tags = self.tags.clone();
        Box::pin(async move { Ok(tags) })
    }

    fn fetch_tag_by_slug<'a>(
        &'a self,
        slug: &'a str,
    ) -> BoxFuture<'a, FetchResult<TopicCatalogEntry>> {
        self.count();
        let result = if self.direct_failure {
            Err(FetchError::Network("mock transport down".to_string()))
        } else {
            self.direct
                .get(slug)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(slug.to_string()))
        };
        Box::pin(async move { result })
    }

    fn fetch_markets_by_tag(
        &self,
        tag_id: u64,
        _limit: usize,
    ) -> BoxFuture<'_, FetchResult<Vec<MarketItem>>> {
        self.count();
        let result = if self.tag_failures.contains(&tag_id) {
            Err(FetchError::Api {
                status: 500,
                message: "mock upstream outage".to_string(),
            })
        } else {
            Ok(self.markets_by_tag.get(&tag_id).cloned().unwrap_or_default())
        };
        Box::pin(async move { result })
    }

    fn fetch_active_markets(&self, _limit: usize) -> BoxFuture<'_, FetchResult<Vec<MarketItem>>> {
        self.count();
        let result = if self.active_failure {
            Err(FetchError::Timeout)
        } else {
            Ok(self.active.clone())
        };
        Box::pin(async move { result })
    }

    fn fetch_order_book<'a>(&'a self, token_id: &'a str) -> BoxFuture<'a, FetchResult<OrderBook>> {
        self.count();
        let result = if self.book_failures.contains(token_id) {
            Err(FetchError::Timeout)
        } else {
            Ok(self.books.get(token_id).cloned().unwrap_or_default())
        };
        Box::pin(async move { result })
    }

    fn fetch_price_history<'a>(
        &'a self,
        token_id: &'a str,
        _interval: &'a str,
        _fidelity: u32,
    ) -> BoxFuture<'a, FetchResult<Vec<PricePoint>>> {
        self.count();
        let result = self
            .history
            .get(token_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(token_id.to_string()));
        Box::pin(async move { result })
    }
}

/// Minimal market fixture with a ranking volume.
pub(crate) fn market(id: &str, volume: Option<Decimal>) -> MarketItem {
    MarketItem {
        id: id.to_string(),
        question: format!("Question {id}?"),
        slug: format!("slug-{id}"),
        volume,
        liquidity: None,
        outcomes: vec![],
        clob_token_ids: vec![],
        end_date: None,
        active: true,
        closed: false,
    }
}

/// Market fixture carrying outcome token ids.
pub(crate) fn market_with_tokens(id: &str, tokens: &[&str]) -> MarketItem {
    let mut m = market(id, None);
    m.clob_token_ids = tokens.iter().map(|t| t.to_string()).collect();
    m
}
