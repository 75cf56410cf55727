//! Typed upstream API surface.
//!
//! `MarketApi` is the seam the resolver, aggregator and detail layers call
//! through; `GammaClobClient` is the production implementation speaking to
//! the Gamma catalog/listing API and the CLOB order-book API, with every
//! call wrapped in the retry coordinator and normalized at the boundary.

use crate::normalize;
use crate::retry::{with_retry, RetryPolicy};
use crate::transport::{BoxFuture, HttpTransport};
use polylens_core::{
    ClientConfig, FetchResult, MarketItem, OrderBook, PricePoint, TopicCatalogEntry,
};
use serde_json::Value;

/// Read-only upstream API, one method per endpoint.
pub trait MarketApi: Send + Sync {
    /// First `limit` entries of the topic catalog.
    fn fetch_tags(&self, limit: usize) -> BoxFuture<'_, FetchResult<Vec<TopicCatalogEntry>>>;

    /// Direct catalog lookup by slug; `NotFound` on a clean miss.
    fn fetch_tag_by_slug<'a>(
        &'a self,
        slug: &'a str,
    ) -> BoxFuture<'a, FetchResult<TopicCatalogEntry>>;

    /// Open markets carrying the given tag.
    fn fetch_markets_by_tag(
        &self,
        tag_id: u64,
        limit: usize,
    ) -> BoxFuture<'_, FetchResult<Vec<MarketItem>>>;

    /// One bounded page of the bulk active-market listing.
    fn fetch_active_markets(&self, limit: usize) -> BoxFuture<'_, FetchResult<Vec<MarketItem>>>;

    /// Order book for one outcome token.
    fn fetch_order_book<'a>(&'a self, token_id: &'a str) -> BoxFuture<'a, FetchResult<OrderBook>>;

    /// Price history for one outcome token.
    fn fetch_price_history<'a>(
        &'a self,
        token_id: &'a str,
        interval: &'a str,
        fidelity: u32,
    ) -> BoxFuture<'a, FetchResult<Vec<PricePoint>>>;
}

/// Production client over the two upstream APIs.
pub struct GammaClobClient<T> {
    transport: T,
    gamma_base_url: String,
    clob_base_url: String,
    retry: RetryPolicy,
}

impl<T: HttpTransport> GammaClobClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            gamma_base_url: config.gamma_base_url.trim_end_matches('/').to_string(),
            clob_base_url: config.clob_base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from(&config.retry),
        }
    }

    async fn get(&self, op: &'static str, url: String) -> FetchResult<Value> {
        with_retry(op, &self.retry, || self.transport.get_json(&url)).await
    }
}

impl<T: HttpTransport> MarketApi for GammaClobClient<T> {
    fn fetch_tags(&self, limit: usize) -> BoxFuture<'_, FetchResult<Vec<TopicCatalogEntry>>> {
        Box::pin(async move {
            let url = format!("{}/tags?limit={limit}", self.gamma_base_url);
            let value = self.get("fetch_tags", url).await?;
            normalize::parse_tags(&value)
        })
    }

    fn fetch_tag_by_slug<'a>(
        &'a self,
        slug: &'a str,
    ) -> BoxFuture<'a, FetchResult<TopicCatalogEntry>> {
        Box::pin(async move {
            let url = format!("{}/tags/slug/{slug}", self.gamma_base_url);
            let value = self.get("fetch_tag_by_slug", url).await?;
            normalize::parse_tag(&value)
        })
    }

    fn fetch_markets_by_tag(
        &self,
        tag_id: u64,
        limit: usize,
    ) -> BoxFuture<'_, FetchResult<Vec<MarketItem>>> {
        Box::pin(async move {
            let url = format!(
                "{}/markets?tag_id={tag_id}&closed=false&limit={limit}",
                self.gamma_base_url
            );
            let value = self.get("fetch_markets_by_tag", url).await?;
            normalize::parse_markets(&value)
        })
    }

    fn fetch_active_markets(&self, limit: usize) -> BoxFuture<'_, FetchResult<Vec<MarketItem>>> {
        Box::pin(async move {
            let url = format!(
                "{}/markets?closed=false&limit={limit}",
                self.gamma_base_url
            );
            let value = self.get("fetch_active_markets", url).await?;
            normalize::parse_markets(&value)
        })
    }

    fn fetch_order_book<'a>(&'a self, token_id: &'a str) -> BoxFuture<'a, FetchResult<OrderBook>> {
        Box::pin(async move {
            let url = format!("{}/book?token_id={token_id}", self.clob_base_url);
            let value = self.get("fetch_order_book", url).await?;
            normalize::parse_order_book(&value)
        })
    }

    fn fetch_price_history<'a>(
        &'a self,
        token_id: &'a str,
        interval: &'a str,
        fidelity: u32,
    ) -> BoxFuture<'a, FetchResult<Vec<PricePoint>>> {
        Box::pin(async move {
            let url = format!(
                "{}/prices-history?market={token_id}&interval={interval}&fidelity={fidelity}",
                self.clob_base_url
            );
            let value = self.get("fetch_price_history", url).await?;
            normalize::parse_price_history(&value)
        })
    }
}
