//! Owning service facade.

use crate::aggregate::CrossTopicAggregator;
use crate::detail::DetailResolver;
use crate::resolver::TagResolver;
use polylens_client::{GammaClobClient, MarketApi, ReqwestTransport};
use polylens_core::{
    ClientConfig, ConfigError, FetchResult, MarketItem, PricePoint, QuotePair,
};
use std::sync::Arc;
use std::time::Duration;

/// One coherent read path over the upstream market APIs.
///
/// Owns every cache tier as an explicit field, constructed from
/// [`ClientConfig`]; there is no ambient or global state. Consumers
/// (conversational handlers, dashboard routes) call the query methods and
/// receive plain records or a typed [`polylens_core::FetchError`].
pub struct MarketDataService {
    resolver: Arc<TagResolver>,
    aggregator: CrossTopicAggregator,
    details: DetailResolver,
}

impl MarketDataService {
    /// Build the production service over a reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = ReqwestTransport::new(Duration::from_millis(config.request_timeout_ms))
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP transport: {e}")))?;
        let api: Arc<dyn MarketApi> = Arc::new(GammaClobClient::new(transport, &config));
        Ok(Self::with_api(api, &config))
    }

    /// Build over an existing API implementation. Tests inject mocks here.
    pub fn with_api(api: Arc<dyn MarketApi>, config: &ClientConfig) -> Self {
        let resolver = Arc::new(TagResolver::new(api.clone(), config));
        Self {
            aggregator: CrossTopicAggregator::new(api.clone(), resolver.clone(), config),
            details: DetailResolver::new(api, config),
            resolver,
        }
    }

    /// Multi-topic discovery: merged, de-duplicated, ranked, truncated.
    pub async fn aggregate(
        &self,
        topics: &[String],
        per_topic_limit: usize,
        total_limit: usize,
    ) -> FetchResult<Vec<MarketItem>> {
        self.aggregator
            .aggregate(topics, per_topic_limit, total_limit)
            .await
    }

    /// Single-item lookup by id or slug.
    pub async fn get_detail(&self, item_id: &str) -> FetchResult<MarketItem> {
        self.details.get_detail(item_id).await
    }

    /// Derived two-sided quote for a binary market.
    pub async fn get_quotes(&self, item_id: &str) -> FetchResult<QuotePair> {
        self.details.get_quotes(item_id).await
    }

    /// Price history for the item's first outcome token.
    pub async fn get_price_history(
        &self,
        item_id: &str,
        interval: &str,
    ) -> FetchResult<Vec<PricePoint>> {
        self.details.get_price_history(item_id, interval).await
    }

    /// Resolve a caller topic slug to the provider's numeric tag id.
    pub async fn resolve(&self, slug: &str) -> FetchResult<Option<u64>> {
        self.resolver.resolve(slug).await
    }
}
