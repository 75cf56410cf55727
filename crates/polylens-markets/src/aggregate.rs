//! Cross-topic aggregator.
//!
//! Fans out per-topic queries concurrently, merges the pages in input-topic
//! order, de-duplicates by item id (first seen wins), ranks by weight and
//! truncates. Individual topic failures degrade the aggregate; they never
//! abort it.

use crate::resolver::TagResolver;
use futures_util::future::join_all;
use polylens_cache::TtlLruCache;
use polylens_client::MarketApi;
use polylens_core::{ClientConfig, FetchResult, MarketItem};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Multi-topic discovery over resolved tags.
pub struct CrossTopicAggregator {
    api: Arc<dyn MarketApi>,
    resolver: Arc<TagResolver>,
    /// Per-tag listing pages, keyed by (tag id, page limit).
    pages: TtlLruCache<(u64, usize), Vec<MarketItem>>,
}

impl CrossTopicAggregator {
    pub fn new(api: Arc<dyn MarketApi>, resolver: Arc<TagResolver>, config: &ClientConfig) -> Self {
        Self {
            api,
            resolver,
            pages: TtlLruCache::new(
                config.tiers.aggregate.capacity,
                config.tiers.aggregate.ttl(),
            ),
        }
    }

    /// Merge up to `per_topic_limit` items per topic into one ranked list of
    /// at most `total_limit`.
    ///
    /// Output order is a stable function of ranking weight only; ties keep
    /// first-seen (input-topic) order. All topics failing yields an empty
    /// list, not an error.
    pub async fn aggregate(
        &self,
        topics: &[String],
        per_topic_limit: usize,
        total_limit: usize,
    ) -> FetchResult<Vec<MarketItem>> {
        let fetches = topics
            .iter()
            .map(|topic| self.fetch_topic(topic, per_topic_limit));
        let pages = join_all(fetches).await;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for page in pages {
            for item in page {
                if seen.insert(item.id.clone()) {
                    merged.push(item);
                }
            }
        }

        // Stable sort: equal weights keep first-seen order.
        merged.sort_by(|a, b| b.ranking_weight().cmp(&a.ranking_weight()));
        merged.truncate(total_limit);
        debug!(
            topics = topics.len(),
            items = merged.len(),
            "aggregated cross-topic listing"
        );
        Ok(merged)
    }

    /// One topic's page; any failure degrades to an empty page.
    async fn fetch_topic(&self, topic: &str, limit: usize) -> Vec<MarketItem> {
        let tag_id = match self.resolver.resolve(topic).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(topic, "topic did not resolve to a catalog tag");
                return Vec::new();
            }
            Err(err) => {
                warn!(topic, error = %err, "topic resolution failed");
                return Vec::new();
            }
        };

        if let Some(page) = self.pages.get(&(tag_id, limit)) {
            return page;
        }

        match self.api.fetch_markets_by_tag(tag_id, limit).await {
            Ok(page) => {
                self.pages.set((tag_id, limit), page.clone());
                page
            }
            Err(err) => {
                warn!(topic, tag_id, error = %err, "per-topic fetch failed, degrading");
                Vec::new()
            }
        }
    }
}
