//! Fuzzy tag/category resolver.
//!
//! Upstream naming conventions vary in hyphen/underscore/casing
//! independently of the caller's topic vocabulary, so caller slugs are
//! matched against a normalized-variant index built from the full catalog,
//! with a direct lookup endpoint as the fallback on a full miss.

use dashmap::DashMap;
use polylens_cache::TtlLruCache;
use polylens_client::MarketApi;
use polylens_core::{ClientConfig, FetchError, FetchResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// The catalog index is cached wholesale under a single key and replaced on
/// refresh, never mutated in place.
const CATALOG_KEY: &str = "catalog";

/// Maps caller topic slugs to provider-internal numeric tag ids.
pub struct TagResolver {
    api: Arc<dyn MarketApi>,
    /// Catalog tier; one entry holding the variant index built from the
    /// full catalog, so a tier hit skips both the fetch and the rebuild.
    catalog: TtlLruCache<&'static str, Arc<HashMap<String, u64>>>,
    /// Slugs already resolved this process; repeats never re-hit the network.
    resolved: DashMap<String, u64>,
    catalog_page_size: usize,
}

impl TagResolver {
    pub fn new(api: Arc<dyn MarketApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            catalog: TtlLruCache::new(
                config.tiers.catalog.capacity,
                config.tiers.catalog.ttl(),
            ),
            resolved: DashMap::new(),
            catalog_page_size: config.catalog_page_size,
        }
    }

    /// Resolve a caller slug to the provider's numeric tag id.
    ///
    /// `Ok(None)` is a clean miss: no catalog variant matched and the direct
    /// lookup endpoint also missed. Transport failure during the fallback
    /// propagates.
    pub async fn resolve(&self, slug: &str) -> FetchResult<Option<u64>> {
        if let Some(id) = self.resolved.get(slug) {
            return Ok(Some(*id));
        }

        match self.catalog_index().await {
            Ok(index) => {
                for variant in slug_variants(slug) {
                    if let Some(&id) = index.get(&variant) {
                        debug!(slug, id, matched = %variant, "resolved via catalog index");
                        self.resolved.insert(slug.to_string(), id);
                        return Ok(Some(id));
                    }
                }
            }
            Err(err) => {
                warn!(slug, error = %err, "catalog refresh failed, trying direct lookup");
            }
        }

        self.resolve_direct(slug).await
    }

    /// Normalized-variant index over the catalog: every variant of every
    /// entry's slug and label maps to the entry id. Earlier catalog entries
    /// win on collisions. Built once per catalog refresh and cached; a tier
    /// hit returns the prebuilt index.
    async fn catalog_index(&self) -> FetchResult<Arc<HashMap<String, u64>>> {
        if let Some(index) = self.catalog.get(&CATALOG_KEY) {
            return Ok(index);
        }

        let entries = self.api.fetch_tags(self.catalog_page_size).await?;
        debug!(count = entries.len(), "refreshed tag catalog");

        let mut index = HashMap::new();
        for entry in &entries {
            for variant in slug_variants(&entry.slug) {
                index.entry(variant).or_insert(entry.id);
            }
            for variant in slug_variants(&entry.label) {
                index.entry(variant).or_insert(entry.id);
            }
        }
        let index = Arc::new(index);
        self.catalog.set(CATALOG_KEY, index.clone());
        Ok(index)
    }

    /// Fallback: the direct lookup endpoint, trying the original slug then
    /// its hyphen→underscore variant.
    async fn resolve_direct(&self, slug: &str) -> FetchResult<Option<u64>> {
        let underscored = slug.to_lowercase().replace('-', "_");
        let mut candidates = vec![slug.to_string()];
        if underscored != slug {
            candidates.push(underscored);
        }

        for candidate in candidates {
            match self.api.fetch_tag_by_slug(&candidate).await {
                Ok(entry) => {
                    debug!(slug, id = entry.id, "resolved via direct lookup");
                    self.resolved.insert(slug.to_string(), entry.id);
                    return Ok(Some(entry.id));
                }
                Err(FetchError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}

/// Normalized variants of a slug or label, in fixed preference order:
/// exact, lower-cased, hyphen→underscore, underscore→hyphen,
/// separators→space. Duplicates are dropped, order preserved.
pub fn slug_variants(slug: &str) -> Vec<String> {
    let lower = slug.to_lowercase();
    let mut variants = vec![
        slug.to_string(),
        lower.clone(),
        lower.replace('-', "_"),
        lower.replace('_', "-"),
        lower.replace(['-', '_'], " "),
    ];
    let mut seen = HashSet::new();
    variants.retain(|v| seen.insert(v.clone()));
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockApi;
    use polylens_core::{ClientConfig, TopicCatalogEntry};
    use std::sync::atomic::Ordering;

    fn catalog() -> Vec<TopicCatalogEntry> {
        vec![
            TopicCatalogEntry {
                id: 10,
                slug: "fed_rates".to_string(),
                label: "Fed Rates".to_string(),
            },
            TopicCatalogEntry {
                id: 20,
                slug: "bitcoin".to_string(),
                label: "Bitcoin".to_string(),
            },
        ]
    }

    fn resolver(api: MockApi) -> TagResolver {
        TagResolver::new(Arc::new(api), &ClientConfig::default())
    }

    #[test]
    fn test_variant_order_and_dedup() {
        let variants = slug_variants("Pre-Market");
        assert_eq!(
            variants,
            vec!["Pre-Market", "pre-market", "pre_market", "pre market"]
        );
    }

    #[tokio::test]
    async fn test_hyphen_resolves_against_underscore_slug() {
        let r = resolver(MockApi::new().with_tags(catalog()));
        assert_eq!(r.resolve("fed-rates").await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn test_resolves_against_label_only() {
        let tags = vec![TopicCatalogEntry {
            id: 30,
            slug: "us-fed".to_string(),
            label: "Fed Rates".to_string(),
        }];
        let r = resolver(MockApi::new().with_tags(tags));
        assert_eq!(r.resolve("fed-rates").await.unwrap(), Some(30));
    }

    #[tokio::test]
    async fn test_pre_market_scenario() {
        let tags = vec![TopicCatalogEntry {
            id: 7,
            slug: "pre_market".to_string(),
            label: "Pre Market".to_string(),
        }];
        let r = resolver(MockApi::new().with_tags(tags));
        assert_eq!(r.resolve("pre-market").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_repeat_resolution_skips_network() {
        let api = Arc::new(MockApi::new().with_tags(catalog()));
        let r = TagResolver::new(api.clone(), &ClientConfig::default());
        assert_eq!(r.resolve("bitcoin").await.unwrap(), Some(20));
        let after_first = api.calls.load(Ordering::SeqCst);
        assert_eq!(r.resolve("bitcoin").await.unwrap(), Some(20));
        assert_eq!(api.calls.load(Ordering::SeqCst), after_first);
    }

    #[tokio::test]
    async fn test_catalog_fetched_once_across_slugs() {
        let api = Arc::new(MockApi::new().with_tags(catalog()));
        let r = TagResolver::new(api.clone(), &ClientConfig::default());
        assert_eq!(r.resolve("fed-rates").await.unwrap(), Some(10));
        assert_eq!(r.resolve("bitcoin").await.unwrap(), Some(20));
        // One catalog fetch serves every later slug via the cached index.
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_catalog_miss_falls_back_to_direct_lookup() {
        let api = MockApi::new().with_tags(catalog()).with_direct_tag(
            "niche_topic",
            TopicCatalogEntry {
                id: 99,
                slug: "niche_topic".to_string(),
                label: "Niche Topic".to_string(),
            },
        );
        let r = resolver(api);
        // Direct lookup misses on "niche-topic", hits the underscored variant.
        assert_eq!(r.resolve("niche-topic").await.unwrap(), Some(99));
    }

    #[tokio::test]
    async fn test_full_miss_resolves_to_none() {
        let r = resolver(MockApi::new().with_tags(catalog()));
        assert_eq!(r.resolve("unknown-topic").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_in_fallback_propagates() {
        let api = MockApi::new().with_tags(catalog()).with_direct_failure();
        let r = resolver(api);
        let result = r.resolve("unknown-topic").await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
