//! Client configuration.
//!
//! One config object consumed at construction: base URLs per upstream API,
//! per-tier TTLs and capacities, retry/backoff parameters and the request
//! timeout. Every field carries a serde default so partial configs load.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the market data client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the catalog/listing (Gamma-style) API.
    #[serde(default = "default_gamma_base_url")]
    pub gamma_base_url: String,
    /// Base URL of the order-book (CLOB-style) API.
    #[serde(default = "default_clob_base_url")]
    pub clob_base_url: String,
    /// Hard timeout for a single outbound request (ms). Default: 10,000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Page size for the bulk active-market listing. Default: 500.
    #[serde(default = "default_bulk_page_size")]
    pub bulk_page_size: usize,
    /// Number of catalog entries fetched per refresh. Default: 100.
    #[serde(default = "default_catalog_page_size")]
    pub catalog_page_size: usize,
    /// Sample fidelity (minutes) for price history. Default: 60.
    #[serde(default = "default_history_fidelity")]
    pub history_fidelity: u32,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub tiers: CacheTierConfig,
}

/// Retry/backoff parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff base delay (ms); doubles per retry. Default: 250.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff ceiling (ms). Default: 5,000.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// TTL and capacity for one cache tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierConfig {
    pub ttl_secs: u64,
    pub capacity: usize,
}

impl TierConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Per-resource cache tiers. Each TTL is independent: a stale quote may
/// coexist with a fresh item for the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTierConfig {
    /// Topic catalog. Default: 300s TTL, 4 entries.
    #[serde(default = "default_catalog_tier")]
    pub catalog: TierConfig,
    /// Item detail. Default: 120s TTL, 512 entries.
    #[serde(default = "default_detail_tier")]
    pub detail: TierConfig,
    /// Derived quote pairs. Shorter TTL than detail: quotes move faster
    /// than metadata. Default: 15s TTL, 512 entries.
    #[serde(default = "default_quote_tier")]
    pub quote: TierConfig,
    /// Historical price series. Default: 300s TTL, 128 entries.
    #[serde(default = "default_history_tier")]
    pub history: TierConfig,
    /// Per-tag aggregate listing pages. Default: 60s TTL, 64 entries.
    #[serde(default = "default_aggregate_tier")]
    pub aggregate: TierConfig,
}

fn default_gamma_base_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_clob_base_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_bulk_page_size() -> usize {
    500
}

fn default_catalog_page_size() -> usize {
    100
}

fn default_history_fidelity() -> u32 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    5_000
}

fn default_catalog_tier() -> TierConfig {
    TierConfig {
        ttl_secs: 300,
        capacity: 4,
    }
}

fn default_detail_tier() -> TierConfig {
    TierConfig {
        ttl_secs: 120,
        capacity: 512,
    }
}

fn default_quote_tier() -> TierConfig {
    TierConfig {
        ttl_secs: 15,
        capacity: 512,
    }
}

fn default_history_tier() -> TierConfig {
    TierConfig {
        ttl_secs: 300,
        capacity: 128,
    }
}

fn default_aggregate_tier() -> TierConfig {
    TierConfig {
        ttl_secs: 60,
        capacity: 64,
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gamma_base_url: default_gamma_base_url(),
            clob_base_url: default_clob_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            bulk_page_size: default_bulk_page_size(),
            catalog_page_size: default_catalog_page_size(),
            history_fidelity: default_history_fidelity(),
            retry: RetryConfig::default(),
            tiers: CacheTierConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for CacheTierConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_tier(),
            detail: default_detail_tier(),
            quote: default_quote_tier(),
            history: default_history_tier(),
            aggregate: default_aggregate_tier(),
        }
    }
}

impl ClientConfig {
    /// Check invariants the rest of the system relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gamma_base_url.is_empty() || self.clob_base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "base URLs must not be empty".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.bulk_page_size == 0 || self.catalog_page_size == 0 {
            return Err(ConfigError::Invalid(
                "page sizes must be at least 1".to_string(),
            ));
        }
        for (name, tier) in [
            ("catalog", &self.tiers.catalog),
            ("detail", &self.tiers.detail),
            ("quote", &self.tiers.quote),
            ("history", &self.tiers.history),
            ("aggregate", &self.tiers.aggregate),
        ] {
            if tier.capacity == 0 {
                return Err(ConfigError::Invalid(format!(
                    "cache tier {name} capacity must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.tiers.quote.ttl_secs, 15);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"request_timeout_ms": 2500}"#).unwrap();
        assert_eq!(config.request_timeout_ms, 2500);
        assert_eq!(config.gamma_base_url, default_gamma_base_url());
        assert_eq!(config.tiers.detail.capacity, 512);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = ClientConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = ClientConfig::default();
        config.tiers.quote.capacity = 0;
        assert!(config.validate().is_err());
    }
}
