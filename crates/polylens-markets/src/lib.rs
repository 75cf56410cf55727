//! Market read path: tag resolution, cross-topic aggregation and item/quote
//! lookup.
//!
//! [`MarketDataService`] is the owning facade: it holds every cache tier as
//! an explicit field, constructed from [`polylens_core::ClientConfig`], and
//! exposes the query surface consumers call. No global state.

pub mod aggregate;
pub mod detail;
pub mod resolver;
pub mod service;

pub use aggregate::CrossTopicAggregator;
pub use detail::DetailResolver;
pub use resolver::TagResolver;
pub use service::MarketDataService;

#[cfg(test)]
pub(crate) mod testutil;
