//! HTTP fetch layer for polylens.
//!
//! Turns raw upstream endpoints into a typed API: a timed single-attempt
//! transport, a retry coordinator with exponential backoff, payload
//! normalization at the boundary, and the `MarketApi` trait the market
//! layers call through. Raw `serde_json::Value` never leaves this crate.

pub mod api;
pub mod normalize;
pub mod retry;
pub mod transport;

pub use api::{GammaClobClient, MarketApi};
pub use retry::{with_retry, RetryPolicy};
pub use transport::{BoxFuture, HttpTransport, ReqwestTransport};
