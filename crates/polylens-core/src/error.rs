//! Fetch error taxonomy.
//!
//! Failures are typed values, not strings. Retry-vs-terminal classification
//! is a match on the tag so collaborators never scan error messages.

use thiserror::Error;

/// Outcome classification for one outbound fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request exceeded the hard per-attempt timeout.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-2xx status other than 404.
    #[error("upstream API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The resource is definitively absent upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// The payload did not parse into the expected record shape.
    #[error("invalid payload shape: {0}")]
    InvalidShape(String),
}

impl FetchError {
    /// Whether a retry can plausibly change the outcome.
    ///
    /// Timeouts, transport failures, 5xx and 429 are transient; everything
    /// else is terminal and must short-circuit the retry budget.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Network(_) => true,
            FetchError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            FetchError::NotFound(_) | FetchError::InvalidShape(_) => false,
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
