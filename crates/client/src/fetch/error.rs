//! Engine API error types.

/// Errors from a single engine API exchange.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Missing EDUFORM_API_TOKEN.
    #[error("missing API token: {0}")]
    MissingToken(String),

    /// Request rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (401/403).
    #[error("authentication failed: HTTP {status}")]
    Unauthorized { status: u16 },

    /// Any other non-success outside the 5xx range.
    #[error("request rejected: HTTP {status}")]
    Client { status: u16 },

    /// 5xx on the final attempt.
    #[error("server error: HTTP {status} after {attempts} attempt(s)")]
    Server { status: u16, attempts: u32 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Timeout | Self::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(err.to_string()) }
    }
}
