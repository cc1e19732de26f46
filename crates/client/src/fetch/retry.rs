//! Bounded retry around a [`Transport`].

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use eduform_core::AppConfig;

use super::{ApiRequest, ApiResponse, FetchError, Transport};

/// Attempt bounds and pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Values below 1 are read as 1.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
    /// Upper bound of a random extra pause added to `delay`.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, delay: Duration::from_secs(1), jitter: Duration::ZERO }
    }
}

impl RetryPolicy {
    pub fn from_app(config: &AppConfig) -> Self {
        Self { max_attempts: config.retry_max_attempts, delay: config.retry_delay(), ..Default::default() }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn pause(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let extra = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(extra)
    }
}

/// Sends requests through a [`Transport`], retrying transient failures.
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientFetcher").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `request` until it succeeds, fails permanently or runs out of attempts.
    ///
    /// On exhaustion the last observed failure is returned; a final 5xx is
    /// reported as [`FetchError::Server`] carrying the attempt count.
    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            let error = match self.transport.send(request).await {
                Ok(response) if response.status.is_success() => {
                    tracing::debug!(path = %request.path, attempt, elapsed_ms = response.elapsed_ms, "request succeeded");
                    return Ok(response);
                }
                Ok(response) if response.status.is_server_error() => {
                    FetchError::Server { status: response.status.as_u16(), attempts: attempt }
                }
                Ok(response) => return Err(classify_rejection(response.status.as_u16())),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if attempt < attempts {
                let pause = self.policy.pause();
                tracing::warn!(path = %request.path, attempt, error = %error, retry_in_ms = pause.as_millis() as u64, "request failed, retrying");
                tokio::time::sleep(pause).await;
            } else {
                tracing::warn!(path = %request.path, attempts, error = %error, "request failed, giving up");
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| FetchError::Network("no attempt was made".into())))
    }
}

fn classify_rejection(status: u16) -> FetchError {
    match status {
        401 | 403 => FetchError::Unauthorized { status },
        _ => FetchError::Client { status },
    }
}
