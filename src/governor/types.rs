//! Governor configuration and observability types

use super::bucket::TokenBucket;
use super::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::types::{duration_ms, BackoffType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the request governor
///
/// Durations are expressed in milliseconds when loaded from YAML or JSON
/// (`window_ms`, `request_delay_ms`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Maximum requests admitted per window (bucket capacity)
    pub max_requests: u32,
    /// Time for an empty bucket to refill completely
    #[serde(rename = "window_ms", with = "duration_ms")]
    pub window: Duration,
    /// Fixed spacing added after every admission
    #[serde(rename = "request_delay_ms", with = "duration_ms")]
    pub request_delay: Duration,
    /// Maximum number of resends after the first attempt
    pub max_retries: u32,
    /// Base delay for retry backoff and for 429s without a hint
    #[serde(rename = "base_retry_delay_ms", with = "duration_ms")]
    pub base_retry_delay: Duration,
    /// Upper bound for retry backoff
    #[serde(rename = "max_retry_delay_ms", with = "duration_ms")]
    pub max_retry_delay: Duration,
    /// Backoff curve
    pub backoff_type: BackoffType,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            request_delay: Duration::ZERO,
            max_retries: 3,
            base_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            backoff_type: BackoffType::Exponential,
        }
    }
}

impl GovernorConfig {
    /// Create a config admitting `max_requests` per `window`
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            ..Self::default()
        }
    }

    /// Set the fixed per-request delay
    #[must_use]
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Set retry count and backoff bounds
    #[must_use]
    pub fn retries(mut self, max_retries: u32, base: Duration, max: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_retry_delay = base;
        self.max_retry_delay = max;
        self
    }

    /// Reject configurations the bucket or backoff cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(Error::config("max_requests must be at least 1"));
        }
        if self.window.is_zero() {
            return Err(Error::config("window must be non-zero"));
        }
        if self.base_retry_delay > self.max_retry_delay {
            return Err(Error::config(format!(
                "base_retry_delay ({:?}) exceeds max_retry_delay ({:?})",
                self.base_retry_delay, self.max_retry_delay
            )));
        }
        Ok(())
    }

    /// Build the token bucket described by this config
    pub fn bucket(&self) -> TokenBucket {
        TokenBucket::new(self.max_requests, self.window)
    }

    /// Build the retry policy described by this config
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.base_retry_delay, self.max_retry_delay)
            .with_backoff(self.backoff_type)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Something the governor observed or did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernorEvent {
    /// A request waited for the bucket to refill
    Throttled { waited: Duration },
    /// The server reported zero remaining quota on a successful response
    QuotaExhausted { url: String },
    /// The server rejected a request with 429; the governor is delaying
    RateLimited {
        url: String,
        delay: Duration,
        from_header: bool,
    },
    /// The retry layer is about to resend a request
    RetryScheduled {
        url: String,
        attempt: u32,
        max_retries: u32,
        delay: Duration,
        reason: String,
    },
}

/// Receiver for governor events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &GovernorEvent);
}

impl<F> EventSink for F
where
    F: Fn(&GovernorEvent) + Send + Sync,
{
    fn emit(&self, event: &GovernorEvent) {
        self(event);
    }
}

/// Default sink: forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &GovernorEvent) {
        match event {
            GovernorEvent::Throttled { waited } => {
                debug!("Throttled by token bucket for {:?}", waited);
            }
            GovernorEvent::QuotaExhausted { url } => {
                warn!("Rate limit quota exhausted after request to {}", url);
            }
            GovernorEvent::RateLimited {
                url,
                delay,
                from_header,
            } => {
                let source = if *from_header { "retry-after" } else { "default" };
                warn!("Rate limited (429) on {}, waiting {:?} ({})", url, delay, source);
            }
            GovernorEvent::RetryScheduled {
                url,
                attempt,
                max_retries,
                delay,
                reason,
            } => {
                warn!(
                    "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                    url,
                    reason,
                    attempt,
                    max_retries + 1,
                    delay
                );
            }
        }
    }
}
