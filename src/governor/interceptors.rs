//! Request/response interceptors
//!
//! The client runs its interceptors in registration order around every
//! transport call. Interceptors observe and delay; they never resend.

use super::bucket::TokenBucket;
use super::types::{EventSink, GovernorEvent};
use crate::error::{Error, Result};
use crate::http::{TransportRequest, TransportResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the server's remaining request quota
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Hook invoked around each transport call
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Before the request is sent; may mutate or delay it
    async fn on_request(&self, _request: &mut TransportRequest) -> Result<()> {
        Ok(())
    }

    /// After a successful (2xx) response
    async fn on_response(
        &self,
        _request: &TransportRequest,
        _response: &TransportResponse,
    ) -> Result<()> {
        Ok(())
    }

    /// After a failed attempt; the error is re-raised by the caller
    async fn on_error(&self, _request: &TransportRequest, _error: &Error) {}
}

/// Token-bucket admission, fixed spacing, quota reporting and 429 backoff
pub struct GovernorInterceptor {
    bucket: Arc<TokenBucket>,
    request_delay: Duration,
    default_backoff: Duration,
    sink: Arc<dyn EventSink>,
}

impl GovernorInterceptor {
    pub fn new(
        bucket: Arc<TokenBucket>,
        request_delay: Duration,
        default_backoff: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            bucket,
            request_delay,
            default_backoff,
            sink,
        }
    }

    /// The bucket this interceptor draws from
    pub fn bucket(&self) -> &Arc<TokenBucket> {
        &self.bucket
    }
}

impl std::fmt::Debug for GovernorInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernorInterceptor")
            .field("bucket", &self.bucket)
            .field("request_delay", &self.request_delay)
            .field("default_backoff", &self.default_backoff)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Interceptor for GovernorInterceptor {
    async fn on_request(&self, _request: &mut TransportRequest) -> Result<()> {
        let waited = self.bucket.acquire().await;
        if !waited.is_zero() {
            self.sink.emit(&GovernorEvent::Throttled { waited });
        }

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        Ok(())
    }

    async fn on_response(
        &self,
        request: &TransportRequest,
        response: &TransportResponse,
    ) -> Result<()> {
        // Informational only; the bucket stays the source of truth
        let remaining = response
            .header(REMAINING_HEADER)
            .and_then(|v| v.trim().parse::<u64>().ok());
        if remaining == Some(0) {
            self.sink.emit(&GovernorEvent::QuotaExhausted {
                url: request.url.clone(),
            });
        }
        Ok(())
    }

    async fn on_error(&self, request: &TransportRequest, error: &Error) {
        let Error::RateLimited {
            retry_after_seconds,
        } = error
        else {
            return;
        };

        let delay = retry_after_seconds.map_or(self.default_backoff, Duration::from_secs);
        self.sink.emit(&GovernorEvent::RateLimited {
            url: request.url.clone(),
            delay,
            from_header: retry_after_seconds.is_some(),
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
