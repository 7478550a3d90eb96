//! Request governor module
//!
//! Throttles outgoing calls and classifies failures.
//!
//! # Features
//!
//! - **Token Bucket**: Continuous refill, one token per request
//! - **Interceptors**: Ordered request/response hooks run by the client
//! - **Retry Policy**: Retryable-vs-terminal classification and backoff
//! - **Events**: Injectable sink for quota and retry observations

mod bucket;
mod interceptors;
mod retry;
mod types;

pub use bucket::TokenBucket;
pub use interceptors::{GovernorInterceptor, Interceptor, REMAINING_HEADER};
pub use retry::RetryPolicy;
pub use types::{EventSink, GovernorConfig, GovernorEvent, TracingSink};
