//! HTTP client module
//!
//! Provides an HTTP client whose every call passes through the request
//! governor.
//!
//! # Features
//!
//! - **Pluggable Transport**: `reqwest` by default, any [`Transport`] in tests
//! - **Interceptors**: Governor hooks run around each attempt
//! - **Automatic Retries**: Retryable failures are resent with backoff
//! - **Authentication**: Secret key, basic or bearer credentials

mod client;
mod transport;

pub use client::{HttpClient, HttpClientBuilder, RequestConfig};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
