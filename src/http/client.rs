//! HTTP client with governed retries
//!
//! Provides an HTTP client that handles:
//! - Interceptor pipeline (token bucket admission, quota reporting, 429 delay)
//! - Automatic resends of retryable failures with backoff
//! - Response status classification
//! - JSON response parsing

use super::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::governor::{
    EventSink, GovernorEvent, GovernorInterceptor, Interceptor, RetryPolicy, TokenBucket,
    TracingSink,
};
use crate::types::{JsonValue, Method, StringMap};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: StringMap,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// Builder for [`HttpClient`]
pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    sink: Arc<dyn EventSink>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl HttpClientBuilder {
    /// Use a custom transport instead of `reqwest`
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Receive governor events instead of logging them
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Append an interceptor; runs after the governor
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Validate the config and build the client
    pub fn build(self) -> Result<HttpClient> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };

        let governor = &self.config.governor;
        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::new();
        let bucket = if self.config.rate_limit {
            let bucket = Arc::new(governor.bucket());
            interceptors.push(Arc::new(GovernorInterceptor::new(
                Arc::clone(&bucket),
                governor.request_delay,
                governor.base_retry_delay,
                Arc::clone(&self.sink),
            )));
            Some(bucket)
        } else {
            None
        };
        interceptors.extend(self.interceptors);

        Ok(HttpClient {
            retry: governor.retry_policy(),
            transport,
            config: self.config,
            interceptors,
            bucket,
            sink: self.sink,
        })
    }
}

/// HTTP client with rate limiting and retries
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
    retry: RetryPolicy,
    bucket: Option<Arc<TokenBucket>>,
    sink: Arc<dyn EventSink>,
}

impl HttpClient {
    /// Create a client builder
    pub fn builder(config: ClientConfig) -> HttpClientBuilder {
        HttpClientBuilder {
            config,
            transport: None,
            sink: Arc::new(TracingSink),
            interceptors: Vec::new(),
        }
    }

    /// Create a `reqwest`-backed client
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::builder(config).transport(transport).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The token bucket, when rate limiting is enabled
    pub fn bucket(&self) -> Option<&Arc<TokenBucket>> {
        self.bucket.as_ref()
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.bucket.is_some()
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<TransportResponse> {
        self.request(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Make a GET request with config
    pub async fn get_with_config(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<TransportResponse> {
        self.request(Method::GET, path, config).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: JsonValue) -> Result<TransportResponse> {
        self.request(Method::POST, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a generic request, resending retryable failures
    ///
    /// This loop is the only place a request is re-issued. A 429 has
    /// already been delayed by the governor's error hook, so no extra
    /// backoff is added for it when rate limiting is enabled.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<TransportResponse> {
        let url = self.build_url(path)?;
        let max_retries = config.max_retries.unwrap_or(self.retry.max_retries());
        let mut attempt = 0;

        loop {
            let mut request = TransportRequest {
                method,
                url: url.clone(),
                query: config.query.clone(),
                headers: config.headers.clone(),
                body: config.body.clone(),
                timeout: config.timeout,
            };

            let err = match self.execute(&mut request).await {
                Ok(response) => {
                    debug!("Request succeeded: {} {}", method, url);
                    return Ok(response);
                }
                Err(err) => err,
            };

            if attempt >= max_retries || !self.retry.is_retryable(&err) {
                return Err(err);
            }

            let delay = match &err {
                Error::RateLimited { .. } if self.bucket.is_some() => Duration::ZERO,
                Error::RateLimited {
                    retry_after_seconds: Some(secs),
                } => Duration::from_secs(*secs),
                _ => self.retry.delay_for(attempt),
            };

            attempt += 1;
            self.sink.emit(&GovernorEvent::RetryScheduled {
                url: url.clone(),
                attempt,
                max_retries,
                delay,
                reason: err.to_string(),
            });
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Run one attempt through the interceptor pipeline
    async fn execute(&self, request: &mut TransportRequest) -> Result<TransportResponse> {
        for interceptor in &self.interceptors {
            interceptor.on_request(request).await?;
        }

        let result = match self.transport.send(request.clone()).await {
            Ok(response) => check_status(response),
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                for interceptor in &self.interceptors {
                    interceptor.on_response(request, &response).await?;
                }
                Ok(response)
            }
            Err(err) => {
                for interceptor in &self.interceptors {
                    interceptor.on_error(request, &err).await;
                }
                Err(err)
            }
        }
    }

    /// Make a request and parse JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, path, config).await?;
        response.json()
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Make a GET request with config and parse JSON response
    pub async fn get_json_with_config<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        self.request_json(Method::GET, path, config).await
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<String> {
        let full = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            match &self.config.base_url {
                Some(base) => {
                    let base = base.trim_end_matches('/');
                    let path = path.trim_start_matches('/');
                    format!("{base}/{path}")
                }
                None => return Err(Error::missing_field("base_url")),
            }
        };

        url::Url::parse(&full)?;
        Ok(full)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .field("interceptors", &self.interceptors.len())
            .field("has_rate_limiter", &self.bucket.is_some())
            .finish_non_exhaustive()
    }
}

/// Turn non-2xx responses into errors
fn check_status(response: TransportResponse) -> Result<TransportResponse> {
    if response.is_success() {
        return Ok(response);
    }

    if response.status == 429 {
        return Err(Error::RateLimited {
            retry_after_seconds: extract_retry_after(&response),
        });
    }

    Err(Error::HttpStatus {
        status: response.status,
        body: response.text(),
    })
}

/// Extract retry-after header value in seconds
fn extract_retry_after(response: &TransportResponse) -> Option<u64> {
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse().ok())
}
