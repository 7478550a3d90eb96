// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Paygate
//!
//! Typed client for a payment-processing REST API.
//!
//! ## Features
//!
//! - **Request Governor**: Continuous token bucket, 429 backoff, quota warnings
//! - **Retries**: Network failures, 408, 429 and 5xx resent with capped backoff
//! - **Cursor Pagination**: One page, all pages, or lazy page/item streams
//! - **Listing Resources**: Customers, invoices, e-wallet charges, payouts, refunds
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use paygate::{ClientConfig, HttpClient, ListOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder()
//!         .base_url("https://api.example.com")
//!         .secret_key("sk_test_...")
//!         .build();
//!     let client = HttpClient::new(config)?;
//!
//!     // Every item, at most 500
//!     let invoices = client.invoices().list_all(ListOptions::new().max_items(500)).await?;
//!
//!     // Or one page in memory at a time
//!     let mut customers = Box::pin(client.customers().items(ListOptions::new().limit(50)));
//!     while let Some(customer) = customers.try_next().await? {
//!         println!("{}", customer.id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │            Resources (list / list_all / items)            │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┴──────────────────────────────┐
//! │        Pagination (Paginator, after_id cursor chain)       │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴───────────┬──────────────────┐
//! │  HttpClient  │       Interceptors      │    Transport     │
//! ├──────────────┼─────────────────────────┼──────────────────┤
//! │ Retry loop   │ Token bucket admission  │ reqwest          │
//! │ Backoff      │ Quota header warning    │ custom           │
//! │ Status check │ 429 retry-after delay   │                  │
//! └──────────────┴─────────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and retry classification
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration and credentials
pub mod config;

/// Token bucket, retry policy and interceptors
pub mod governor;

/// HTTP client and transport
pub mod http;

/// Cursor pagination
pub mod pagination;

/// Typed listing resources
pub mod resources;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result};
pub use governor::{EventSink, GovernorConfig, GovernorEvent, RetryPolicy, TokenBucket};
pub use http::{HttpClient, Transport, TransportRequest, TransportResponse};
pub use pagination::{ListOptions, Page, PageOptions, Paginator};
pub use resources::{Customer, EwalletCharge, Invoice, Listing, Payout, Refund};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
