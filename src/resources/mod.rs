//! Listing resources
//!
//! Each resource exposes the same call shapes over its list endpoint:
//! one page, every item, or a lazy stream of pages or items.
//!
//! ```rust,ignore
//! let client = HttpClient::new(ClientConfig::from_env()?)?;
//! let first = client.invoices().list(&PageOptions::new().limit(20)).await?;
//! let recent = client.customers().list_all(ListOptions::new().max_items(50)).await?;
//! ```

mod types;

#[cfg(test)]
mod tests;

pub use types::{Customer, EwalletCharge, Invoice, Payout, Refund};

use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{self, ListOptions, Page, PageOptions, Paginator};
use futures::Stream;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Typed access to one listing endpoint
pub struct Listing<'a, T> {
    client: &'a HttpClient,
    path: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned + 'a> Listing<'a, T> {
    pub fn new(client: &'a HttpClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _item: PhantomData,
        }
    }

    /// Endpoint path
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Fetch a single resource by id
    pub async fn retrieve(&self, id: &str) -> Result<T> {
        let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        self.client
            .get_json(&format!("{}/{}", self.path, id))
            .await
    }

    /// One page
    pub async fn list(&self, options: &PageOptions) -> Result<Page<T>> {
        pagination::fetch_page(self.client, self.path, options).await
    }

    /// Every item up to the bounds in `options`
    pub async fn list_all(&self, options: ListOptions) -> Result<Vec<T>> {
        pagination::fetch_all_pages(self.client, self.path, options).await
    }

    /// Lazy stream of pages
    pub fn pages(&self, options: ListOptions) -> impl Stream<Item = Result<Page<T>>> + 'a {
        pagination::iterate_pages(self.client, self.path, options)
    }

    /// Lazy stream of items
    pub fn items(&self, options: ListOptions) -> impl Stream<Item = Result<T>> + 'a {
        pagination::iterate_items(self.client, self.path, options)
    }

    /// Low-level paginator handle, reusable via `reset`
    pub fn paginator(&self, options: ListOptions) -> Paginator<'a, T> {
        Paginator::new(self.client, self.path, options)
    }
}

impl HttpClient {
    pub fn customers(&self) -> Listing<'_, Customer> {
        Listing::new(self, "/customers")
    }

    pub fn invoices(&self) -> Listing<'_, Invoice> {
        Listing::new(self, "/invoices")
    }

    pub fn ewallet_charges(&self) -> Listing<'_, EwalletCharge> {
        Listing::new(self, "/ewallets/charges")
    }

    pub fn payouts(&self) -> Listing<'_, Payout> {
        Listing::new(self, "/payouts")
    }

    pub fn refunds(&self) -> Listing<'_, Refund> {
        Listing::new(self, "/refunds")
    }
}
