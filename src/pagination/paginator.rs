//! Cursor paginator
//!
//! One page, every page up to a bound, or a lazy stream of pages/items.
//! All three share [`Paginator::next_page`], so bounds and cursor handling
//! behave the same in every form.

use super::types::{CursorState, ListOptions, Page, PageOptions};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use futures::stream::{self, Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Fetch a single page
///
/// Only non-empty options are sent. A body that does not match the page
/// shape, or a page with `has_more` but no cursor, is a protocol error.
pub async fn fetch_page<T: DeserializeOwned>(
    client: &HttpClient,
    endpoint: &str,
    options: &PageOptions,
) -> Result<Page<T>> {
    let config = RequestConfig {
        query: options.to_query(),
        ..RequestConfig::default()
    };
    let response = client.get_with_config(endpoint, config).await?;
    decode_page(endpoint, &response.body)
}

/// Decode and validate a page body
pub fn decode_page<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<Page<T>> {
    let mut de = serde_json::Deserializer::from_slice(body);
    let page: Page<T> = serde_path_to_error::deserialize(&mut de).map_err(|e| {
        Error::protocol(format!(
            "malformed page from {endpoint} at `{}`: {}",
            e.path(),
            e.inner()
        ))
    })?;
    de.end()
        .map_err(|e| Error::protocol(format!("malformed page from {endpoint}: {e}")))?;

    page.validate()?;
    Ok(page)
}

/// Fetch pages until exhausted or a bound is hit, collecting every item
pub async fn fetch_all_pages<T: DeserializeOwned>(
    client: &HttpClient,
    endpoint: &str,
    options: ListOptions,
) -> Result<Vec<T>> {
    Paginator::new(client, endpoint, options).collect_all().await
}

/// Lazy stream of pages
pub fn iterate_pages<'a, T: DeserializeOwned + 'a>(
    client: &'a HttpClient,
    endpoint: &str,
    options: ListOptions,
) -> impl Stream<Item = Result<Page<T>>> + 'a {
    Paginator::new(client, endpoint, options).into_pages()
}

/// Lazy stream of items, flattening pages
pub fn iterate_items<'a, T: DeserializeOwned + 'a>(
    client: &'a HttpClient,
    endpoint: &str,
    options: ListOptions,
) -> impl Stream<Item = Result<T>> + 'a {
    Paginator::new(client, endpoint, options).into_items()
}

/// Iteration handle over one listing endpoint
///
/// Owns its cursor state; two paginators over the same endpoint never
/// interfere.
pub struct Paginator<'a, T> {
    client: &'a HttpClient,
    endpoint: String,
    options: ListOptions,
    state: CursorState,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned + 'a> Paginator<'a, T> {
    /// Create a paginator positioned at `options.page.after_id`
    pub fn new(client: &'a HttpClient, endpoint: impl Into<String>, options: ListOptions) -> Self {
        let state = CursorState::new(options.page.after_id.clone());
        Self {
            client,
            endpoint: endpoint.into(),
            options,
            state,
            _item: PhantomData,
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.exhausted
    }

    /// Rewind to the starting cursor, keeping the client and options
    pub fn reset(&mut self) {
        self.state = CursorState::new(self.options.page.after_id.clone());
    }

    /// Fetch the next page, or `None` once exhausted
    ///
    /// The last page is truncated to honor `max_items`. Any error
    /// exhausts the paginator.
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>> {
        if self.state.exhausted {
            return Ok(None);
        }
        if self.state.pages_fetched >= self.options.max_pages || self.remaining_items() == Some(0)
        {
            self.state.mark_exhausted();
            return Ok(None);
        }

        let options = PageOptions {
            limit: self.options.page.limit,
            after_id: self.state.after_id.clone(),
            // before_id only bounds the first request; later pages follow after_id
            before_id: if self.state.pages_fetched == 0 {
                self.options.page.before_id.clone()
            } else {
                None
            },
        };

        let mut page: Page<T> = match fetch_page(self.client, &self.endpoint, &options).await {
            Ok(page) => page,
            Err(e) => {
                self.state.mark_exhausted();
                return Err(e);
            }
        };
        self.state.pages_fetched += 1;

        if let Some(remaining) = self.remaining_items() {
            if page.data.len() >= remaining {
                page.data.truncate(remaining);
                self.state.mark_exhausted();
            }
        }
        self.state.items_yielded += page.data.len();

        match page.next_cursor() {
            Some(cursor) if page.has_more => self.state.after_id = Some(cursor.to_string()),
            _ => self.state.mark_exhausted(),
        }
        if self.state.pages_fetched >= self.options.max_pages {
            self.state.mark_exhausted();
        }

        debug!(
            "Page {} of {}: {} items (has_more: {})",
            self.state.pages_fetched,
            self.endpoint,
            page.data.len(),
            page.has_more
        );
        Ok(Some(page))
    }

    /// Drain the remaining pages into one vector
    pub async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page.data);
        }
        Ok(items)
    }

    /// Lazy, forward-only stream of the remaining pages
    pub fn into_pages(self) -> impl Stream<Item = Result<Page<T>>> + 'a {
        stream::try_unfold(self, |mut paginator| async move {
            let page = paginator.next_page().await?;
            Ok::<_, Error>(page.map(|page| (page, paginator)))
        })
    }

    /// Lazy, forward-only stream of the remaining items
    ///
    /// The next page is requested only after the current page's items
    /// have all been yielded.
    pub fn into_items(self) -> impl Stream<Item = Result<T>> + 'a {
        self.into_pages()
            .map_ok(|page| stream::iter(page.data.into_iter().map(Ok::<T, Error>)))
            .try_flatten()
    }

    fn remaining_items(&self) -> Option<usize> {
        self.options
            .max_items
            .map(|max| max.saturating_sub(self.state.items_yielded))
    }
}

impl<T> std::fmt::Debug for Paginator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
