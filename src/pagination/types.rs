//! Pagination types
//!
//! Page shape, cursor options and per-iteration cursor state.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};

/// Default safety bound on the number of pages fetched per listing
pub const DEFAULT_MAX_PAGES: usize = 100;

/// One fetched page of a list endpoint
///
/// Wire shape: `{data, has_more, after_id?, before_id?, total_count?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order
    pub data: Vec<T>,
    /// Whether another page follows
    pub has_more: bool,
    /// Forward cursor for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
    /// Backward cursor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
    /// Total number of matching items, when the server reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Cursor to request the next page with, if any
    pub fn next_cursor(&self) -> Option<&str> {
        self.after_id.as_deref().filter(|c| !c.is_empty())
    }

    /// Reject a page that claims more data without a forward cursor
    pub fn validate(&self) -> Result<()> {
        if self.has_more && self.next_cursor().is_none() {
            return Err(Error::protocol(
                "page reports has_more=true but carries no after_id cursor",
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Cursor options for a single page request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Page size
    pub limit: Option<u32>,
    /// Start after this item
    pub after_id: Option<String>,
    /// End before this item
    pub before_id: Option<String>,
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the forward cursor
    #[must_use]
    pub fn after_id(mut self, after_id: impl Into<String>) -> Self {
        self.after_id = Some(after_id.into());
        self
    }

    /// Set the backward cursor
    #[must_use]
    pub fn before_id(mut self, before_id: impl Into<String>) -> Self {
        self.before_id = Some(before_id.into());
        self
    }

    /// Query parameters; empty options are omitted
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(after_id) = self.after_id.clone().none_if_empty() {
            params.push(("after_id".to_string(), after_id));
        }
        if let Some(before_id) = self.before_id.clone().none_if_empty() {
            params.push(("before_id".to_string(), before_id));
        }
        params
    }
}

/// Options for multi-page listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Options for the first page; `limit` applies to every page
    #[serde(flatten)]
    pub page: PageOptions,
    /// Stop after this many pages
    pub max_pages: usize,
    /// Stop after this many items (unbounded when `None`)
    pub max_items: Option<usize>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: PageOptions::default(),
            max_pages: DEFAULT_MAX_PAGES,
            max_items: None,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.page.limit = Some(limit);
        self
    }

    /// Start after this cursor
    #[must_use]
    pub fn after_id(mut self, after_id: impl Into<String>) -> Self {
        self.page.after_id = Some(after_id.into());
        self
    }

    /// Set the page bound
    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the item bound
    #[must_use]
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

impl From<PageOptions> for ListOptions {
    fn from(page: PageOptions) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }
}

/// Position of one iteration over a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Cursor for the next request (`None` at the start)
    pub after_id: Option<String>,
    /// No further pages will be requested
    pub exhausted: bool,
    /// Pages fetched so far
    pub pages_fetched: usize,
    /// Items handed out so far
    pub items_yielded: usize,
}

impl CursorState {
    /// Create a state starting at `after_id`
    pub fn new(after_id: Option<String>) -> Self {
        Self {
            after_id: after_id.none_if_empty(),
            ..Self::default()
        }
    }

    /// Mark iteration as complete
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }
}
