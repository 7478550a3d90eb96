//! Pagination module
//!
//! Cursor-based pagination over `limit` / `after_id` / `before_id` list
//! endpoints.
//!
//! # Overview
//!
//! Three access patterns share one page-fetch path:
//! - [`fetch_page`] - a single page
//! - [`fetch_all_pages`] - every item, bounded by `max_pages` / `max_items`
//! - [`iterate_pages`] / [`iterate_items`] - lazy streams, one page in memory
//!
//! The `after_id` cursor is opaque and passed through as the server sent it.

mod paginator;
mod types;

pub use paginator::{
    decode_page, fetch_all_pages, fetch_page, iterate_items, iterate_pages, Paginator,
};
pub use types::{CursorState, ListOptions, Page, PageOptions, DEFAULT_MAX_PAGES};
