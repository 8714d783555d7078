//! Pagination types
//!
//! Defines the `result_info` descriptor and the page containers handed to
//! callers of the listing helpers.

use serde::{Deserialize, Serialize};

/// Pagination descriptor returned alongside a list result
///
/// Produced by the remote service; read-only to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultInfo {
    /// Current page number (1-based)
    #[serde(default)]
    pub page: u32,
    /// Items requested per page
    #[serde(default)]
    pub per_page: u32,
    /// Items actually returned in this page
    #[serde(default)]
    pub count: u32,
    /// Total items across all pages
    #[serde(default, rename = "total_count")]
    pub total: u32,
    /// Total number of pages
    #[serde(default)]
    pub total_pages: u32,
}

impl ResultInfo {
    /// Check whether this descriptor claims to be the last page
    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// Page selection sent as query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOptions {
    /// Page number to request (1-based)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl PaginationOptions {
    /// Create options for a specific page
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Options for the page following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self
        }
    }

    /// Render as query parameters
    pub fn to_query(self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// A single page of results
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items in this page
    pub items: Vec<T>,
    /// Pagination descriptor reported by the service
    pub result_info: ResultInfo,
    /// Whether `result_info` matched the request and the returned items
    pub consistent: bool,
}

impl<T> Page<T> {
    /// Check whether more pages follow this one
    pub fn has_next(&self) -> bool {
        !self.result_info.is_last_page()
    }
}

/// Items gathered by walking every page of a listing
#[derive(Debug, Clone)]
pub struct Listing<T> {
    /// All items collected
    pub items: Vec<T>,
    /// Number of pages fetched
    pub pages_fetched: u32,
    /// False if any fetched page failed the consistency check
    pub consistent: bool,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pages_fetched: 0,
            consistent: true,
        }
    }
}
