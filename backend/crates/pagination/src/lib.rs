//! Page request and page envelope primitives for listing endpoints.
//!
//! A [`PageRequest`] is the validated `page`/`limit` pair a caller asks for.
//! A [`Page`] is what comes back: the rows for that window together with the
//! filtered total and the derived page count.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(2, 10).expect("valid window");
//! assert_eq!(request.offset(), 10);
//!
//! let page = Page::new(vec!["row"], request, 11);
//! assert_eq!(page.total_pages(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// Page number used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size served; larger requests are clamped to it.
pub const MAX_LIMIT: u32 = 100;

/// Rejection reasons for a requested page window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The page number was below one.
    #[error("page must be at least 1, got {page}")]
    PageOutOfRange {
        /// Requested page number.
        page: i64,
    },
    /// The page size was zero or negative.
    #[error("limit must be at least 1, got {limit}")]
    LimitOutOfRange {
        /// Requested page size.
        limit: i64,
    },
}

/// Validated page window.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate a raw page window, clamping oversized limits to [`MAX_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page < 1` or `limit < 1`.
    pub fn new(page: i64, limit: i64) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError::PageOutOfRange { page });
        }
        if limit < 1 {
            return Err(PageRequestError::LimitOutOfRange { limit });
        }
        let clamped_page = u32::try_from(page).unwrap_or(u32::MAX);
        let clamped_limit = u32::try_from(limit).unwrap_or(MAX_LIMIT).min(MAX_LIMIT);
        Ok(Self {
            page: clamped_page,
            limit: clamped_limit,
        })
    }

    /// Build a request from optional query values, applying defaults.
    ///
    /// # Errors
    ///
    /// See [`PageRequest::new`].
    pub fn from_optional(page: Option<i64>, limit: Option<i64>) -> Result<Self, PageRequestError> {
        Self::new(
            page.unwrap_or_else(|| i64::from(DEFAULT_PAGE)),
            limit.unwrap_or_else(|| i64::from(DEFAULT_LIMIT)),
        )
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(u64::from(self.limit))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Number of pages needed to show `total` rows at `limit` rows per page.
///
/// Zero rows yields zero pages.
#[must_use]
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// One page of rows plus the paging metadata clients render controls from.
///
/// Serialises as `{"data", "page", "limit", "total", "totalPages"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    data: Vec<T>,
    page: u32,
    limit: u32,
    total: u64,
    total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap the rows of one window together with the filtered total.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total_pages(total, request.limit()),
        }
    }

    /// Rows in this page.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consume the page, returning its rows.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows matching the filter across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Pages needed to show every matching row.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Convert every row while keeping the paging metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
