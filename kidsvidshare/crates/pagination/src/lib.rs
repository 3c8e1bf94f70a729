//! Page request and page envelope primitives shared by listing ports.
//!
//! Listings are addressed by a 1-based page number and a page size. Adapters
//! that hold data in memory can use [`Page::from_window`] to cut a page out of
//! an already filtered and sorted collection; remote adapters build a
//! [`Page`] from the rows and total count their backend returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when callers do not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Errors raised when validating a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers start at 1.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The requested page size exceeds the configured ceiling.
    #[error("limit must be at most {max}, got {limit}")]
    LimitTooLarge {
        /// Requested page size.
        limit: u32,
        /// Configured ceiling.
        max: u32,
    },
}

/// Validated request for one page of a listing.
///
/// ## Invariants
/// - `page >= 1`
/// - `limit >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request, rejecting zero pages and zero or oversized limits.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page` or `limit` is out of range.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20, 100).unwrap();
    /// assert_eq!(request.offset(), 20);
    /// ```
    pub fn new(page: u32, limit: u32, max_limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if limit == 0 {
            return Err(PaginationError::ZeroLimit);
        }
        if limit > max_limit {
            return Err(PaginationError::LimitTooLarge {
                limit,
                max: max_limit,
            });
        }
        Ok(Self { page, limit })
    }

    /// First page with the given size, clamped to at least one item.
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Request for the page after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PageRequestDto {
    page: u32,
    limit: u32,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PaginationError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit, u32::MAX)
    }
}

/// One page of results plus the size of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total_count: u64,
    request: PageRequest,
}

impl<T> Page<T> {
    /// Wrap items already cut to the requested window.
    #[must_use]
    pub const fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            request,
        }
    }

    /// Empty page for `request`.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    /// Cut the page described by `request` out of a complete listing.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let request = PageRequest::new(2, 2, 10).unwrap();
    /// let page = Page::from_window(vec![1, 2, 3, 4, 5], request);
    /// assert_eq!(page.items(), &[3, 4]);
    /// assert!(page.has_more());
    /// ```
    #[must_use]
    pub fn from_window(all: Vec<T>, request: PageRequest) -> Self {
        let total_count = all.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, total_count, request)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The request that produced this page.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Whether items exist beyond this page.
    ///
    /// Judged from the request window, not the items left on the page, so a
    /// page thinned by [`Page::retain`] still ends the listing correctly.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.request
            .offset()
            .saturating_add(u64::from(self.request.limit()))
            < self.total_count
    }

    /// Transform every item while keeping the paging envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            request: self.request,
        }
    }

    /// Drop items that fail `keep`, preserving the envelope.
    ///
    /// `total_count` still describes the unfiltered listing, so callers can
    /// keep paging even when a page shrinks.
    #[must_use]
    pub fn retain(mut self, keep: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(keep);
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page requests and envelopes.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, PaginationError::ZeroPage)]
    #[case(1, 0, PaginationError::ZeroLimit)]
    #[case(1, 101, PaginationError::LimitTooLarge { limit: 101, max: 100 })]
    fn invalid_requests_are_rejected(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] expected: PaginationError,
    ) {
        let err = PageRequest::new(page, limit, 100).expect_err("request must be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(1, 20, 0)]
    #[case(3, 20, 40)]
    #[case(2, 7, 7)]
    fn offset_follows_page_and_limit(#[case] page: u32, #[case] limit: u32, #[case] offset: u64) {
        let request = PageRequest::new(page, limit, 100).expect("valid request");
        assert_eq!(request.offset(), offset);
    }

    #[rstest]
    fn window_past_the_end_is_empty() {
        let request = PageRequest::new(4, 2, 10).expect("valid request");
        let page = Page::from_window(vec![1, 2, 3], request);
        assert!(page.items().is_empty());
        assert_eq!(page.total_count(), 3);
        assert!(!page.has_more());
    }

    #[rstest]
    fn last_full_page_reports_no_more() {
        let request = PageRequest::new(2, 2, 10).expect("valid request");
        let page = Page::from_window(vec![1, 2, 3, 4], request);
        assert_eq!(page.items(), &[3, 4]);
        assert!(!page.has_more());
    }

    #[rstest]
    fn retain_keeps_total_count() {
        let page = Page::from_window(vec![1, 2, 3, 4], PageRequest::first(4)).retain(|n| n % 2 == 0);
        assert_eq!(page.items(), &[2, 4]);
        assert_eq!(page.total_count(), 4);
    }

    #[rstest]
    #[case(1, true)]
    #[case(2, false)]
    fn filtered_pages_follow_the_window(#[case] page: u32, #[case] more: bool) {
        let request = PageRequest::new(page, 3, 10).expect("valid request");
        let filtered = Page::from_window(vec![1, 2, 3, 4, 5, 6], request).retain(|n| *n == 1);
        assert!(filtered.items().len() <= 1);
        assert_eq!(filtered.has_more(), more);
    }

    #[rstest]
    fn deserialising_rejects_zero_page() {
        let result: Result<PageRequest, _> = serde_json::from_str(r#"{"page":0,"limit":5}"#);
        assert!(result.is_err());
    }

    #[rstest]
    fn first_clamps_zero_limit() {
        assert_eq!(PageRequest::first(0).limit(), 1);
    }
}
