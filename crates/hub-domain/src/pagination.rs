//! Pagination types shared by every list endpoint.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const MAX_PAGE: u64 = 1_000_000;

/// A page window, always within bounds.
///
/// - `page_size`: 1–100, default 20
/// - `page`: 1–1000000, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamp raw query values. Non-positive pages become page 1, oversized
    /// page sizes are capped at 100 and pages past [`MAX_PAGE`] are capped.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page_size = page_size
            .map(|s| s.clamp(1, MAX_PAGE_SIZE as i64) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let page = page
            .map(|p| p.clamp(1, MAX_PAGE as i64) as u64)
            .unwrap_or(1);
        Self { page, page_size }
    }

    /// Accepts either `page`/`pageSize` or `limit`/`offset`. When both styles
    /// are present the page style wins.
    pub fn from_query(
        page: Option<i64>,
        page_size: Option<i64>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Self {
        let sized = Self::new(None, page_size.or(limit));
        match (page, offset) {
            (Some(_), _) | (None, None) => Self::new(page, Some(sized.page_size as i64)),
            (None, Some(offset)) => Self {
                page: (offset.max(0) as u64 / sized.page_size + 1).min(MAX_PAGE),
                page_size: sized.page_size,
            },
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// `data` payload of every paginated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        Self {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages: total.div_ceil(page.page_size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
