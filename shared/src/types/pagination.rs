//! Page/per-page parameters and the envelope returned by list endpoints

use serde::{Deserialize, Serialize};

const FIRST_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// 1-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Builds a request, clamping out-of-range values
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }.validate()
    }

    /// Page at least 1, page size within `1..=100`
    pub fn validate(self) -> Self {
        Self {
            page: self.page.max(FIRST_PAGE),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// `LIMIT` bind value for MySQL
    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit())
    }

    /// `OFFSET` bind value for MySQL
    pub fn offset_i64(&self) -> i64 {
        i64::from(self.offset())
    }
}

/// One page of results plus navigation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total: u64) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX);

        Self {
            data,
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > FIRST_PAGE,
        }
    }
}
