//! Pagination utilities for list endpoints

use cxperia_common::api::types::Page;
use serde::Deserialize;

/// Page size constant for all pagination
pub const PAGE_SIZE: i64 = 20;

/// `?page=&search=` query accepted by paginated list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    /// Search term, with blank strings treated as absent
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
    /// Total number of rows
    pub total: i64,
}

impl Pagination {
    /// Wrap one page of rows
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            page: self.page,
            page_size: PAGE_SIZE,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use cxperia_server::pagination::calculate_pagination;
///
/// // 50 total results = 3 pages (20 + 20 + 10)
/// let p = calculate_pagination(50, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(50, 99);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 40);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
        total: total_results,
    }
}
