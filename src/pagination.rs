//! This module defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page size to use when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Optional paging fields accepted by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// The 1-based page number to return.
    pub page: Option<u64>,
    /// The number of items per page.
    pub page_size: Option<u64>,
}

impl PageParams {
    /// Resolve the request's paging fields against `config`, filling in
    /// defaults and clamping the page size to the configured maximum.
    pub fn resolve(&self, config: &PaginationConfig) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size);

        Page { page, page_size }
    }
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page.
    pub page_size: u64,
}

impl Page {
    /// The number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

/// The JSON envelope for one page of a listing.
#[derive(Debug, PartialEq, Serialize)]
pub struct Paginated<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// The 1-based page number.
    pub page: u64,
    /// The requested page size.
    pub page_size: u64,
    /// The total number of items across all pages.
    pub total_count: u64,
    /// The total number of pages.
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Wrap one page of `items` in the paging envelope.
    pub fn new(items: Vec<T>, page: Page, total_count: u64) -> Self {
        Self {
            items,
            page: page.page,
            page_size: page.page_size,
            total_count,
            total_pages: total_count.div_ceil(page.page_size).max(1),
        }
    }
}

#[cfg(test)]
mod pagination_tests {
    use crate::pagination::{Page, PageParams, Paginated, PaginationConfig};

    #[test]
    fn resolve_uses_defaults_when_unspecified() {
        let config = PaginationConfig::default();
        let params = PageParams::default();

        let page = params.resolve(&config);

        assert_eq!(
            page,
            Page {
                page: 1,
                page_size: config.default_page_size
            }
        );
    }

    #[test]
    fn resolve_clamps_page_size_to_max() {
        let config = PaginationConfig {
            default_page_size: 20,
            max_page_size: 100,
        };
        let params = PageParams {
            page: Some(2),
            page_size: Some(5000),
        };

        let page = params.resolve(&config);

        assert_eq!(
            page,
            Page {
                page: 2,
                page_size: 100
            }
        );
    }

    #[test]
    fn resolve_clamps_page_to_at_least_one() {
        let config = PaginationConfig::default();
        let params = PageParams {
            page: Some(0),
            page_size: Some(0),
        };

        let page = params.resolve(&config);

        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let page = Page {
            page: 3,
            page_size: 20,
        };

        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn envelope_computes_page_count() {
        let page = Page {
            page: 1,
            page_size: 20,
        };

        let paginated = Paginated::new(vec![1, 2, 3], page, 41);

        assert_eq!(paginated.total_pages, 3);
        assert_eq!(paginated.total_count, 41);
    }

    #[test]
    fn envelope_has_at_least_one_page_when_empty() {
        let page = Page {
            page: 1,
            page_size: 20,
        };

        let paginated = Paginated::new(Vec::<i64>::new(), page, 0);

        assert_eq!(paginated.total_pages, 1);
    }
}
