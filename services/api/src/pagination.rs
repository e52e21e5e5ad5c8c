//! Page-number pagination for list endpoints
//!
//! Default page size is 10; clients may override it with the `page_size`
//! query parameter up to a hard cap of 100.

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw pagination query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Clamped pagination window derived from a [`PageQuery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        let number = query.page.unwrap_or(1).max(1);
        let size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Page { number, size }
    }
}

impl Page {
    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.size as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unspecified() {
        let page = Page::from(PageQuery::default());
        assert_eq!(page, Page { number: 1, size: 10 });
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn client_override_is_honored() {
        let page = Page::from(PageQuery {
            page: Some(3),
            page_size: Some(25),
        });
        assert_eq!(page, Page { number: 3, size: 25 });
        assert_eq!(page.offset(), 50);
    }

    #[test]
    fn page_size_is_capped_at_100() {
        let page = Page::from(PageQuery {
            page: Some(1),
            page_size: Some(5000),
        });
        assert_eq!(page.size, 100);
    }

    #[test]
    fn zero_values_are_clamped() {
        let page = Page::from(PageQuery {
            page: Some(0),
            page_size: Some(0),
        });
        assert_eq!(page, Page { number: 1, size: 1 });
    }
}
