//! Offset pagination utilities.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not ask for one.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Pagination query parameters (`?page=2&per_page=50`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageRequest {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageRequest {
    /// 1-based page number, never below 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        self.per_page()
    }

    /// SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }

    /// Builds the response metadata for a result set of `total` rows.
    pub fn info(&self, total: i64) -> PageInfo {
        PageInfo::new(self.page(), self.per_page(), total)
    }
}

/// Pagination info for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageInfo {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest {
            page: Some(-3),
            per_page: Some(10_000),
        };
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), MAX_PER_PAGE);

        let req = PageRequest {
            page: Some(2),
            per_page: Some(0),
        };
        assert_eq!(req.per_page(), 1);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest {
            page: Some(3),
            per_page: Some(25),
        };
        assert_eq!(req.limit(), 25);
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageInfo::new(1, 20, 0).total_pages, 0);
        assert_eq!(PageInfo::new(1, 20, 20).total_pages, 1);
        assert_eq!(PageInfo::new(1, 20, 21).total_pages, 2);
    }

    #[test]
    fn test_deserialize_query() {
        let req: PageRequest = serde_json::from_str(r#"{"page":4}"#).unwrap();
        assert_eq!(req.page(), 4);
        assert_eq!(req.per_page(), DEFAULT_PER_PAGE);
    }
}
