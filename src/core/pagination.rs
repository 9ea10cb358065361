use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A clamped page request. `page` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, max_per_page: u32) -> Self {
        let max_per_page = max_per_page.max(1);
        Self {
            page: page.clamp(1, u32::MAX as i64) as u32,
            per_page: per_page.clamp(1, max_per_page as i64) as u32,
        }
    }

    /// Builds a request from raw query values. Non-numeric values are rejected.
    pub fn from_query(
        page: Option<&str>,
        per_page: Option<&str>,
        default_per_page: u32,
        max_per_page: u32,
    ) -> AppResult<Self> {
        let page = parse_int_param("page", page)?.unwrap_or(1);
        let per_page = parse_int_param("per_page", per_page)?.unwrap_or(default_per_page as i64);
        Ok(Self::new(page, per_page, max_per_page))
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    pub fn meta(&self, total_items: i64) -> PaginationMeta {
        PaginationMeta::new(*self, total_items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: Pagination, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let per_page = pagination.per_page as i64;
        let total_pages = (total_items + per_page - 1) / per_page;
        let page = pagination.page as i64;
        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Empty values count as absent.
pub fn parse_int_param(name: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
            AppError::BadRequest(format!("Query parameter '{}' must be an integer", name))
        }),
    }
}

/// Only a case-insensitive `true` enables a flag.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_page_and_per_page() {
        let p = Pagination::new(0, 500, 50);
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 50);

        let p = Pagination::new(-3, 0, 50);
        assert_eq!(p, Pagination { page: 1, per_page: 1 });
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(1, 10, 50).offset(), 0);
        assert_eq!(Pagination::new(3, 10, 50).offset(), 20);
    }

    #[test]
    fn test_defaults_from_query() {
        let p = Pagination::from_query(None, None, 10, 50).unwrap();
        assert_eq!(p, Pagination { page: 1, per_page: 10 });

        let p = Pagination::from_query(Some("2"), Some("5"), 10, 50).unwrap();
        assert_eq!(p, Pagination { page: 2, per_page: 5 });
    }

    #[test]
    fn test_non_numeric_query_rejected() {
        let err = Pagination::from_query(Some("two"), None, 10, 50).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = Pagination::from_query(None, Some("1.5"), 10, 50).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_meta_math() {
        let meta = Pagination::new(2, 10, 50).meta(25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let meta = Pagination::new(3, 10, 50).meta(25);
        assert!(!meta.has_next);

        let meta = Pagination::new(1, 10, 50).meta(0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("TRUE")));
        assert!(!parse_flag(Some("1")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(None));
    }
}
