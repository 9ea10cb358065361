use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

static PAGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+$").expect("valid page id pattern"));

/// Inclusive follower bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowerRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Filters accepted by the page collection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    pub followers: Option<FollowerRange>,
    pub name: Option<String>,
    pub industry: Option<String>,
}

impl PageFilter {
    pub fn from_query(
        follower_range: Option<&str>,
        name: Option<&str>,
        industry: Option<&str>,
    ) -> AppResult<Self> {
        let followers = match follower_range.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_follower_range(raw)?),
        };
        Ok(Self {
            followers,
            name: non_empty(name),
            industry: non_empty(industry),
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses `20k-40k`, `1.5m-2m`, `500-` or `-10k`.
pub fn parse_follower_range(raw: &str) -> AppResult<FollowerRange> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let (low, high) = normalized.split_once('-').ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid follower_range '{}': expected a low-high pair such as 20k-40k",
            raw
        ))
    })?;

    let parse_side = |side: &str| -> AppResult<Option<i64>> {
        if side.is_empty() {
            return Ok(None);
        }
        parse_compact_number(side).map(Some).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid follower count '{}' in follower_range", side))
        })
    };

    let range = FollowerRange {
        min: parse_side(low)?,
        max: parse_side(high)?,
    };

    match (range.min, range.max) {
        (None, None) => Err(AppError::BadRequest(
            "follower_range needs at least one bound".to_string(),
        )),
        (Some(min), Some(max)) if min > max => Err(AppError::BadRequest(format!(
            "follower_range lower bound {} exceeds upper bound {}",
            min, max
        ))),
        _ => Ok(range),
    }
}

/// Parses counts written like `12,345`, `40k` or `1.5M`.
pub fn parse_compact_number(raw: &str) -> Option<i64> {
    let cleaned = raw.trim().replace(',', "").to_lowercase();
    let (digits, multiplier) = if let Some(rest) = cleaned.strip_suffix('k') {
        (rest, 1_000f64)
    } else if let Some(rest) = cleaned.strip_suffix('m') {
        (rest, 1_000_000f64)
    } else {
        (cleaned.as_str(), 1f64)
    };

    let value: f64 = digits.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as i64)
}

pub fn validate_page_id(page_id: &str) -> bool {
    PAGE_ID_RE.is_match(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_follower_range() {
        assert_eq!(
            parse_follower_range("20k-40k").unwrap(),
            FollowerRange { min: Some(20_000), max: Some(40_000) }
        );
        assert_eq!(
            parse_follower_range(" 1.5M - 2m ").unwrap(),
            FollowerRange { min: Some(1_500_000), max: Some(2_000_000) }
        );
        assert_eq!(
            parse_follower_range("500-").unwrap(),
            FollowerRange { min: Some(500), max: None }
        );
        assert_eq!(
            parse_follower_range("-10k").unwrap(),
            FollowerRange { min: None, max: Some(10_000) }
        );
    }

    #[test]
    fn test_parse_follower_range_rejects_malformed() {
        assert!(parse_follower_range("20k").is_err());
        assert!(parse_follower_range("abc-def").is_err());
        assert!(parse_follower_range("-").is_err());
        assert!(parse_follower_range("40k-20k").is_err());
        assert!(parse_follower_range("1-2-3").is_err());
    }

    #[test]
    fn test_range_bounds_are_exact() {
        let range = parse_follower_range("20k-30k").unwrap();
        assert_eq!(range.min, Some(20_000));
        assert_eq!(range.max, Some(30_000));
    }

    #[test]
    fn test_parse_compact_number() {
        assert_eq!(parse_compact_number("12,345"), Some(12_345));
        assert_eq!(parse_compact_number("12K"), Some(12_000));
        assert_eq!(parse_compact_number("2.5m"), Some(2_500_000));
        assert_eq!(parse_compact_number("lots"), None);
        assert_eq!(parse_compact_number(""), None);
    }

    #[test]
    fn test_validate_page_id() {
        assert!(validate_page_id("deepsolv"));
        assert!(validate_page_id("acme-corp_2"));
        assert!(!validate_page_id("invalid@id!"));
        assert!(!validate_page_id(""));
        assert!(!validate_page_id("a b"));
    }

    #[test]
    fn test_page_filter_ignores_blank_params() {
        let filter = PageFilter::from_query(Some(""), Some("  "), None).unwrap();
        assert_eq!(filter, PageFilter::default());
    }
}
