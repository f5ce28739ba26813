//! Paged-query normalization.
//!
//! # Design
//! The users API answers page requests in more than one shape:
//!
//! - a bare array, with the total in an `X-Total-Count` header;
//! - an object `{ data: [...], pagination: { _totalRows } }`;
//! - anything else, which is treated as an empty page.
//!
//! The body is resolved into a `ResponseShape` once, and the total is
//! derived from it in a fixed precedence. The filter endpoint ignores paging
//! and returns every match, and some listing backends ignore `_limit`, so the
//! page is sliced client-side whenever a search was sent or the server
//! returned more than `limit` items. The slice never touches `total`.

use serde_json::{Number, Value};

use crate::client::from_value;
use crate::error::ApiError;
use crate::types::{PageQuery, PageResult, UserRecord};

/// Header carrying the total number of matches.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// A page response body, classified once.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `[...]`
    Array(Vec<Value>),
    /// `{ "data": [...], "pagination": { "_totalRows": n } }`; `total_rows`
    /// is `None` when the nested count is missing, null or zero.
    Wrapped {
        data: Vec<Value>,
        total_rows: Option<u64>,
    },
    Unknown,
}

impl ResponseShape {
    pub fn resolve(body: Option<Value>) -> Self {
        match body {
            Some(Value::Array(items)) => ResponseShape::Array(items),
            Some(Value::Object(mut map)) => match map.remove("data") {
                Some(Value::Array(data)) => {
                    let total_rows = map
                        .get("pagination")
                        .and_then(|p| p.get("_totalRows"))
                        .and_then(nested_total);
                    ResponseShape::Wrapped { data, total_rows }
                }
                _ => ResponseShape::Unknown,
            },
            _ => ResponseShape::Unknown,
        }
    }

    /// Split into raw items and the derived total.
    ///
    /// Precedence: nested total (wrapped only), then the header, then the
    /// number of items returned. An empty header counts as absent.
    pub fn into_parts(self, total_header: Option<&str>) -> (Vec<Value>, u64) {
        let header_total = total_header.filter(|h| !h.is_empty()).map(coerce_text);
        match self {
            ResponseShape::Array(items) => {
                let total = header_total.unwrap_or(items.len() as u64);
                (items, total)
            }
            ResponseShape::Wrapped { data, total_rows } => {
                let total = total_rows
                    .or(header_total)
                    .unwrap_or(data.len() as u64);
                (data, total)
            }
            ResponseShape::Unknown => (Vec::new(), 0),
        }
    }
}

/// Turn a decoded page body into at most `query.limit` records plus the total.
pub fn normalize(
    query: &PageQuery,
    body: Option<Value>,
    total_header: Option<&str>,
) -> Result<PageResult, ApiError> {
    let shape = ResponseShape::resolve(body);
    let (mut items, total) = shape.into_parts(total_header);

    let limit = query.limit as usize;
    if items.len() > limit || query.q.is_some() {
        let start = query.offset().min(items.len());
        let end = start.saturating_add(limit).min(items.len());
        tracing::debug!(
            returned = items.len(),
            start,
            end,
            "server over-returned, slicing page client-side"
        );
        items = items.drain(start..end).collect();
    }

    let items = items
        .into_iter()
        .map(|item| {
            if item.is_object() {
                from_value::<UserRecord>(item)
            } else {
                Err(ApiError::Parse(format!("expected a user object, got {item}")))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PageResult { items, total })
}

fn nested_total(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(coerce_number(n)),
        Value::String(s) if !s.is_empty() => Some(coerce_text(s)),
        _ => None,
    }
}

/// Numeric coercion for counts: anything non-numeric or negative is 0,
/// fractions are truncated.
fn coerce_text(raw: &str) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n as u64,
        _ => 0,
    }
}

fn coerce_number(n: &Number) -> u64 {
    if let Some(n) = n.as_u64() {
        return n;
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users(range: std::ops::RangeInclusive<u32>) -> Value {
        Value::Array(
            range
                .map(|i| json!({ "id": i, "name": format!("User {i}"), "email": format!("user{i}@example.com") }))
                .collect(),
        )
    }

    fn ids(result: &PageResult) -> Vec<String> {
        result
            .items
            .iter()
            .map(|u| u.id.as_ref().unwrap().to_string())
            .collect()
    }

    #[test]
    fn resolves_each_shape() {
        assert!(matches!(ResponseShape::resolve(Some(json!([]))), ResponseShape::Array(_)));
        assert_eq!(
            ResponseShape::resolve(Some(json!({ "data": [], "pagination": { "_totalRows": 5 } }))),
            ResponseShape::Wrapped {
                data: Vec::new(),
                total_rows: Some(5)
            }
        );
        assert_eq!(ResponseShape::resolve(Some(json!({ "data": {} }))), ResponseShape::Unknown);
        assert_eq!(ResponseShape::resolve(Some(json!("nope"))), ResponseShape::Unknown);
        assert_eq!(ResponseShape::resolve(None), ResponseShape::Unknown);
    }

    #[test]
    fn array_total_comes_from_header() {
        let query = PageQuery::new(2, 10, None);
        let result = normalize(&query, Some(users(11..=20)), Some("37")).unwrap();
        assert_eq!(result.total, 37);
        assert_eq!(result.items.len(), 10);
        assert_eq!(ids(&result)[0], "11");
    }

    #[test]
    fn array_without_header_counts_items() {
        let query = PageQuery::new(1, 10, None);
        let result = normalize(&query, Some(users(1..=4)), None).unwrap();
        assert_eq!(result.total, 4);

        let result = normalize(&query, Some(users(1..=4)), Some("")).unwrap();
        assert_eq!(result.total, 4);
    }

    #[test]
    fn nested_total_beats_header() {
        let query = PageQuery::new(1, 10, None);
        let body = json!({ "data": users(1..=3), "pagination": { "_page": 1, "_limit": 10, "_totalRows": 5 } });
        let result = normalize(&query, Some(body), Some("99")).unwrap();
        assert_eq!(result.total, 5);
        assert_eq!(result.items.len(), 3);
    }

    #[test]
    fn wrapped_without_nested_total_falls_back() {
        let query = PageQuery::new(1, 10, None);
        let body = json!({ "data": users(1..=3) });
        assert_eq!(normalize(&query, Some(body.clone()), Some("12")).unwrap().total, 12);
        assert_eq!(normalize(&query, Some(body), None).unwrap().total, 3);

        let zero = json!({ "data": users(1..=3), "pagination": { "_totalRows": 0 } });
        assert_eq!(normalize(&query, Some(zero), None).unwrap().total, 3);
    }

    #[test]
    fn nested_total_accepts_numeric_strings() {
        let query = PageQuery::new(1, 10, None);
        let body = json!({ "data": users(1..=2), "pagination": { "_totalRows": "8" } });
        assert_eq!(normalize(&query, Some(body), None).unwrap().total, 8);
    }

    #[test]
    fn unknown_shape_is_empty_page() {
        let query = PageQuery::new(1, 10, None);
        let result = normalize(&query, Some(json!({ "users": [] })), Some("40")).unwrap();
        assert_eq!(result, PageResult::default());
        assert_eq!(normalize(&query, None, None).unwrap(), PageResult::default());
    }

    #[test]
    fn malformed_header_coerces_to_zero() {
        let query = PageQuery::new(1, 10, None);
        let result = normalize(&query, Some(users(1..=3)), Some("lots")).unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(result.items.len(), 3);
        assert_eq!(normalize(&query, Some(users(1..=3)), Some("-4")).unwrap().total, 0);
        assert_eq!(normalize(&query, Some(users(1..=3)), Some("7.9")).unwrap().total, 7);
    }

    #[test]
    fn over_returned_listing_is_sliced() {
        let query = PageQuery::new(2, 10, None);
        let result = normalize(&query, Some(users(1..=25)), None).unwrap();
        assert_eq!(result.total, 25);
        assert_eq!(ids(&result), (11..=20).map(|i| i.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn search_results_are_always_sliced() {
        let query = PageQuery::new(3, 4, Some("example".to_string()));
        let body = json!({ "data": users(1..=10), "pagination": { "_totalRows": 10 } });
        let result = normalize(&query, Some(body), None).unwrap();
        assert_eq!(result.total, 10);
        assert_eq!(ids(&result), vec!["9", "10"]);
    }

    #[test]
    fn page_past_the_end_yields_no_items() {
        let query = PageQuery::new(9, 10, Some("x".to_string()));
        let result = normalize(&query, Some(users(1..=12)), None).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total, 12);
    }

    #[test]
    fn page_zero_slices_like_first_page() {
        let query = PageQuery {
            page: 0,
            limit: 5,
            q: Some("user".to_string()),
        };
        let result = normalize(&query, Some(users(1..=12)), None).unwrap();
        assert_eq!(ids(&result), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn items_never_exceed_limit() {
        for limit in 1..=12 {
            for page in 1..=5 {
                let query = PageQuery::new(page, limit, None);
                let result = normalize(&query, Some(users(1..=30)), Some("30")).unwrap();
                assert!(result.items.len() <= limit as usize, "page {page} limit {limit}");
            }
        }
    }

    #[test]
    fn non_object_item_is_parse_error() {
        let query = PageQuery::new(1, 10, None);
        let err = normalize(&query, Some(json!([{ "id": 1 }, 2])), None).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
