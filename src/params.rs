//! Query parameter normalization.
//!
//! Turns the raw strings a transport hands us into a bounded [`ListQuery`].
//! Out-of-range numbers are clamped; values of the wrong type are rejected
//! with a per-field message. Nothing here touches the store.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_LIMIT, DEFAULT_OFFSET, MAX_LIMIT, MIN_LIMIT};
use crate::error::{CatalogError, Result};
use crate::price::{Price, PriceParseError};

const OFFSET_MUST_BE_INT: &str = "offset must be an integer";
const LIMIT_MUST_BE_INT: &str = "limit must be an integer";
const PRICE_MUST_BE_NUMERIC: &str = "price ceiling must be numeric";
const PRICE_MUST_BE_NON_NEGATIVE: &str = "price ceiling must be >= 0";

// ---------------------------------------------------------------------------
// RawListParams
// ---------------------------------------------------------------------------

/// Untrusted listing parameters, exactly as received.
///
/// `None` and `Some("")` both mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListParams {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub price_lt: Option<String>,
}

impl RawListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, v: impl Into<String>) -> Self {
        self.offset = Some(v.into());
        self
    }

    pub fn limit(mut self, v: impl Into<String>) -> Self {
        self.limit = Some(v.into());
        self
    }

    pub fn category(mut self, v: impl Into<String>) -> Self {
        self.category = Some(v.into());
        self
    }

    pub fn price_lt(mut self, v: impl Into<String>) -> Self {
        self.price_lt = Some(v.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ListQuery
// ---------------------------------------------------------------------------

/// Validated listing options.
///
/// Construct through [`normalize`] or the methods below; either way
/// `MIN_LIMIT <= limit <= MAX_LIMIT`, `category` is trimmed and lower-cased,
/// and `price_below` is non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    offset: usize,
    limit: usize,
    category: Option<String>,
    price_below: Option<Price>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSET as i64, DEFAULT_LIMIT as i64)
    }
}

impl ListQuery {
    /// Clamp offset and limit into range.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: usize::try_from(offset.max(0)).unwrap_or(usize::MAX),
            limit: clamp_limit(limit),
            category: None,
            price_below: None,
        }
    }

    pub fn with_category(mut self, raw: &str) -> Self {
        self.category = normalize_category(raw);
        self
    }

    pub fn with_price_below(mut self, ceiling: Price) -> Result<Self> {
        if ceiling.is_negative() {
            return Err(CatalogError::invalid(PRICE_MUST_BE_NON_NEGATIVE));
        }
        self.price_below = Some(ceiling);
        Ok(self)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn price_below(&self) -> Option<Price> {
        self.price_below
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate and bound raw listing parameters.
pub fn normalize(raw: &RawListParams) -> Result<ListQuery> {
    let offset = parse_offset(raw.offset.as_deref().unwrap_or(""))?;
    let limit = parse_limit(raw.limit.as_deref().unwrap_or(""))?;
    let price_below = parse_price_below(raw.price_lt.as_deref().unwrap_or(""))?;

    Ok(ListQuery {
        offset,
        limit,
        category: raw.category.as_deref().and_then(normalize_category),
        price_below,
    })
}

/// Empty → 0; negative → 0; non-integer → error.
pub fn parse_offset(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_OFFSET);
    }
    let v: i64 = raw
        .parse()
        .map_err(|_| CatalogError::invalid(OFFSET_MUST_BE_INT))?;
    Ok(usize::try_from(v.max(0)).unwrap_or(usize::MAX))
}

/// Empty → default; clamped into `[MIN_LIMIT, MAX_LIMIT]`; non-integer → error.
pub fn parse_limit(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_LIMIT);
    }
    let v: i64 = raw
        .parse()
        .map_err(|_| CatalogError::invalid(LIMIT_MUST_BE_INT))?;
    Ok(clamp_limit(v))
}

/// Empty → no filter; non-numeric or negative → error.
pub fn parse_price_below(raw: &str) -> Result<Option<Price>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let price = Price::parse_upper_bound(raw).map_err(|e| match e {
        PriceParseError::Malformed(_) | PriceParseError::TooPrecise(_) => {
            CatalogError::invalid(PRICE_MUST_BE_NUMERIC)
        }
    })?;
    if price.is_negative() {
        return Err(CatalogError::invalid(PRICE_MUST_BE_NON_NEGATIVE));
    }
    Ok(Some(price))
}

/// Trim and lower-case; empty means no filter.
pub fn normalize_category(raw: &str) -> Option<String> {
    let code = raw.trim().to_lowercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

fn clamp_limit(v: i64) -> usize {
    v.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn message(err: CatalogError) -> String {
        assert_eq!(err.kind(), "invalid");
        err.to_string()
    }

    #[test]
    fn empty_params_use_defaults() {
        let q = normalize(&RawListParams::new()).unwrap();
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.category(), None);
        assert_eq!(q.price_below(), None);
        assert_eq!(q, ListQuery::default());
    }

    #[test]
    fn offset_rules() {
        assert_eq!(parse_offset("").unwrap(), 0);
        assert_eq!(parse_offset(" 7 ").unwrap(), 7);
        assert_eq!(parse_offset("-5").unwrap(), 0);
        assert_eq!(message(parse_offset("x").unwrap_err()), "offset must be an integer");
        assert_eq!(message(parse_offset("1.5").unwrap_err()), "offset must be an integer");
    }

    #[test]
    fn limit_rules() {
        assert_eq!(parse_limit("").unwrap(), 10);
        assert_eq!(parse_limit("0").unwrap(), 1);
        assert_eq!(parse_limit("-3").unwrap(), 1);
        assert_eq!(parse_limit("9999").unwrap(), 100);
        assert_eq!(parse_limit("25").unwrap(), 25);
        assert_eq!(message(parse_limit("x").unwrap_err()), "limit must be an integer");
    }

    #[test]
    fn category_is_trimmed_and_lowercased() {
        assert_eq!(normalize_category("  CLOThing  ").as_deref(), Some("clothing"));
        assert_eq!(normalize_category("   "), None);
        assert_eq!(normalize_category(""), None);
    }

    #[test]
    fn price_ceiling_rules() {
        assert_eq!(parse_price_below("").unwrap(), None);
        assert_eq!(parse_price_below("19.99").unwrap(), Some(Price::from_cents(1999)));
        assert_eq!(parse_price_below("0").unwrap(), Some(Price::ZERO));
        assert_eq!(parse_price_below("2e1").unwrap(), Some(Price::from_cents(2000)));
        assert_eq!(
            message(parse_price_below("-1").unwrap_err()),
            "price ceiling must be >= 0"
        );
        assert_eq!(
            message(parse_price_below("cheap").unwrap_err()),
            "price ceiling must be numeric"
        );
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let raw = RawListParams::new().offset("a").limit("b");
        assert_eq!(message(normalize(&raw).unwrap_err()), "offset must be an integer");
    }

    #[test]
    fn builder_methods_keep_invariants() {
        let q = ListQuery::new(-4, 500).with_category(" Shoes ");
        assert_eq!((q.offset(), q.limit()), (0, 100));
        assert_eq!(q.category(), Some("shoes"));
        assert!(ListQuery::default()
            .with_price_below(Price::from_cents(-1))
            .is_err());
    }

    proptest! {
        #[test]
        fn offset_is_max_zero(o in any::<i64>()) {
            let parsed = parse_offset(&o.to_string()).unwrap();
            prop_assert_eq!(parsed as i64, o.max(0));
        }

        #[test]
        fn limit_always_in_range(l in any::<i64>()) {
            let parsed = parse_limit(&l.to_string()).unwrap();
            prop_assert!((MIN_LIMIT..=MAX_LIMIT).contains(&parsed));
        }

        #[test]
        fn category_normalization_is_idempotent(c in "\\PC{0,20}") {
            let once = normalize_category(&c);
            let again = normalize_category(&c.trim().to_lowercase());
            prop_assert_eq!(once, again);
        }

        #[test]
        fn non_integers_are_rejected(s in "[a-zA-Z]{1,8}") {
            prop_assert!(parse_offset(&s).is_err());
            prop_assert!(parse_limit(&s).is_err());
        }
    }
}
