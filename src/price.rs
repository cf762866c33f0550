//! Exact monetary values.
//!
//! A [`Price`] is a base-10 fixed-point number with [`PRICE_SCALE`] fractional
//! digits, backed by [`rust_decimal::Decimal`]. Comparisons, filters and
//! storage all go through this type. The only float conversion is at
//! serialization, where a price is written as a JSON number.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::PRICE_SCALE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceParseError {
    #[error("not a decimal number: {0:?}")]
    Malformed(String),

    #[error("more than two fractional digits: {0:?}")]
    TooPrecise(String),
}

/// Exact price with a fixed scale of two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Build a price from an integer number of cents.
    ///
    /// ```
    /// use catalog_engine::Price;
    /// assert_eq!(Price::from_cents(1999).to_string(), "19.99");
    /// ```
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, PRICE_SCALE))
    }

    /// Wrap a decimal, rounding half away from zero to the price scale.
    pub fn from_decimal(value: Decimal) -> Self {
        Self::scaled(value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Parse an upper bound for a strict `<` comparison.
    ///
    /// Digits beyond the scale round toward positive infinity, so
    /// `price < bound` selects the same stored prices as the unrounded input
    /// would: `"19.991"` becomes `19.99 + 0.01 = 20.00`, and a product at
    /// `19.99` still passes.
    pub fn parse_upper_bound(raw: &str) -> Result<Self, PriceParseError> {
        let value = parse_decimal(raw)?;
        Ok(Self::scaled(
            value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::ToPositiveInfinity),
        ))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Total number of cents, or `None` when that does not fit an `i64`.
    pub fn cents(&self) -> Option<i64> {
        self.0.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
    }

    /// Lossy conversion for JSON number rendering.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    fn scaled(mut value: Decimal) -> Self {
        value.rescale(PRICE_SCALE);
        Self(value)
    }
}

/// Accepts `[+-]digits[.digits][e[+-]digits]` and nothing else: no
/// separators, no `inf`/`NaN`, no hex.
fn parse_decimal(raw: &str) -> Result<Decimal, PriceParseError> {
    let malformed = || PriceParseError::Malformed(raw.to_string());
    let s = raw.trim();
    let negative = s.starts_with('-');
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (unsigned, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits_ok = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() || !digits_ok(int_part) || !digits_ok(frac_part) {
        return Err(malformed());
    }
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let canonical = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };

    let mut value = Decimal::from_str(&canonical).map_err(|_| malformed())?;
    if let Some(exp) = exponent {
        let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp_digits.is_empty() || !digits_ok(exp_digits) {
            return Err(malformed());
        }
        let places: u32 = exp_digits.parse().map_err(|_| malformed())?;
        if exp.starts_with('-') {
            // Anything past 28 places has already rounded to zero.
            for _ in 0..places.min(64) {
                value = value.checked_div(Decimal::TEN).ok_or_else(malformed)?;
            }
        } else if !value.is_zero() {
            for _ in 0..places {
                value = value.checked_mul(Decimal::TEN).ok_or_else(malformed)?;
            }
        }
    }
    Ok(if negative { -value } else { value })
}

impl FromStr for Price {
    type Err = PriceParseError;

    /// Exact parse; rejects values that would need rounding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_decimal(s)?;
        if value.normalize().scale() > PRICE_SCALE {
            return Err(PriceParseError::TooPrecise(s.to_string()));
        }
        Ok(Self::scaled(value))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    /// Written as a number. Every value a `DECIMAL(10, 2)` column can hold
    /// survives the trip through `f64`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal price as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Ok(Price::scaled(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price::scaled(Decimal::from(v)))
    }

    // Shortest round-trip text of the float, so 19.99 stays 19.99.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        let value = Decimal::from_str(&v.to_string()).map_err(E::custom)?;
        Ok(Price::from_decimal(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_exact_values() {
        let p: Price = "19.99".parse().unwrap();
        assert_eq!(p, Price::from_cents(1999));
        assert_eq!(p.to_string(), "19.99");
        assert_eq!("100".parse::<Price>().unwrap().to_string(), "100.00");
        assert_eq!(".5".parse::<Price>().unwrap(), Price::from_cents(50));
    }

    #[test]
    fn rejects_non_numbers() {
        for raw in ["", "abc", "e2", "1e", "1e+", "1e2.5", "NaN", "inf", "1,5", "1.2.3", "--1", ".", "12a", "0x10"] {
            assert!(
                matches!(raw.parse::<Price>(), Err(PriceParseError::Malformed(_))),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn accepts_exponent_notation() {
        assert_eq!("1e2".parse::<Price>().unwrap(), Price::from_cents(10000));
        assert_eq!("2.5E+1".parse::<Price>().unwrap(), Price::from_cents(2500));
        assert_eq!("1999e-2".parse::<Price>().unwrap(), Price::from_cents(1999));
        assert_eq!("-1e0".parse::<Price>().unwrap(), Price::from_cents(-100));
        assert!(matches!("1e-3".parse::<Price>(), Err(PriceParseError::TooPrecise(_))));
        assert_eq!(Price::parse_upper_bound("1e-3").unwrap(), Price::from_cents(1));
        assert_eq!("0e999".parse::<Price>().unwrap(), Price::ZERO);
        // Beyond the decimal range.
        assert!(matches!("1e40".parse::<Price>(), Err(PriceParseError::Malformed(_))));
    }

    #[test]
    fn from_str_refuses_to_round() {
        assert!(matches!(
            "19.999".parse::<Price>(),
            Err(PriceParseError::TooPrecise(_))
        ));
        // Trailing zeros are not extra precision.
        assert_eq!("19.9900".parse::<Price>().unwrap(), Price::from_cents(1999));
    }

    #[test]
    fn upper_bound_rounds_up() {
        assert_eq!(Price::parse_upper_bound("19.991").unwrap(), Price::from_cents(2000));
        assert_eq!(Price::parse_upper_bound("19.99").unwrap(), Price::from_cents(1999));
        assert_eq!(Price::parse_upper_bound("0.001").unwrap(), Price::from_cents(1));
    }

    #[test]
    fn negative_and_zero() {
        assert!("-1".parse::<Price>().unwrap().is_negative());
        assert!(!"-0".parse::<Price>().unwrap().is_negative());
        assert!("0.00".parse::<Price>().unwrap().is_zero());
    }

    #[test]
    fn serializes_as_a_number() {
        assert_eq!(serde_json::to_string(&Price::from_cents(1999)).unwrap(), "19.99");
        let value = serde_json::to_value(Price::from_cents(10000)).unwrap();
        assert!(value.is_number());
        assert_eq!(value, 100.0);
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let from_str: Price = serde_json::from_str("\"12.50\"").unwrap();
        let from_num: Price = serde_json::from_str("12.5").unwrap();
        let from_int: Price = serde_json::from_str("12").unwrap();
        assert_eq!(from_str, Price::from_cents(1250));
        assert_eq!(from_num, Price::from_cents(1250));
        assert_eq!(from_int, Price::from_cents(1200));
    }

    #[test]
    fn cents_overflow_is_reported() {
        assert_eq!(Price::from_cents(i64::MAX).cents(), Some(i64::MAX));
        let huge: Price = "79228162514264337593543950335".parse().unwrap();
        assert_eq!(huge.cents(), None);
    }

    #[test]
    fn float_conversion_keeps_catalog_values() {
        assert_eq!(Price::from_cents(1999).to_f64(), 19.99);
        assert_eq!(Price::from_cents(9_999_999_999).to_f64(), 99_999_999.99);
    }

    proptest! {
        #[test]
        fn ordering_matches_cents(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
            prop_assert_eq!(Price::from_cents(a) < Price::from_cents(b), a < b);
            prop_assert_eq!(Price::from_cents(a).cents(), Some(a));
        }

        #[test]
        fn display_is_parseable(cents in 0i64..10_000_000_000) {
            let p = Price::from_cents(cents);
            prop_assert_eq!(p.to_string().parse::<Price>().unwrap(), p);
        }

        #[test]
        fn json_number_reads_back_exactly(cents in -9_999_999_999i64..=9_999_999_999) {
            let p = Price::from_cents(cents);
            let json = serde_json::to_string(&p).unwrap();
            prop_assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), p);
        }
    }
}
