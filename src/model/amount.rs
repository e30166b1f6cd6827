//! Amount type for handling currency values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. The finance API sends amounts
//! either as JSON numbers or as numeric strings (e.g. `"100.00"` from a `NUMERIC` column), and
//! forms supply whatever the user typed, possibly with a dollar sign and commas.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Currency amounts are displayed with two places.
const CURRENCY_PLACES: u32 = 2;

/// Represents a dollar amount.
///
/// Display always uses two decimal places with a leading dollar sign, e.g. `$50.00` or
/// `-$50.00`. Values are rounded half away from zero when displayed.
///
/// # Examples
///
/// ```
/// # use fin::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,050.5").unwrap();
/// assert_eq!(amount.to_string(), "-$1050.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The value rounded to currency precision.
    pub fn rounded(&self) -> Decimal {
        self.value
            .round_dp_with_strategy(CURRENCY_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Self::new(self.value.abs())
    }

    /// The absolute value with two places and no sign or dollar sign, e.g. `50.00`.
    pub fn plain(&self) -> String {
        format!("{:.2}", self.rounded().abs())
    }

    /// Formats the amount with an explicit sign: `+$50.00` for positive values (and zero),
    /// `-$50.00` for negative values.
    pub fn signed(&self) -> String {
        if self.rounded().is_sign_negative() && !self.rounded().is_zero() {
            format!("-${}", self.plain())
        } else {
            format!("+${}", self.plain())
        }
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses `50`, `50.00`, `$50.00`, `-$1,000.00` and numbers in scientific notation. An empty
    /// string is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let digits = rest.strip_prefix('$').unwrap_or(rest).replace(',', "");

        let value = Decimal::from_str(&digits)
            .or_else(|_| Decimal::from_scientific(&digits))
            .map_err(AmountError)?;
        Ok(Amount::new(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.rounded().is_sign_negative() && !self.rounded().is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}${}", self.plain())
    }
}

impl Serialize for Amount {
    /// Amounts are sent to the API as JSON numbers.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.value.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts a JSON number, a numeric string, or `null` (zero).
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match raw {
            serde_json::Value::Null => Ok(Amount::ZERO),
            serde_json::Value::Number(n) => {
                Amount::from_str(&n.to_string()).map_err(serde::de::Error::custom)
            }
            serde_json::Value::String(s) => {
                Amount::from_str(&s).map_err(serde::de::Error::custom)
            }
            other => Err(serde::de::Error::custom(format!(
                "expected a number or numeric string for an amount, got {other}"
            ))),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_and_dollar() {
        assert_eq!(Amount::from_str("50").unwrap().value(), dec("50"));
        assert_eq!(Amount::from_str("$50.00").unwrap().value(), dec("50.00"));
        assert_eq!(Amount::from_str("-$50.00").unwrap().value(), dec("-50"));
        assert_eq!(Amount::from_str("  12.5 ").unwrap().value(), dec("12.5"));
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(Amount::from_str("").unwrap().is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from(50).to_string(), "$50.00");
        assert_eq!(Amount::new(dec("-7.5")).to_string(), "-$7.50");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
        assert_eq!(Amount::new(dec("2.005")).to_string(), "$2.01");
    }

    #[test]
    fn test_tiny_negative_displays_without_sign() {
        assert_eq!(Amount::new(dec("-0.001")).to_string(), "$0.00");
        assert_eq!(Amount::new(dec("-0.001")).signed(), "+$0.00");
    }

    #[test]
    fn test_signed() {
        assert_eq!(Amount::new(dec("1500")).signed(), "+$1500.00");
        assert_eq!(Amount::new(dec("-42.1")).signed(), "-$42.10");
    }

    #[test]
    fn test_format_then_parse_rounds_to_cents() {
        for s in ["0.004", "0.005", "19.999", "-3.14159", "123456.785", "7"] {
            let a = Amount::new(dec(s));
            let parsed = Amount::from_str(&a.to_string()).unwrap();
            assert_eq!(parsed.value(), a.rounded(), "round trip of {s}");
        }
    }

    #[test]
    fn test_deserialize_number_string_and_null() {
        let a: Amount = serde_json::from_str("85.5").unwrap();
        assert_eq!(a.value(), dec("85.5"));
        let b: Amount = serde_json::from_str("\"100.00\"").unwrap();
        assert_eq!(b.value(), dec("100"));
        let c: Amount = serde_json::from_str("null").unwrap();
        assert!(c.is_zero());
        assert!(serde_json::from_str::<Amount>("true").is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Amount::new(dec("12.5"))).unwrap();
        assert_eq!(json, "12.5");
    }
}
