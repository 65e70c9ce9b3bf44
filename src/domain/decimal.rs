//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Quantities, prices, fees, and amounts all go through this wrapper so that
//! cost basis and gain/loss math never touches floating point. Values are
//! stored in SQLite as canonical strings and serialized to JSON as numbers.

use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal numeric type for position arithmetic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent notation,
    /// no trailing zeros). This is the on-disk representation.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Round to the nearest integer, halves away from zero.
    ///
    /// Used to recover a pre-split option strike from the post-split strike
    /// and the split ratio (e.g. 333.33 * 3 = 999.99 -> 1000).
    pub fn round_half_away(&self) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_parse_roundtrip() {
        for s in ["123.456", "0.0001", "-1500", "0", "283.93"] {
            let decimal = d(s);
            let reparsed = Decimal::from_str_canonical(&decimal.to_canonical_string()).unwrap();
            assert_eq!(decimal, reparsed, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_canonical_string_trims_trailing_zeros() {
        assert_eq!(d("1000.00").to_canonical_string(), "1000");
        assert_eq!(d("94.6400").to_canonical_string(), "94.64");
    }

    #[test]
    fn test_scale_insensitive_equality() {
        // Strikes come out of symbol strings with varying scales.
        assert_eq!(d("1000.00"), d("1000"));
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(d("999.99").round_half_away(), d("1000"));
        assert_eq!(d("0.5").round_half_away(), d("1"));
        assert_eq!(d("-0.5").round_half_away(), d("-1"));
        assert_eq!(d("333.33").round_half_away(), d("333"));
    }

    #[test]
    fn test_sign_predicates() {
        assert!(d("10").is_positive());
        assert!(d("-10").is_negative());
        assert!(d("0").is_zero());
        assert!(!d("0").is_positive());
        assert!(!d("0").is_negative());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(d("283.93") * d("-1"), d("-283.93"));
        let mut acc = d("60000");
        acc += d("-60000");
        assert!(acc.is_zero());
    }

    #[test]
    fn test_json_serializes_as_number() {
        let json = serde_json::to_value(d("123.45")).unwrap();
        assert!(json.is_number());
    }
}
