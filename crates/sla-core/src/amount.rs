//! Precision-safe monetary amounts.
//!
//! Uses `rust_decimal` so that summing thousands of order costs does not
//! drift the way `f64` accumulation does. On the wire the producer writes
//! plain JSON numbers, so `Amount` serializes as a float and accepts both
//! integer and float literals.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Monetary amount with exact decimal precision (SAR in the source sheets).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Round to `dp` decimal places, ties to even (matches the producer's `round`).
    #[inline]
    pub fn round_dp(&self, dp: u32) -> Self {
        Self(self.0.round_dp(dp))
    }

    /// Lossy conversion for display and ratio math.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(Decimal::from(v))
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, a| acc + a)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts stay integers so rendered files match the producer's output.
        if self.0.fract().is_zero() {
            if let Some(v) = self.0.to_i64() {
                return serializer.serialize_i64(v);
            }
        }
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_accepts_integer_and_float_literals() {
        let a: Amount = serde_json::from_str("1200").unwrap();
        assert_eq!(a.inner(), dec!(1200));

        let b: Amount = serde_json::from_str("1200.5").unwrap();
        assert_eq!(b.inner(), dec!(1200.5));
    }

    #[test]
    fn test_amount_serializes_as_number() {
        let whole = Amount::new(dec!(1500));
        assert_eq!(serde_json::to_string(&whole).unwrap(), "1500");

        let frac = Amount::new(dec!(1500.25));
        assert_eq!(serde_json::to_string(&frac).unwrap(), "1500.25");
    }

    #[test]
    fn test_amount_rejects_strings() {
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }

    #[test]
    fn test_amount_sum_is_exact() {
        let total: Amount = std::iter::repeat(Amount::new(dec!(0.1))).take(10).sum();
        assert_eq!(total.inner(), dec!(1.0));
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(Amount::new(dec!(10.005)).round_dp(2).inner(), dec!(10.00));
        assert_eq!(Amount::new(dec!(10.015)).round_dp(2).inner(), dec!(10.02));
        assert_eq!(Amount::new(dec!(3.14159)).round_dp(2).inner(), dec!(3.14));
        assert!(Amount::new(dec!(-1)).is_negative());
        assert!(!Amount::ZERO.is_negative());
    }
}
