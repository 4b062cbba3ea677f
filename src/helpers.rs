//! Display rounding for forecast values.
//!
//! Rounding goes through `Decimal` so the reported value is the shortest
//! decimal at the requested precision rather than a binary float that prints
//! as `3.0000000000000004`. Ties round half to even.
//!
//! All helpers return `0` for non-finite inputs (NaN, ±Inf).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert an f64 to Decimal, rounded to `dp` decimal places.
pub(crate) fn f64_to_decimal_dp(v: f64, dp: u32) -> Decimal {
    if !v.is_finite() {
        tracing::warn!(
            "f64_to_decimal_dp received non-finite value {}, defaulting to 0",
            v
        );
        return Decimal::ZERO;
    }
    Decimal::from_str_exact(&format!("{:.*}", dp as usize, v))
        .unwrap_or_default()
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// Round to `dp` decimal places for JSON output.
pub(crate) fn round_dp(v: f64, dp: u32) -> f64 {
    f64_to_decimal_dp(v, dp).to_f64().unwrap_or(0.0)
}

/// Round to 1 decimal place (temperatures, scores, precipitation %).
pub(crate) fn round_1dp(v: f64) -> f64 {
    round_dp(v, 1)
}

/// Round to 2 decimal places (rain accumulation in inches).
pub(crate) fn round_2dp(v: f64) -> f64 {
    round_dp(v, 2)
}

/// Round to the nearest integer (humidity, wind speed).
pub(crate) fn round_int(v: f64) -> i64 {
    f64_to_decimal_dp(v, 0).to_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_f64_to_decimal_dp_normal() {
        assert_eq!(f64_to_decimal_dp(3.14159, 2), Decimal::from_str("3.14").unwrap());
    }

    #[test]
    fn test_f64_to_decimal_dp_nan() {
        assert_eq!(f64_to_decimal_dp(f64::NAN, 1), Decimal::ZERO);
    }

    #[test]
    fn test_f64_to_decimal_dp_infinity() {
        assert_eq!(f64_to_decimal_dp(f64::INFINITY, 1), Decimal::ZERO);
        assert_eq!(f64_to_decimal_dp(f64::NEG_INFINITY, 1), Decimal::ZERO);
    }

    #[test]
    fn test_round_1dp() {
        assert_eq!(round_1dp(72.46), 72.5);
        assert_eq!(round_1dp(-4.74), -4.7);
    }

    #[test]
    fn test_round_2dp_cleans_float_noise() {
        // 76.2 / 25.4 is not exactly 3.0 in binary floating point
        assert_eq!(round_2dp(76.2 / 25.4), 3.0);
    }

    #[test]
    fn test_round_int() {
        assert_eq!(round_int(54.6), 55);
        assert_eq!(round_int(54.4), 54);
        assert_eq!(round_int(-2.6), -3);
    }

    #[test]
    fn test_round_int_non_finite() {
        assert_eq!(round_int(f64::NAN), 0);
    }
}
