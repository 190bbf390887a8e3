//! Fixed-point money amounts
//!
//! Amounts are non-negative magnitudes with two decimal places and at most
//! 13 integer digits. The direction of money flow comes from the transaction
//! type, never from the sign. In the database they live as integer minor
//! units (cents) so that sums stay exact.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Number of decimal places kept for every amount
pub const SCALE: u32 = 2;

/// Maximum number of digits before the decimal point
pub const MAX_INTEGER_DIGITS: u32 = 13;

/// Convert a validated amount into minor units (cents)
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidData(format!(
            "Amount must not be negative (got {}); use the transaction type for direction",
            amount
        )));
    }

    if amount.round_dp(SCALE) != amount {
        return Err(Error::InvalidData(format!(
            "Amount {} has more than {} decimal places",
            amount, SCALE
        )));
    }

    let limit = Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS));
    if amount >= limit {
        return Err(Error::InvalidData(format!(
            "Amount {} exceeds {} integer digits",
            amount, MAX_INTEGER_DIGITS
        )));
    }

    (amount * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| Error::InvalidData(format!("Amount {} is out of range", amount)))
}

/// Build an amount from minor units, always with scale 2
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}

/// Parse a user-supplied amount such as "150", "150.5" or "150.50"
pub fn parse(input: &str) -> Option<Decimal> {
    Decimal::from_str(input.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(15000, 2)).unwrap(), 15000);
        assert_eq!(to_minor_units(Decimal::from(50000)).unwrap(), 5_000_000);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        // Trailing zeros beyond the scale are fine
        assert_eq!(to_minor_units(Decimal::new(12300, 4)).unwrap(), 123);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = to_minor_units(Decimal::new(-100, 2)).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_extra_precision_rejected() {
        let err = to_minor_units(Decimal::new(1234, 3)).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_integer_digit_limit() {
        let max = Decimal::from_str("9999999999999.99").unwrap();
        assert_eq!(to_minor_units(max).unwrap(), 999_999_999_999_999);

        let too_big = Decimal::from(10_000_000_000_000_i64);
        assert!(to_minor_units(too_big).is_err());
    }

    #[test]
    fn test_from_minor_units_keeps_scale() {
        assert_eq!(from_minor_units(15000).to_string(), "150.00");
        assert_eq!(from_minor_units(0).to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse(" 150.5 "), Some(Decimal::new(1505, 1)));
        assert_eq!(parse("abc"), None);
    }
}
