//! Conversion between major currency units and gateway minor units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Balances are `rust_decimal::Decimal` in major units everywhere inside the
//! system. Payment processors speak integer minor units (cents), so values
//! cross that boundary only through these two functions.

use rust_decimal::Decimal;
use thiserror::Error;

/// Amount in the currency's smallest unit, as payment processors expect it.
pub type MinorUnits = i64;

/// Minor units per major unit for the single supported currency.
const MINOR_SCALE: u32 = 2;

/// Largest amount a balance column can hold: 999,999,999,999,999.99.
///
/// Money columns are `NUMERIC(19, 4)`, which leaves fifteen integer digits.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_569_325_055, 23_283_064, 0, false, 2);

/// Errors converting a major-unit amount to minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Amount carries more precision than the minor unit can represent.
    #[error("amount {0} has more than two decimal places")]
    SubMinorPrecision(Decimal),

    /// Amount does not fit into an `i64` count of minor units.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// Converts minor units (e.g. cents) to a major-unit decimal.
#[must_use]
pub fn from_minor_units(minor: MinorUnits) -> Decimal {
    Decimal::new(minor, MINOR_SCALE)
}

/// Converts a major-unit decimal to minor units.
///
/// # Errors
///
/// Returns an error if the amount has sub-cent precision or overflows.
pub fn to_minor_units(amount: Decimal) -> Result<MinorUnits, MoneyError> {
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::OutOfRange(amount))?;
    if scaled.fract() != Decimal::ZERO {
        return Err(MoneyError::SubMinorPrecision(amount));
    }
    i64::try_from(scaled.trunc()).map_err(|_| MoneyError::OutOfRange(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(0, dec!(0))]
    #[case(1, dec!(0.01))]
    #[case(50_000, dec!(500))]
    #[case(110_000, dec!(1100.00))]
    fn test_from_minor_units(#[case] minor: i64, #[case] major: Decimal) {
        assert_eq!(from_minor_units(minor), major);
    }

    #[rstest]
    #[case(dec!(1100), 110_000)]
    #[case(dec!(12.34), 1234)]
    #[case(dec!(0.10), 10)]
    fn test_to_minor_units(#[case] major: Decimal, #[case] minor: i64) {
        assert_eq!(to_minor_units(major).unwrap(), minor);
    }

    #[test]
    fn test_to_minor_units_rejects_fractional_cents() {
        assert_eq!(
            to_minor_units(dec!(10.005)),
            Err(MoneyError::SubMinorPrecision(dec!(10.005)))
        );
    }

    #[test]
    fn test_max_amount_fits_minor_units() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999999.99));
        assert_eq!(to_minor_units(MAX_AMOUNT).unwrap(), 99_999_999_999_999_999);
    }

    #[test]
    fn test_to_minor_units_out_of_range() {
        assert!(matches!(
            to_minor_units(Decimal::MAX),
            Err(MoneyError::OutOfRange(_))
        ));
    }
}
