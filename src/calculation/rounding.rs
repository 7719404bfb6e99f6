//! Currency rounding and benefit duration helpers.
//!
//! Every rounded amount in the engine goes through [`round_currency`], which
//! rounds half away from zero. Durations are expressed in months of
//! `365 / 12` days, counting both the first and the last day.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on stored row amounts.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to `decimal_places`, half away from zero.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("1.005").unwrap(), 2), Decimal::from_str("1.01").unwrap());
/// assert_eq!(round_currency(Decimal::from_str("799.5").unwrap(), 0), Decimal::from(800));
/// ```
pub fn round_currency(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the inclusive number of days between two dates.
pub fn duration_in_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

/// Returns the length of `[start_date, end_date]` in months, unrounded.
///
/// A month is `365 / 12` days and both ends of the range count.
pub fn duration_in_months(start_date: NaiveDate, end_date: NaiveDate) -> Decimal {
    Decimal::from(duration_in_days(start_date, end_date)) * Decimal::from(12) / Decimal::from(365)
}

/// Returns the length of `[start_date, end_date]` in months, to two decimals.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::duration_in_months_rounded;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
/// assert_eq!(duration_in_months_rounded(start, end), Decimal::from(12));
/// ```
pub fn duration_in_months_rounded(start_date: NaiveDate, end_date: NaiveDate) -> Decimal {
    round_currency(duration_in_months(start_date, end_date), CURRENCY_DECIMAL_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_half_rounds_away_from_zero() {
        assert_eq!(round_currency(dec("2.5"), 0), dec("3"));
        assert_eq!(round_currency(dec("3.5"), 0), dec("4"));
        assert_eq!(round_currency(dec("-2.5"), 0), dec("-3"));
        assert_eq!(round_currency(dec("10.125"), 2), dec("10.13"));
    }

    #[test]
    fn test_single_day_counts_as_one_day() {
        assert_eq!(duration_in_days(date(2024, 3, 1), date(2024, 3, 1)), 1);
    }

    #[test]
    fn test_six_months() {
        // 181 days * 12 / 365 = 5.9506...
        assert_eq!(
            duration_in_months_rounded(date(2023, 1, 1), date(2023, 6, 30)),
            dec("5.95")
        );
    }

    #[test]
    fn test_one_month_of_thirty_days() {
        // 30 * 12 / 365 = 0.98630...
        assert_eq!(
            duration_in_months_rounded(date(2024, 4, 1), date(2024, 4, 30)),
            dec("0.99")
        );
    }

    #[test]
    fn test_leap_year_exceeds_twelve_months() {
        // 366 * 12 / 365 = 12.0328...
        assert_eq!(
            duration_in_months_rounded(date(2024, 1, 1), date(2024, 12, 31)),
            dec("12.03")
        );
    }
}
