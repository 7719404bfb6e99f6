//! Instalment splitting functionality.
//!
//! Totals up to the configured threshold are paid at once. Larger totals are
//! paid as a fixed first instalment now and the remainder later, pending
//! review.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::config::InstalmentConfig;
use crate::models::{Instalment, InstalmentStatus};

/// Splits a total benefit into one or two instalments.
///
/// The second amount is the total minus the first, so the instalments always
/// add up to `total` exactly.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::split_into_instalments;
/// use benefit_engine::config::BenefitConfig;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = BenefitConfig::default();
/// let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
///
/// let single = split_into_instalments(Decimal::from(30000), &config.instalments, today);
/// assert_eq!(single.len(), 1);
///
/// let split = split_into_instalments(Decimal::from(30001), &config.instalments, today);
/// assert_eq!(split[0].amount, Decimal::from(9000));
/// assert_eq!(split[1].amount, Decimal::from(21001));
/// ```
pub fn split_into_instalments(
    total: Decimal,
    config: &InstalmentConfig,
    today: NaiveDate,
) -> Vec<Instalment> {
    if total <= config.threshold {
        return vec![Instalment {
            instalment_number: 1,
            amount: total,
            due_date: today,
            status: InstalmentStatus::Accepted,
        }];
    }

    let first_amount = config.first_instalment_limit;
    vec![
        Instalment {
            instalment_number: 1,
            amount: first_amount,
            due_date: today,
            status: InstalmentStatus::Accepted,
        },
        Instalment {
            instalment_number: 2,
            amount: total - first_amount,
            due_date: today + Duration::days(config.second_instalment_delay_days),
            status: InstalmentStatus::Waiting,
        },
    ]
}
