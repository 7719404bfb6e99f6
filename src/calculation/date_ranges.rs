//! Benefit period partitioning functionality.
//!
//! The benefit amount depends on which pay subsidy and training compensation
//! are in effect, so the benefit period is split into maximal sub-ranges over
//! which neither changes. Each sub-range is then calculated on its own.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::pay_subsidy_merge::MergedPaySubsidy;
use crate::error::{EngineError, EngineResult};
use crate::models::TrainingCompensation;

/// A maximal part of the benefit period with constant deductions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenefitSubRange<'a> {
    /// First day of the sub-range.
    pub start_date: NaiveDate,
    /// Last day of the sub-range (inclusive).
    pub end_date: NaiveDate,
    /// The pay subsidy in effect, if any.
    pub pay_subsidy: Option<&'a MergedPaySubsidy>,
    /// The training compensation in effect, if any.
    pub training_compensation: Option<&'a TrainingCompensation>,
}

/// Splits `[start_date, end_date]` into sub-ranges of constant deductions.
///
/// Sub-ranges start at the benefit start date and at every subsidy or training
/// compensation start (or day after an end) that falls strictly inside the
/// period. An item is in effect for a sub-range when its own period contains
/// the sub-range's first day; when several qualify, the first one listed wins.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPartition`] if `end_date` precedes
/// `start_date`, or if the sub-ranges fail to tile the period exactly. Both
/// indicate a defect in the caller or in this function, not bad user input.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::{MergedPaySubsidy, split_benefit_period};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let subsidy = MergedPaySubsidy {
///     start_date: d(3, 1),
///     end_date: d(12, 31),
///     pay_subsidy_percent: 50,
///     work_time_percent: Decimal::from(65),
///     disability_or_illness: false,
/// };
/// let subsidies = [subsidy];
///
/// let ranges = split_benefit_period(d(1, 1), d(6, 30), &subsidies, &[]).unwrap();
/// assert_eq!(ranges.len(), 2);
/// assert_eq!(ranges[0].end_date, d(2, 29));
/// assert!(ranges[0].pay_subsidy.is_none());
/// assert_eq!(ranges[1].start_date, d(3, 1));
/// assert!(ranges[1].pay_subsidy.is_some());
/// ```
pub fn split_benefit_period<'a>(
    start_date: NaiveDate,
    end_date: NaiveDate,
    pay_subsidies: &'a [MergedPaySubsidy],
    training_compensations: &'a [TrainingCompensation],
) -> EngineResult<Vec<BenefitSubRange<'a>>> {
    if end_date < start_date {
        return Err(partition_error(
            start_date,
            end_date,
            "end date precedes start date".to_string(),
        ));
    }
    let period_end_exclusive = day_after(end_date, start_date, end_date)?;

    let mut change_days = BTreeSet::new();
    change_days.insert(start_date);
    change_days.insert(period_end_exclusive);

    let item_bounds = pay_subsidies
        .iter()
        .map(|s| (s.start_date, s.end_date))
        .chain(
            training_compensations
                .iter()
                .map(|t| (t.start_date, t.end_date)),
        );
    for (item_start, item_end) in item_bounds {
        for boundary in [Some(item_start), item_end.succ_opt()].into_iter().flatten() {
            if start_date < boundary && boundary < period_end_exclusive {
                change_days.insert(boundary);
            }
        }
    }

    let change_days: Vec<NaiveDate> = change_days.into_iter().collect();
    let mut sub_ranges = Vec::with_capacity(change_days.len() - 1);
    for pair in change_days.windows(2) {
        let (range_start, next_start) = (pair[0], pair[1]);
        let range_end = next_start
            .pred_opt()
            .ok_or_else(|| partition_error(start_date, end_date, "date underflow".to_string()))?;

        sub_ranges.push(BenefitSubRange {
            start_date: range_start,
            end_date: range_end,
            pay_subsidy: pay_subsidies.iter().find(|s| s.contains(range_start)),
            training_compensation: training_compensations
                .iter()
                .find(|t| t.start_date <= range_start && range_start <= t.end_date),
        });
    }

    verify_tiling(&sub_ranges, start_date, end_date)?;
    Ok(sub_ranges)
}

fn verify_tiling(
    sub_ranges: &[BenefitSubRange<'_>],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> EngineResult<()> {
    let (first, last) = match (sub_ranges.first(), sub_ranges.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(partition_error(
                start_date,
                end_date,
                "no sub-ranges produced".to_string(),
            ));
        }
    };

    if first.start_date != start_date {
        return Err(partition_error(
            start_date,
            end_date,
            format!("first sub-range starts on {}", first.start_date),
        ));
    }
    if last.end_date != end_date {
        return Err(partition_error(
            start_date,
            end_date,
            format!("last sub-range ends on {}", last.end_date),
        ));
    }
    for pair in sub_ranges.windows(2) {
        if pair[0].end_date.succ_opt() != Some(pair[1].start_date) {
            return Err(partition_error(
                start_date,
                end_date,
                format!("gap or overlap after {}", pair[0].end_date),
            ));
        }
    }
    Ok(())
}

fn day_after(date: NaiveDate, start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| partition_error(start_date, end_date, "date overflow".to_string()))
}

fn partition_error(start: NaiveDate, end: NaiveDate, message: String) -> EngineError {
    EngineError::InvalidPartition {
        start,
        end,
        message,
    }
}
