//! Pay subsidy merging functionality.
//!
//! Handlers often record one pay subsidy decision per funding period even when
//! the terms do not change. This module collapses such decisions into the
//! smallest set of non-overlapping periods so the date-range partitioner does
//! not split the benefit where nothing changes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::PaySubsidy;

/// A pay subsidy with both dates filled in and its effective work time.
///
/// Produced by [`merge_pay_subsidies`]; the inputs are never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedPaySubsidy {
    /// First day of the merged period.
    pub start_date: NaiveDate,
    /// Last day of the merged period (inclusive).
    pub end_date: NaiveDate,
    /// Subsidy percent (50, 70 or 100).
    pub pay_subsidy_percent: u32,
    /// Work time percent, with the default substituted for missing values.
    pub work_time_percent: Decimal,
    /// Disability or illness grounds.
    pub disability_or_illness: bool,
}

impl MergedPaySubsidy {
    /// Returns whether `date` falls inside the subsidy period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    fn has_same_terms(&self, other: &MergedPaySubsidy) -> bool {
        self.pay_subsidy_percent == other.pay_subsidy_percent
            && self.work_time_percent == other.work_time_percent
            && self.disability_or_illness == other.disability_or_illness
    }

    /// Returns whether `next` starts no later than the day after this one ends.
    fn touches(&self, next: &MergedPaySubsidy) -> bool {
        match self.end_date.succ_opt() {
            Some(day_after) => next.start_date <= day_after,
            None => true,
        }
    }
}

impl From<&MergedPaySubsidy> for PaySubsidy {
    fn from(merged: &MergedPaySubsidy) -> Self {
        PaySubsidy {
            start_date: Some(merged.start_date),
            end_date: Some(merged.end_date),
            pay_subsidy_percent: merged.pay_subsidy_percent,
            work_time_percent: Some(merged.work_time_percent),
            disability_or_illness: merged.disability_or_illness,
        }
    }
}

/// Merges pay subsidies with identical terms whose periods overlap or adjoin.
///
/// Two subsidies are merged when they share the subsidy percent, the effective
/// work time percent and the disability flag, and the second one starts on or
/// before the day after the first one ends. Subsidies without both dates
/// cannot be placed on the calendar and are left out.
///
/// The output is sorted by start date and never longer than the input.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::merge_pay_subsidies;
/// use benefit_engine::models::PaySubsidy;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let subsidies = vec![
///     PaySubsidy::new(d(4, 1), d(6, 30), 50),
///     PaySubsidy::new(d(1, 1), d(3, 31), 50),
/// ];
///
/// let merged = merge_pay_subsidies(&subsidies, Decimal::from(65));
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].start_date, d(1, 1));
/// assert_eq!(merged[0].end_date, d(6, 30));
/// ```
pub fn merge_pay_subsidies(
    pay_subsidies: &[PaySubsidy],
    default_work_time_percent: Decimal,
) -> Vec<MergedPaySubsidy> {
    let mut candidates: Vec<MergedPaySubsidy> = pay_subsidies
        .iter()
        .filter_map(|subsidy| {
            Some(MergedPaySubsidy {
                start_date: subsidy.start_date?,
                end_date: subsidy.end_date?,
                pay_subsidy_percent: subsidy.pay_subsidy_percent,
                work_time_percent: subsidy
                    .work_time_percent
                    .unwrap_or(default_work_time_percent),
                disability_or_illness: subsidy.disability_or_illness,
            })
        })
        .collect();

    // Sort on every field so equal start dates do not depend on input order.
    candidates.sort_by(|a, b| {
        (a.start_date, a.end_date, a.pay_subsidy_percent)
            .cmp(&(b.start_date, b.end_date, b.pay_subsidy_percent))
            .then_with(|| a.work_time_percent.cmp(&b.work_time_percent))
            .then_with(|| a.disability_or_illness.cmp(&b.disability_or_illness))
    });

    let mut merged: Vec<MergedPaySubsidy> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged.last_mut() {
            Some(current) if current.has_same_terms(&candidate) && current.touches(&candidate) => {
                current.end_date = current.end_date.max(candidate.end_date);
            }
            _ => merged.push(candidate),
        }
    }

    merged
}
