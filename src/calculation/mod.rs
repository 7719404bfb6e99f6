//! Calculation logic for the Benefit Calculation Engine.
//!
//! This module contains the benefit calculation engine: currency rounding and
//! duration helpers, pay subsidy merging, partitioning of the benefit period
//! into sub-ranges, the row ledger with its formulas, the calculator strategies
//! for each benefit kind, instalment splitting and the recalculation lifecycle.

mod date_ranges;
mod employee_benefit;
mod engine;
mod instalments;
mod manual_override;
mod pay_subsidy_merge;
mod rounding;
mod rows;
mod salary_benefit;
mod strategy;

pub use date_ranges::{BenefitSubRange, split_benefit_period};
pub use employee_benefit::create_employee_benefit_rows;
pub use engine::{BenefitCalculator, CalculationOutcome, CalculationState};
pub use instalments::split_into_instalments;
pub use manual_override::create_manual_override_rows;
pub use pay_subsidy_merge::{MergedPaySubsidy, merge_pay_subsidies};
pub use rounding::{
    CURRENCY_DECIMAL_PLACES, duration_in_days, duration_in_months, duration_in_months_rounded,
    round_currency,
};
pub use rows::{RowContext, RowKind, RowLedger, pay_subsidy_monthly};
pub use salary_benefit::{can_calculate_salary_benefit, create_salary_benefit_rows};
pub use strategy::{CalculatorStrategy, select_strategy};
