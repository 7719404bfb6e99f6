//! Salary benefit calculation.
//!
//! The salary benefit is the state aid share of the employee's salary costs,
//! reduced by any pay subsidy and training compensation and capped per month.
//! Because the deductions change over time, the benefit is computed per
//! sub-range of constant deductions and then added up.

use rust_decimal::Decimal;
use tracing::debug;

use super::date_ranges::{BenefitSubRange, split_benefit_period};
use super::pay_subsidy_merge::merge_pay_subsidies;
use super::rows::{RowContext, RowKind, RowLedger};
use crate::error::{EngineError, EngineResult};
use crate::models::{Application, Calculation};

const SUB_RANGE_LABEL: &str = "For the period";
const WHOLE_PERIOD_LABEL: &str = "For the whole period";

/// Returns whether a salary benefit can be calculated.
///
/// Besides the benefit period this needs the state aid percentage and both
/// dates on every pay subsidy.
pub fn can_calculate_salary_benefit(application: &Application, calculation: &Calculation) -> bool {
    super::strategy::has_benefit_period(calculation)
        && calculation.state_aid_max_percentage.is_some()
        && application.pay_subsidies.iter().all(|s| s.has_dates())
}

/// Appends the salary benefit rows to `ledger`.
///
/// Emits the salary costs and state aid maximum once, then for each sub-range
/// an optional date range label, the deductions (when a pay subsidy or a
/// non-zero training compensation is in effect), the monthly benefit and the
/// sub-total. A single sub-range ends in a total row; several end in a row
/// summing the sub-totals.
pub fn create_salary_benefit_rows(
    application: &Application,
    ctx: &RowContext<'_>,
    ledger: &mut RowLedger,
) -> EngineResult<()> {
    let calculation = ctx.calculation;
    let (start_date, end_date) = match (calculation.start_date, calculation.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(EngineError::CalculationError {
                message: "salary benefit requires a benefit period".to_string(),
            });
        }
    };

    let pay_subsidies = merge_pay_subsidies(
        &application.pay_subsidies,
        ctx.config.pay_subsidy.default_work_time_percent,
    );
    let sub_ranges = split_benefit_period(
        start_date,
        end_date,
        &pay_subsidies,
        &application.training_compensations,
    )?;
    let max_benefit = ctx.config.max_monthly_benefit(application.is_subsidized());

    debug!(
        application_id = %application.id,
        merged_pay_subsidies = pay_subsidies.len(),
        sub_ranges = sub_ranges.len(),
        max_benefit = %max_benefit,
        "Creating salary benefit rows"
    );

    ledger.append(RowKind::SalaryCosts, ctx)?;
    ledger.append(RowKind::StateAidMaxMonthly, ctx)?;

    let split = sub_ranges.len() > 1;
    for sub_range in &sub_ranges {
        if split {
            ledger.append(
                RowKind::DateRange {
                    label: SUB_RANGE_LABEL,
                    start_date: sub_range.start_date,
                    end_date: sub_range.end_date,
                },
                ctx,
            )?;
        }

        let has_deductions = create_deduction_rows(sub_range, ctx, ledger)?;
        ledger.append(
            RowKind::SalaryBenefitMonthly {
                max_benefit,
                has_deductions,
            },
            ctx,
        )?;
        ledger.append(
            RowKind::SalaryBenefitSubTotal {
                start_date: sub_range.start_date,
                end_date: sub_range.end_date,
            },
            ctx,
        )?;
    }

    if split {
        ledger.append(
            RowKind::DateRange {
                label: WHOLE_PERIOD_LABEL,
                start_date,
                end_date,
            },
            ctx,
        )?;
        ledger.append(RowKind::SalaryBenefitSumSubTotals, ctx)?;
    } else {
        ledger.append(RowKind::SalaryBenefitTotal, ctx)?;
    }
    Ok(())
}

/// Emits the deduction block for a sub-range, returning whether it did.
fn create_deduction_rows(
    sub_range: &BenefitSubRange<'_>,
    ctx: &RowContext<'_>,
    ledger: &mut RowLedger,
) -> EngineResult<bool> {
    let training = sub_range
        .training_compensation
        .filter(|t| t.monthly_amount != Decimal::ZERO);
    if sub_range.pay_subsidy.is_none() && training.is_none() {
        return Ok(false);
    }

    ledger.append(
        RowKind::Description("Deductible compensations per month".to_string()),
        ctx,
    )?;
    ledger.append(RowKind::PaySubsidyMonthly(sub_range.pay_subsidy), ctx)?;
    ledger.append(RowKind::TrainingCompensationMonthly(training), ctx)?;
    ledger.append(RowKind::DeductionsTotal, ctx)?;
    Ok(true)
}
