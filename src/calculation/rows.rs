//! Calculation row ledger and row formulas.
//!
//! Rows are appended in dependency order. Each row computes its amount when it
//! is appended and may read amounts of rows appended before it. A lookup by
//! [`RowType`] always returns the most recent matching row, so a formula inside
//! a sub-range picks up that sub-range's values rather than the first ones
//! emitted.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::pay_subsidy_merge::MergedPaySubsidy;
use super::rounding::{
    CURRENCY_DECIMAL_PLACES, duration_in_months_rounded, round_currency,
};
use crate::config::BenefitConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Calculation, CalculationRow, RowType, TrainingCompensation};

/// A row to append, with the parameters its formula needs.
#[derive(Debug, Clone)]
pub enum RowKind<'a> {
    /// Free text.
    Description(String),
    /// A labelled date range.
    DateRange {
        /// Label printed before the dates.
        label: &'static str,
        /// First day.
        start_date: NaiveDate,
        /// Last day.
        end_date: NaiveDate,
    },
    /// Monthly pay + vacation money + other expenses.
    SalaryCosts,
    /// State aid percent of the salary costs.
    StateAidMaxMonthly,
    /// Tiered monthly pay subsidy; zero when no subsidy is in effect.
    PaySubsidyMonthly(Option<&'a MergedPaySubsidy>),
    /// Monthly training compensation; zero when none is in effect.
    TrainingCompensationMonthly(Option<&'a TrainingCompensation>),
    /// Pay subsidy plus training compensation.
    DeductionsTotal,
    /// State aid maximum minus deductions, clamped to `[0, max_benefit]`.
    SalaryBenefitMonthly {
        /// Monthly ceiling.
        max_benefit: Decimal,
        /// Whether this sub-range emitted a deductions total to subtract.
        has_deductions: bool,
    },
    /// Monthly salary benefit over one sub-range.
    SalaryBenefitSubTotal {
        /// First day.
        start_date: NaiveDate,
        /// Last day.
        end_date: NaiveDate,
    },
    /// Monthly salary benefit over the whole period.
    SalaryBenefitTotal,
    /// Sum of every sub-total row.
    SalaryBenefitSumSubTotals,
    /// Flat monthly employee benefit.
    EmployeeBenefitMonthly,
    /// Employee benefit over the whole period.
    EmployeeBenefitTotal,
    /// Override amount over the whole period.
    ManualOverrideTotal,
}

/// Inputs shared by every row formula.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// The calculation being rebuilt.
    pub calculation: &'a Calculation,
    /// Engine configuration.
    pub config: &'a BenefitConfig,
}

impl RowContext<'_> {
    fn period(&self) -> EngineResult<(NaiveDate, NaiveDate)> {
        match (self.calculation.start_date, self.calculation.end_date) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(EngineError::CalculationError {
                message: "benefit period has no start or end date".to_string(),
            }),
        }
    }

    fn duration_in_months(&self) -> EngineResult<Decimal> {
        let (start, end) = self.period()?;
        Ok(duration_in_months_rounded(start, end))
    }

    fn monthly_pay(&self) -> Decimal {
        self.calculation.monthly_pay.unwrap_or(Decimal::ZERO)
    }
}

/// An append-only, ordered ledger of calculation rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLedger {
    rows: Vec<CalculationRow>,
}

/// A row's computed content, before it gets its ordering.
struct RowValue {
    row_type: RowType,
    amount: Decimal,
    description: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl RowValue {
    fn text(row_type: RowType, description: String) -> Self {
        Self::amount(row_type, Decimal::ZERO, description)
    }

    fn amount(row_type: RowType, amount: Decimal, description: String) -> Self {
        Self {
            row_type,
            amount,
            description,
            start_date: None,
            end_date: None,
        }
    }

    fn between(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }
}

impl RowLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes and appends a row, returning its amount.
    ///
    /// The row gets the next ordering number. Amounts are stored with two
    /// decimals; salary benefit monthly amounts are rounded to whole units.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::MissingRow`] if the formula depends on a row
    /// type that has not been appended yet, and with
    /// [`EngineError::CalculationError`] if an amount overflows.
    pub fn append(&mut self, kind: RowKind<'_>, ctx: &RowContext<'_>) -> EngineResult<Decimal> {
        let value = self.evaluate(kind, ctx)?;
        let amount = round_currency(value.amount, CURRENCY_DECIMAL_PLACES);
        let ordering = self.next_ordering();

        self.rows.push(CalculationRow {
            row_type: value.row_type,
            ordering,
            amount,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
        });
        Ok(amount)
    }

    /// Returns the amount of the most recent row of `row_type`.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::MissingRow`] when no such row exists.
    pub fn amount(&self, row_type: RowType) -> EngineResult<Decimal> {
        self.latest(row_type)
            .map(|row| row.amount)
            .ok_or(EngineError::MissingRow { row_type })
    }

    /// Returns the amount of the most recent row of `row_type`, or `default`.
    pub fn amount_or(&self, row_type: RowType, default: Decimal) -> Decimal {
        self.latest(row_type).map_or(default, |row| row.amount)
    }

    /// Sums every row of `row_type`.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::CalculationError`] if the sum overflows.
    pub fn sum(&self, row_type: RowType) -> EngineResult<Decimal> {
        self.rows
            .iter()
            .filter(|row| row.row_type == row_type)
            .try_fold(Decimal::ZERO, |total, row| add(total, row.amount))
    }

    /// Returns the number of rows of `row_type`.
    pub fn count(&self, row_type: RowType) -> usize {
        self.rows.iter().filter(|row| row.row_type == row_type).count()
    }

    /// Returns the rows in ordering order.
    pub fn rows(&self) -> &[CalculationRow] {
        &self.rows
    }

    /// Consumes the ledger, returning its rows.
    pub fn into_rows(self) -> Vec<CalculationRow> {
        self.rows
    }

    fn latest(&self, row_type: RowType) -> Option<&CalculationRow> {
        self.rows.iter().rev().find(|row| row.row_type == row_type)
    }

    fn next_ordering(&self) -> u32 {
        self.rows.last().map_or(1, |row| row.ordering + 1)
    }

    fn evaluate(&self, kind: RowKind<'_>, ctx: &RowContext<'_>) -> EngineResult<RowValue> {
        let zero = Decimal::ZERO;
        let value = match kind {
            RowKind::Description(text) => RowValue::text(RowType::Description, text),
            RowKind::DateRange {
                label,
                start_date,
                end_date,
            } => RowValue::text(
                RowType::DateRangeDescription,
                format!("{} {} - {}", label, start_date, end_date),
            )
            .between(start_date, end_date),
            RowKind::SalaryCosts => RowValue::amount(
                RowType::SalaryCosts,
                ctx.calculation.salary_costs()?,
                "Salary costs per month".to_string(),
            ),
            RowKind::StateAidMaxMonthly => {
                let percentage = ctx.calculation.state_aid_max_percentage.ok_or_else(|| {
                    EngineError::CalculationError {
                        message: "state aid maximum percentage is not set".to_string(),
                    }
                })?;
                let salary_costs = self.amount(RowType::SalaryCosts)?;
                RowValue::amount(
                    RowType::StateAidMaxMonthly,
                    multiply(percentage.fraction(), salary_costs)?,
                    "Maximum state aid per month".to_string(),
                )
            }
            RowKind::PaySubsidyMonthly(pay_subsidy) => {
                let amount = match pay_subsidy {
                    Some(subsidy) => pay_subsidy_monthly(subsidy, ctx.monthly_pay(), ctx.config)?,
                    None => zero,
                };
                RowValue::amount(
                    RowType::PaySubsidyMonthly,
                    amount,
                    "Pay subsidy per month".to_string(),
                )
            }
            RowKind::TrainingCompensationMonthly(training) => RowValue::amount(
                RowType::TrainingCompensationMonthly,
                training.map_or(zero, |t| t.monthly_amount),
                "Training compensation per month".to_string(),
            ),
            RowKind::DeductionsTotal => RowValue::amount(
                RowType::DeductionsTotal,
                add(
                    self.amount_or(RowType::PaySubsidyMonthly, zero),
                    self.amount_or(RowType::TrainingCompensationMonthly, zero),
                )?,
                "Deductions per month in total".to_string(),
            ),
            RowKind::SalaryBenefitMonthly {
                max_benefit,
                has_deductions,
            } => {
                let state_aid_max = self.amount(RowType::StateAidMaxMonthly)?;
                let deductions = if has_deductions {
                    self.amount(RowType::DeductionsTotal)?
                } else {
                    zero
                };
                let remaining = state_aid_max.checked_sub(deductions).ok_or_else(overflow)?;
                RowValue::amount(
                    RowType::SalaryBenefitMonthly,
                    round_currency(remaining.min(max_benefit).max(zero), 0),
                    "Benefit per month".to_string(),
                )
            }
            RowKind::SalaryBenefitSubTotal {
                start_date,
                end_date,
            } => {
                let monthly = self.amount(RowType::SalaryBenefitMonthly)?;
                let months = duration_in_months_rounded(start_date, end_date);
                RowValue::amount(
                    RowType::SalaryBenefitSubTotal,
                    multiply(monthly, months)?,
                    format!("Benefit for {} months", months),
                )
                .between(start_date, end_date)
            }
            RowKind::SalaryBenefitTotal => {
                let (start, end) = ctx.period()?;
                let monthly = self.amount(RowType::SalaryBenefitMonthly)?;
                RowValue::amount(
                    RowType::SalaryBenefitTotal,
                    multiply(monthly, ctx.duration_in_months()?)?,
                    "Benefit in total".to_string(),
                )
                .between(start, end)
            }
            RowKind::SalaryBenefitSumSubTotals => {
                let (start, end) = ctx.period()?;
                if self.count(RowType::SalaryBenefitSubTotal) == 0 {
                    return Err(EngineError::MissingRow {
                        row_type: RowType::SalaryBenefitSubTotal,
                    });
                }
                RowValue::amount(
                    RowType::SalaryBenefitSumSubTotals,
                    self.sum(RowType::SalaryBenefitSubTotal)?,
                    "Benefit in total".to_string(),
                )
                .between(start, end)
            }
            RowKind::EmployeeBenefitMonthly => RowValue::amount(
                RowType::EmployeeBenefitMonthly,
                ctx.config.benefit.employee_benefit_monthly,
                "Employee benefit per month".to_string(),
            ),
            RowKind::EmployeeBenefitTotal => {
                let (start, end) = ctx.period()?;
                let monthly = self.amount(RowType::EmployeeBenefitMonthly)?;
                RowValue::amount(
                    RowType::EmployeeBenefitTotal,
                    multiply(monthly, ctx.duration_in_months()?)?,
                    "Employee benefit in total".to_string(),
                )
                .between(start, end)
            }
            RowKind::ManualOverrideTotal => {
                let (start, end) = ctx.period()?;
                let monthly = ctx.calculation.override_monthly_benefit_amount.ok_or_else(|| {
                    EngineError::CalculationError {
                        message: "manual override amount is not set".to_string(),
                    }
                })?;
                RowValue::amount(
                    RowType::ManualOverrideTotal,
                    multiply(monthly, ctx.duration_in_months()?)?,
                    format!("Benefit in total, {} per month", monthly),
                )
                .between(start, end)
            }
        };
        Ok(value)
    }
}

fn overflow() -> EngineError {
    EngineError::CalculationError {
        message: "amount is out of range".to_string(),
    }
}

fn multiply(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(overflow)
}

fn add(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(overflow)
}

/// Computes the monthly pay subsidy deducted from the benefit.
///
/// A 100% subsidy is based on the full-time equivalent of the pay, scaled by
/// the full-time work fraction and the employer cost multiplier. Other subsidies
/// are their percent of the pay. Both are capped by the tier maximum.
///
/// # Errors
///
/// Fails with [`EngineError::CalculationError`] if a 100% subsidy has a zero
/// work time or the amount overflows.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::{MergedPaySubsidy, pay_subsidy_monthly};
/// use benefit_engine::config::BenefitConfig;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let subsidy = MergedPaySubsidy {
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     pay_subsidy_percent: 50,
///     work_time_percent: Decimal::from(65),
///     disability_or_illness: false,
/// };
///
/// let amount = pay_subsidy_monthly(&subsidy, Decimal::from(2000), &BenefitConfig::default()).unwrap();
/// assert_eq!(amount, Decimal::from(1000));
/// ```
pub fn pay_subsidy_monthly(
    subsidy: &MergedPaySubsidy,
    monthly_pay: Decimal,
    config: &BenefitConfig,
) -> EngineResult<Decimal> {
    let hundred = Decimal::ONE_HUNDRED;
    let settings = &config.pay_subsidy;
    let max_subsidy = settings.max_for_percent(subsidy.pay_subsidy_percent);

    let amount = if subsidy.pay_subsidy_percent == 100 {
        let work_fraction = subsidy.work_time_percent / hundred;
        let full_time_cost = monthly_pay.checked_div(work_fraction).ok_or_else(|| {
            EngineError::CalculationError {
                message: format!(
                    "pay subsidy work time percent {} cannot scale pay to full time",
                    subsidy.work_time_percent
                ),
            }
        })?;
        multiply(
            multiply(full_time_cost, settings.full_time_work_fraction)?,
            settings.employer_cost_multiplier,
        )?
    } else {
        multiply(Decimal::from(subsidy.pay_subsidy_percent) / hundred, monthly_pay)?
    };

    Ok(amount.min(max_subsidy))
}
