//! Calculator strategy selection.
//!
//! The strategy is chosen afresh on every recalculation from the calculation's
//! override amount and the application's benefit kind; nothing is cached
//! between calls.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee_benefit::create_employee_benefit_rows;
use super::manual_override::create_manual_override_rows;
use super::rows::{RowContext, RowKind, RowLedger};
use super::salary_benefit::{can_calculate_salary_benefit, create_salary_benefit_rows};
use crate::error::EngineResult;
use crate::models::{Application, BenefitType, Calculation, RowType};

/// The calculator applied to a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorStrategy {
    /// Handler-entered monthly amount.
    ManualOverride,
    /// State aid share of salary costs minus deductions.
    SalaryBenefit,
    /// Flat monthly amount.
    EmployeeBenefit,
    /// Placeholder for benefit kinds the engine does not calculate.
    Dummy,
}

impl fmt::Display for CalculatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculatorStrategy::ManualOverride => "manual_override",
            CalculatorStrategy::SalaryBenefit => "salary_benefit",
            CalculatorStrategy::EmployeeBenefit => "employee_benefit",
            CalculatorStrategy::Dummy => "dummy",
        };
        f.write_str(name)
    }
}

/// Picks the calculator for a calculation.
///
/// A manual override takes precedence; otherwise the benefit kind decides, and
/// unset or unsupported kinds get the dummy calculator.
///
/// # Examples
///
/// ```
/// use benefit_engine::calculation::{CalculatorStrategy, select_strategy};
/// use benefit_engine::models::{Application, BenefitType, Calculation, Employment};
/// use rust_decimal::Decimal;
///
/// let application = Application::new(Some(BenefitType::SalaryBenefit), Employment::default());
/// let mut calculation = Calculation::from_employment(&application.employment);
/// assert_eq!(select_strategy(&application, &calculation), CalculatorStrategy::SalaryBenefit);
///
/// calculation.override_monthly_benefit_amount = Some(Decimal::from(700));
/// assert_eq!(select_strategy(&application, &calculation), CalculatorStrategy::ManualOverride);
/// ```
pub fn select_strategy(application: &Application, calculation: &Calculation) -> CalculatorStrategy {
    if calculation.override_monthly_benefit_amount.is_some() {
        return CalculatorStrategy::ManualOverride;
    }
    match application.benefit_type {
        Some(BenefitType::SalaryBenefit) => CalculatorStrategy::SalaryBenefit,
        Some(BenefitType::EmployeeBenefit) => CalculatorStrategy::EmployeeBenefit,
        Some(BenefitType::CommissionBenefit) | None => CalculatorStrategy::Dummy,
    }
}

/// Returns whether the calculation has an ordered start and end date.
pub(crate) fn has_benefit_period(calculation: &Calculation) -> bool {
    match (calculation.start_date, calculation.end_date) {
        (Some(start), Some(end)) => start <= end,
        _ => false,
    }
}

impl CalculatorStrategy {
    /// Returns whether every input this calculator needs is present.
    pub fn can_calculate(self, application: &Application, calculation: &Calculation) -> bool {
        match self {
            CalculatorStrategy::SalaryBenefit => {
                can_calculate_salary_benefit(application, calculation)
            }
            CalculatorStrategy::ManualOverride
            | CalculatorStrategy::EmployeeBenefit
            | CalculatorStrategy::Dummy => has_benefit_period(calculation),
        }
    }

    /// Appends this calculator's rows to `ledger`.
    pub fn create_rows(
        self,
        application: &Application,
        ctx: &RowContext<'_>,
        ledger: &mut RowLedger,
    ) -> EngineResult<()> {
        match self {
            CalculatorStrategy::ManualOverride => create_manual_override_rows(ctx, ledger),
            CalculatorStrategy::SalaryBenefit => {
                create_salary_benefit_rows(application, ctx, ledger)
            }
            CalculatorStrategy::EmployeeBenefit => create_employee_benefit_rows(ctx, ledger),
            CalculatorStrategy::Dummy => {
                ledger.append(
                    RowKind::Description(
                        "Calculation is not supported for this benefit type".to_string(),
                    ),
                    ctx,
                )?;
                Ok(())
            }
        }
    }

    /// Returns the row type holding this calculator's total, given its rows.
    ///
    /// `None` means the calculator has no total row and totals zero.
    pub fn total_row_type(self, ledger: &RowLedger) -> Option<RowType> {
        match self {
            CalculatorStrategy::ManualOverride => Some(RowType::ManualOverrideTotal),
            CalculatorStrategy::SalaryBenefit => {
                if ledger.count(RowType::SalaryBenefitSumSubTotals) > 0 {
                    Some(RowType::SalaryBenefitSumSubTotals)
                } else {
                    Some(RowType::SalaryBenefitTotal)
                }
            }
            CalculatorStrategy::EmployeeBenefit => Some(RowType::EmployeeBenefitTotal),
            CalculatorStrategy::Dummy => None,
        }
    }

    /// Reads the total benefit from the final rows.
    pub fn total(self, ledger: &RowLedger) -> EngineResult<Decimal> {
        match self.total_row_type(ledger) {
            Some(row_type) => ledger.amount(row_type),
            None => Ok(Decimal::ZERO),
        }
    }
}
