//! Calculation models for the Benefit Calculation Engine.
//!
//! This module contains the [`Calculation`] type and the ledger rows it owns.
//! A calculation is rebuilt from scratch on every recalculation: its rows and
//! instalments are replaced as a whole, never patched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Employment, Instalment};
use crate::error::{EngineError, EngineResult};

/// The regulatory ceiling applied to salary costs, as a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateAidMaxPercentage {
    /// 50% of salary costs.
    Fifty,
    /// 70% of salary costs.
    Seventy,
    /// 100% of salary costs.
    Hundred,
}

impl StateAidMaxPercentage {
    /// Returns the ceiling as a fraction in `[0, 1]`.
    ///
    /// ```
    /// use benefit_engine::models::StateAidMaxPercentage;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(StateAidMaxPercentage::Seventy.fraction(), Decimal::new(70, 2));
    /// ```
    pub fn fraction(self) -> Decimal {
        match self {
            StateAidMaxPercentage::Fifty => Decimal::new(50, 2),
            StateAidMaxPercentage::Seventy => Decimal::new(70, 2),
            StateAidMaxPercentage::Hundred => Decimal::ONE,
        }
    }
}

/// The type of a calculation row.
///
/// Row types double as lookup keys: a formula reads the most recent earlier
/// row of the type it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowType {
    /// Free text row carrying no amount.
    Description,
    /// Text row naming a date range.
    DateRangeDescription,
    /// Monthly pay plus vacation money plus other expenses.
    SalaryCosts,
    /// State aid percentage of the salary costs.
    StateAidMaxMonthly,
    /// Monthly pay subsidy deducted from the benefit.
    PaySubsidyMonthly,
    /// Monthly training compensation deducted from the benefit.
    TrainingCompensationMonthly,
    /// Sum of the monthly deductions.
    DeductionsTotal,
    /// Monthly salary benefit after deductions and caps.
    SalaryBenefitMonthly,
    /// Salary benefit over one sub-range.
    SalaryBenefitSubTotal,
    /// Salary benefit over the whole period, single sub-range.
    SalaryBenefitTotal,
    /// Salary benefit over the whole period, summed from sub-totals.
    SalaryBenefitSumSubTotals,
    /// Flat monthly employee benefit.
    EmployeeBenefitMonthly,
    /// Employee benefit over the whole period.
    EmployeeBenefitTotal,
    /// Handler-entered monthly amount over the whole period.
    ManualOverrideTotal,
}

/// A single row of the calculation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRow {
    /// What the row computes.
    pub row_type: RowType,
    /// Position in the ledger, unique per calculation, starting from 1.
    pub ordering: u32,
    /// The computed amount; zero for description rows.
    pub amount: Decimal,
    /// Human-readable explanation.
    pub description: String,
    /// Start of the period the row covers, if any.
    pub start_date: Option<NaiveDate>,
    /// End of the period the row covers, if any.
    pub end_date: Option<NaiveDate>,
}

/// The benefit calculation of one application.
///
/// Pay, dates and the state aid percentage are handler-editable copies of the
/// applicant's values. `rows`, `instalments` and `calculated_benefit_amount`
/// are written only by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    /// Unique identifier.
    pub id: Uuid,
    /// Gross monthly pay.
    pub monthly_pay: Option<Decimal>,
    /// Monthly share of vacation money.
    pub vacation_money: Option<Decimal>,
    /// Other monthly employer expenses.
    pub other_expenses: Option<Decimal>,
    /// First day of the benefit.
    pub start_date: Option<NaiveDate>,
    /// Last day of the benefit (inclusive).
    pub end_date: Option<NaiveDate>,
    /// State aid ceiling; salary benefit only.
    pub state_aid_max_percentage: Option<StateAidMaxPercentage>,
    /// Handler-entered monthly amount replacing the computed benefit.
    pub override_monthly_benefit_amount: Option<Decimal>,
    /// Justification for the override.
    pub override_monthly_benefit_amount_comment: String,
    /// Carried through untouched.
    pub granted_as_de_minimis_aid: bool,
    /// Carried through untouched.
    pub target_group_check: bool,
    pub(crate) calculated_benefit_amount: Option<Decimal>,
    pub(crate) rows: Vec<CalculationRow>,
    pub(crate) instalments: Vec<Instalment>,
}

impl Calculation {
    /// Creates an uncalculated calculation from applicant-entered values.
    pub fn from_employment(employment: &Employment) -> Self {
        Self {
            id: Uuid::new_v4(),
            monthly_pay: employment.monthly_pay,
            vacation_money: employment.vacation_money,
            other_expenses: employment.other_expenses,
            start_date: employment.start_date,
            end_date: employment.end_date,
            state_aid_max_percentage: None,
            override_monthly_benefit_amount: None,
            override_monthly_benefit_amount_comment: String::new(),
            granted_as_de_minimis_aid: false,
            target_group_check: false,
            calculated_benefit_amount: None,
            rows: Vec::new(),
            instalments: Vec::new(),
        }
    }

    /// Copies the handler-editable inputs under a fresh id, without results.
    pub fn clone_inputs(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            calculated_benefit_amount: None,
            rows: Vec::new(),
            instalments: Vec::new(),
            ..self.clone()
        }
    }

    /// Returns the total benefit, or `None` if it could not be calculated.
    pub fn calculated_benefit_amount(&self) -> Option<Decimal> {
        self.calculated_benefit_amount
    }

    /// Returns the rows in ledger order.
    pub fn rows(&self) -> &[CalculationRow] {
        &self.rows
    }

    /// Returns the instalments ordered by instalment number.
    pub fn instalments(&self) -> &[Instalment] {
        &self.instalments
    }

    /// Monthly pay, vacation money and other expenses added up.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::CalculationError`] if the sum overflows.
    pub fn salary_costs(&self) -> EngineResult<Decimal> {
        [self.monthly_pay, self.vacation_money, self.other_expenses]
            .into_iter()
            .flatten()
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
            .ok_or_else(|| EngineError::CalculationError {
                message: "salary costs are out of range".to_string(),
            })
    }

    /// Returns the rows exported to the case-management system.
    ///
    /// - An overridden calculation exports its override total.
    /// - A calculation split into sub-ranges exports each sub-total and the sum.
    /// - Otherwise the monthly row(s) and the total are exported.
    pub fn ahjo_rows(&self) -> Vec<&CalculationRow> {
        let of_types = |types: &[RowType]| -> Vec<&CalculationRow> {
            self.rows
                .iter()
                .filter(|row| types.contains(&row.row_type))
                .collect()
        };

        let overrides = of_types(&[RowType::ManualOverrideTotal]);
        if !overrides.is_empty() {
            return overrides;
        }

        if self
            .rows
            .iter()
            .any(|row| row.row_type == RowType::SalaryBenefitSumSubTotals)
        {
            return of_types(&[
                RowType::SalaryBenefitSubTotal,
                RowType::SalaryBenefitSumSubTotals,
            ]);
        }

        of_types(&[
            RowType::SalaryBenefitMonthly,
            RowType::SalaryBenefitTotal,
            RowType::EmployeeBenefitMonthly,
            RowType::EmployeeBenefitTotal,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(row_type: RowType, ordering: u32, amount: &str) -> CalculationRow {
        CalculationRow {
            row_type,
            ordering,
            amount: dec(amount),
            description: String::new(),
            start_date: None,
            end_date: None,
        }
    }

    fn calculation_with_rows(rows: Vec<CalculationRow>) -> Calculation {
        let mut calculation = Calculation::from_employment(&Employment::default());
        calculation.rows = rows;
        calculation
    }

    #[test]
    fn test_salary_costs_treats_missing_values_as_zero() {
        let mut calculation = Calculation::from_employment(&Employment::default());
        calculation.monthly_pay = Some(dec("2000.00"));
        calculation.other_expenses = Some(dec("150.50"));

        assert_eq!(calculation.salary_costs().unwrap(), dec("2150.50"));
    }

    #[test]
    fn test_salary_costs_overflow_is_an_error() {
        let mut calculation = Calculation::from_employment(&Employment::default());
        calculation.monthly_pay = Some(Decimal::MAX);
        calculation.vacation_money = Some(dec("1"));

        assert!(matches!(
            calculation.salary_costs(),
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_ahjo_rows_single_range() {
        let calculation = calculation_with_rows(vec![
            row(RowType::SalaryCosts, 1, "3000"),
            row(RowType::StateAidMaxMonthly, 2, "1500"),
            row(RowType::SalaryBenefitMonthly, 3, "800"),
            row(RowType::SalaryBenefitSubTotal, 4, "4800"),
            row(RowType::SalaryBenefitTotal, 5, "4800"),
        ]);

        let types: Vec<RowType> = calculation.ahjo_rows().iter().map(|r| r.row_type).collect();
        assert_eq!(
            types,
            vec![RowType::SalaryBenefitMonthly, RowType::SalaryBenefitTotal]
        );
    }

    #[test]
    fn test_ahjo_rows_multiple_ranges() {
        let calculation = calculation_with_rows(vec![
            row(RowType::SalaryBenefitMonthly, 1, "800"),
            row(RowType::SalaryBenefitSubTotal, 2, "2400"),
            row(RowType::SalaryBenefitMonthly, 3, "500"),
            row(RowType::SalaryBenefitSubTotal, 4, "1500"),
            row(RowType::SalaryBenefitSumSubTotals, 5, "3900"),
        ]);

        let orderings: Vec<u32> = calculation.ahjo_rows().iter().map(|r| r.ordering).collect();
        assert_eq!(orderings, vec![2, 4, 5]);
    }

    #[test]
    fn test_ahjo_rows_manual_override() {
        let calculation = calculation_with_rows(vec![row(RowType::ManualOverrideTotal, 1, "6000")]);

        let rows = calculation.ahjo_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec("6000"));
    }

    #[test]
    fn test_clone_inputs_drops_results() {
        let mut calculation = calculation_with_rows(vec![row(RowType::SalaryCosts, 1, "1")]);
        calculation.calculated_benefit_amount = Some(dec("1"));
        calculation.state_aid_max_percentage = Some(StateAidMaxPercentage::Fifty);

        let clone = calculation.clone_inputs();
        assert_ne!(clone.id, calculation.id);
        assert!(clone.rows().is_empty());
        assert_eq!(clone.calculated_benefit_amount(), None);
        assert_eq!(
            clone.state_aid_max_percentage,
            Some(StateAidMaxPercentage::Fifty)
        );
    }

    #[test]
    fn test_row_type_serialization() {
        let json = serde_json::to_string(&RowType::SalaryBenefitSumSubTotals).unwrap();
        assert_eq!(json, "\"salary_benefit_sum_sub_totals\"");
    }
}
