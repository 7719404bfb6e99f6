//! Employee benefit calculation.
//!
//! The employee benefit is a flat monthly amount paid over the benefit period.

use super::rows::{RowContext, RowKind, RowLedger};
use crate::error::EngineResult;

/// Appends the employee benefit rows: the monthly amount and the total.
pub fn create_employee_benefit_rows(ctx: &RowContext<'_>, ledger: &mut RowLedger) -> EngineResult<()> {
    ledger.append(RowKind::EmployeeBenefitMonthly, ctx)?;
    ledger.append(RowKind::EmployeeBenefitTotal, ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenefitConfig;
    use crate::models::{Calculation, Employment, RowType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_flat_amount_over_period() {
        let calculation = Calculation::from_employment(&Employment {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2023, 6, 30),
            ..Employment::default()
        });
        let config = BenefitConfig::default();
        let ctx = RowContext {
            calculation: &calculation,
            config: &config,
        };
        let mut ledger = RowLedger::new();

        create_employee_benefit_rows(&ctx, &mut ledger).unwrap();

        assert_eq!(ledger.amount(RowType::EmployeeBenefitMonthly).unwrap(), dec("500"));
        // 181 days -> 5.95 months
        assert_eq!(ledger.amount(RowType::EmployeeBenefitTotal).unwrap(), dec("2975"));
    }
}
