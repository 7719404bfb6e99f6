//! The recalculation lifecycle.
//!
//! [`BenefitCalculator::calculate`] rebuilds an application's calculation from
//! scratch: it selects a calculator, regenerates every row, reads the total and
//! splits it into instalments. All work happens on a copy that replaces the
//! stored calculation only once everything succeeded, so a failure leaves the
//! previous rows, instalments and total untouched.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::instalments::split_into_instalments;
use super::rows::{RowContext, RowLedger};
use super::strategy::{CalculatorStrategy, select_strategy};
use crate::config::BenefitConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::Application;

/// What a call to `calculate` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationState {
    /// The application's status does not allow recalculation; nothing changed.
    Skipped,
    /// Inputs are incomplete; the total was cleared and no rows were created.
    Incomplete,
    /// Rows, total and instalments were regenerated.
    Calculated,
}

/// Summary of a recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    /// What happened.
    pub state: CalculationState,
    /// The calculator used; `None` when skipped.
    pub strategy: Option<CalculatorStrategy>,
    /// The stored total benefit.
    pub calculated_benefit_amount: Option<Decimal>,
    /// Number of rows stored.
    pub row_count: usize,
    /// Number of instalments stored.
    pub instalment_count: usize,
}

/// Calculates benefits with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct BenefitCalculator {
    config: BenefitConfig,
}

impl BenefitCalculator {
    /// Creates a calculator with the given configuration.
    pub fn new(config: BenefitConfig) -> Self {
        Self { config }
    }

    /// Recalculates the application's benefit, dating instalments today.
    ///
    /// See [`BenefitCalculator::calculate_on`].
    pub fn calculate(
        &self,
        application: &mut Application,
        override_status: bool,
    ) -> EngineResult<CalculationOutcome> {
        self.calculate_on(application, override_status, Utc::now().date_naive())
    }

    /// Recalculates the application's benefit as of `today`.
    ///
    /// Runs only while the application is received, in handling or waiting for
    /// additional information, unless `override_status` is set. Existing rows
    /// and instalments are always discarded. When the selected calculator has
    /// the inputs it needs, new rows, a total and instalments are stored;
    /// otherwise the total is cleared and nothing else is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the application has no calculation, if an amount
    /// overflows, or if the rows break an engine invariant (a missing row
    /// dependency or a broken date partition). The stored calculation is left
    /// unchanged in every case.
    pub fn calculate_on(
        &self,
        application: &mut Application,
        override_status: bool,
        today: NaiveDate,
    ) -> EngineResult<CalculationOutcome> {
        let status = application.status();
        if !status.allows_calculation() && !override_status {
            debug!(
                application_id = %application.id,
                status = ?status,
                "Skipping calculation for application status"
            );
            return Ok(CalculationOutcome {
                state: CalculationState::Skipped,
                strategy: None,
                calculated_benefit_amount: application
                    .calculation
                    .as_ref()
                    .and_then(|c| c.calculated_benefit_amount()),
                row_count: 0,
                instalment_count: 0,
            });
        }

        let current = application
            .calculation
            .as_ref()
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("application {} has no calculation", application.id),
            })?;

        let mut working = current.clone();
        working.rows.clear();
        working.instalments.clear();

        let strategy = select_strategy(application, &working);
        let state = if strategy.can_calculate(application, &working) {
            let ctx = RowContext {
                calculation: &working,
                config: &self.config,
            };
            let mut ledger = RowLedger::new();
            if let Err(err) = strategy.create_rows(application, &ctx, &mut ledger) {
                warn!(
                    application_id = %application.id,
                    strategy = %strategy,
                    error = %err,
                    "Calculation aborted, keeping previous results"
                );
                return Err(err);
            }
            let total = strategy.total(&ledger)?;

            working.rows = ledger.into_rows();
            working.instalments = split_into_instalments(total, &self.config.instalments, today);
            working.calculated_benefit_amount = Some(total);
            CalculationState::Calculated
        } else {
            working.calculated_benefit_amount = None;
            CalculationState::Incomplete
        };

        let outcome = CalculationOutcome {
            state,
            strategy: Some(strategy),
            calculated_benefit_amount: working.calculated_benefit_amount,
            row_count: working.rows.len(),
            instalment_count: working.instalments.len(),
        };
        application.calculation = Some(working);

        info!(
            application_id = %application.id,
            strategy = %strategy,
            state = ?outcome.state,
            rows = outcome.row_count,
            instalments = outcome.instalment_count,
            total = ?outcome.calculated_benefit_amount,
            "Calculation completed"
        );
        Ok(outcome)
    }
}
