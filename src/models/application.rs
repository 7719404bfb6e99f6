//! Application input models.
//!
//! This module contains the [`Application`] type and the records the engine
//! reads from it: pay subsidy decisions and training compensations. The engine
//! never mutates these inputs; it only owns the [`Calculation`] hanging off
//! the application.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Calculation;
use crate::error::{EngineError, EngineResult};

/// The processing status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Still being filled in by the applicant.
    Draft,
    /// Submitted and waiting for a handler.
    Received,
    /// Being processed by a handler.
    Handling,
    /// Returned to the applicant for more information.
    AdditionalInformationNeeded,
    /// Benefit granted.
    Accepted,
    /// Benefit denied.
    Rejected,
    /// Withdrawn.
    Cancelled,
    /// Closed and archived.
    Archival,
}

impl ApplicationStatus {
    /// Returns whether the benefit may be recalculated in this status.
    ///
    /// ```
    /// use benefit_engine::models::ApplicationStatus;
    ///
    /// assert!(ApplicationStatus::Handling.allows_calculation());
    /// assert!(!ApplicationStatus::Accepted.allows_calculation());
    /// ```
    pub fn allows_calculation(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Received
                | ApplicationStatus::Handling
                | ApplicationStatus::AdditionalInformationNeeded
        )
    }

    fn is_final(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Cancelled | ApplicationStatus::Archival
        )
    }
}

/// The kind of benefit applied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    /// Benefit derived from the employee's salary costs.
    SalaryBenefit,
    /// Flat monthly benefit.
    EmployeeBenefit,
    /// Commission-based benefit; not calculated by this engine.
    CommissionBenefit,
}

/// Whether a pay subsidy was granted for the employment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaySubsidyGranted {
    /// A regular pay subsidy was granted.
    Granted,
    /// A pay subsidy for aged employees was granted.
    GrantedAged,
    /// No pay subsidy was granted.
    NotGranted,
}

/// A handler-recorded pay subsidy decision.
///
/// Dates stay empty until the handler fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaySubsidy {
    /// First day the subsidy is paid.
    pub start_date: Option<NaiveDate>,
    /// Last day the subsidy is paid (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Subsidy percent (50, 70 or 100).
    pub pay_subsidy_percent: u32,
    /// Employee work time as a percent of full time.
    pub work_time_percent: Option<Decimal>,
    /// Whether the subsidy is granted on disability or illness grounds.
    pub disability_or_illness: bool,
}

impl PaySubsidy {
    /// Creates a dated subsidy with the default work time.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, pay_subsidy_percent: u32) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            pay_subsidy_percent,
            work_time_percent: None,
            disability_or_illness: false,
        }
    }

    /// Returns whether both dates are filled in.
    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }
}

/// Compensation paid to the employer for training the employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCompensation {
    /// First day of the training period.
    pub start_date: NaiveDate,
    /// Last day of the training period (inclusive).
    pub end_date: NaiveDate,
    /// Compensation per month.
    pub monthly_amount: Decimal,
}

/// Employment facts entered by the applicant.
///
/// The [`Calculation`] copies these once when the application is first
/// submitted; handlers then edit the copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    /// Gross monthly pay.
    pub monthly_pay: Option<Decimal>,
    /// Monthly share of vacation money.
    pub vacation_money: Option<Decimal>,
    /// Other monthly employer expenses.
    pub other_expenses: Option<Decimal>,
    /// Requested benefit start date.
    pub start_date: Option<NaiveDate>,
    /// Requested benefit end date.
    pub end_date: Option<NaiveDate>,
}

/// A benefit application as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Unique identifier.
    pub id: Uuid,
    /// Current processing status.
    status: ApplicationStatus,
    /// Selected benefit kind, if any.
    pub benefit_type: Option<BenefitType>,
    /// Pay subsidy granted decision, if recorded.
    pub pay_subsidy_granted: Option<PaySubsidyGranted>,
    /// Applicant-entered employment facts.
    pub employment: Employment,
    /// Up to two pay subsidy decisions, in handler order.
    pub pay_subsidies: Vec<PaySubsidy>,
    /// Training compensations.
    pub training_compensations: Vec<TrainingCompensation>,
    /// The benefit calculation, created when the application leaves draft.
    pub calculation: Option<Calculation>,
}

impl Application {
    /// Creates a new draft application.
    pub fn new(benefit_type: Option<BenefitType>, employment: Employment) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: ApplicationStatus::Draft,
            benefit_type,
            pay_subsidy_granted: None,
            employment,
            pay_subsidies: Vec::new(),
            training_compensations: Vec::new(),
            calculation: None,
        }
    }

    /// Returns the current status.
    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Moves the application to a new status.
    ///
    /// The first move out of draft creates the application's [`Calculation`].
    /// Returning to draft, or leaving a final status, is rejected.
    pub fn set_status(&mut self, status: ApplicationStatus) -> EngineResult<()> {
        let from = self.status;
        if from == status {
            return Ok(());
        }
        if status == ApplicationStatus::Draft || from.is_final() {
            return Err(EngineError::InvalidStatusTransition { from, to: status });
        }

        if self.calculation.is_none() {
            self.calculation = Some(Calculation::from_employment(&self.employment));
        }
        self.status = status;
        Ok(())
    }

    /// Returns whether the employment is subsidised.
    ///
    /// An application counts as subsidised when a pay subsidy was granted or when
    /// any pay subsidy decision has been recorded.
    pub fn is_subsidized(&self) -> bool {
        matches!(
            self.pay_subsidy_granted,
            Some(PaySubsidyGranted::Granted | PaySubsidyGranted::GrantedAged)
        ) || !self.pay_subsidies.is_empty()
    }

    /// Duplicates the application for renewed handling.
    ///
    /// The clone gets a fresh id, keeps the status, and carries over the
    /// handler-edited calculation inputs without rows or instalments. Callers
    /// recalculate it with `override_status` set.
    pub fn clone_for_handling(&self) -> Self {
        let calculation = self.calculation.as_ref().map(Calculation::clone_inputs);
        Self {
            id: Uuid::new_v4(),
            calculation,
            ..self.clone()
        }
    }
}
