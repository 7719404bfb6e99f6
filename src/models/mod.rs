//! Core data models for the Benefit Calculation Engine.
//!
//! This module contains the application inputs read by the engine and the
//! calculation outputs it produces.

mod application;
mod calculation;
mod instalment;

pub use application::{
    Application, ApplicationStatus, BenefitType, Employment, PaySubsidy, PaySubsidyGranted,
    TrainingCompensation,
};
pub use calculation::{Calculation, CalculationRow, RowType, StateAidMaxPercentage};
pub use instalment::{Instalment, InstalmentStatus};
