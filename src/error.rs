//! Error types for the Benefit Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while calculating a benefit.
//!
//! Missing input data is deliberately absent from this list: an application
//! that lacks dates or a state aid percentage is calculated to a null total,
//! not rejected.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ApplicationStatus, RowType};

/// The main error type for the Benefit Calculation Engine.
///
/// # Example
///
/// ```
/// use benefit_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/benefit.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/benefit.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds a value the engine cannot work with.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending configuration key.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A row formula asked for an earlier row that was never emitted.
    #[error("No calculation row of type {row_type:?} precedes the requesting row")]
    MissingRow {
        /// The row type that was looked up.
        row_type: RowType,
    },

    /// The date-range partition does not tile the benefit period.
    #[error("Sub-ranges do not cover {start}..={end}: {message}")]
    InvalidPartition {
        /// Start of the benefit period.
        start: NaiveDate,
        /// End of the benefit period.
        end: NaiveDate,
        /// A description of the broken invariant.
        message: String,
    },

    /// The application's status does not permit the requested change.
    #[error("Cannot move application from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// The current status.
        from: ApplicationStatus,
        /// The requested status.
        to: ApplicationStatus,
    },

    /// No application with the given id is stored.
    #[error("Application not found: {id}")]
    ApplicationNotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The stored application changed between load and commit.
    #[error("Application {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// The application id.
        id: Uuid,
        /// The version the writer loaded.
        expected: u64,
        /// The version currently stored.
        found: u64,
    },

    /// Another recalculation of the same application is in flight.
    #[error("Calculation for application {id} is already in progress")]
    CalculationLocked {
        /// The application id.
        id: Uuid,
    },

    /// The application store could not be reached.
    #[error("Application repository unavailable: {message}")]
    RepositoryUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
