//! Instalment models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status of an instalment.
///
/// The engine only ever sets [`InstalmentStatus::Accepted`] and
/// [`InstalmentStatus::Waiting`]; the other states belong to the payment
/// integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstalmentStatus {
    /// Ready to be paid.
    Accepted,
    /// Scheduled for later review.
    Waiting,
    /// Sent to payroll.
    Paid,
    /// Cancelled before payment.
    Cancelled,
    /// Payroll reported an error.
    ErrorInTalpa,
    /// Payment confirmed.
    Completed,
}

/// One scheduled payment of the total benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instalment {
    /// 1 or 2.
    pub instalment_number: u8,
    /// Amount paid in this instalment.
    pub amount: Decimal,
    /// When the instalment falls due.
    pub due_date: NaiveDate,
    /// Payment status.
    pub status: InstalmentStatus,
}
