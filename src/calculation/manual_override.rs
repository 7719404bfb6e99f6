//! Manual override calculation.
//!
//! A handler may replace the computed monthly benefit with an amount of their
//! own. The override then takes precedence over every benefit kind.

use super::rows::{RowContext, RowKind, RowLedger};
use crate::error::EngineResult;

/// Appends the override total, preceded by the handler's justification if any.
pub fn create_manual_override_rows(ctx: &RowContext<'_>, ledger: &mut RowLedger) -> EngineResult<()> {
    let comment = ctx.calculation.override_monthly_benefit_amount_comment.trim();
    if !comment.is_empty() {
        ledger.append(RowKind::Description(comment.to_string()), ctx)?;
    }
    ledger.append(RowKind::ManualOverrideTotal, ctx)?;
    Ok(())
}
