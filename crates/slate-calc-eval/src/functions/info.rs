//! Information functions
//!
//! The IS* family inspects a resolved value without propagating error
//! values: `ISERROR(#N/A)` is TRUE, not `#N/A`.

use slate_calc_core::CellError;

use crate::area::{Computed, Operand};
use crate::error::EvalResult;
use crate::evaluator::EvalContext;
use crate::resolve;
use crate::value::EvalValue;

/// Resolve the single argument; a resolution failure counts as an error value
fn inspect(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalValue {
    match resolve::single_value(&args[0], ctx.row, ctx.col) {
        Ok(v) => v,
        Err(e) => EvalValue::Error(e),
    }
}

fn boolean(b: bool) -> EvalResult<Computed> {
    Ok(Computed::Value(EvalValue::Bool(b)))
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    boolean(inspect(args, ctx).is_blank())
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    boolean(matches!(inspect(args, ctx), EvalValue::Number(_)))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    boolean(matches!(inspect(args, ctx), EvalValue::Text(_)))
}

/// ISERROR(value)
pub fn fn_iserror(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    boolean(inspect(args, ctx).is_error())
}

/// ISNA(value)
pub fn fn_isna(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    boolean(matches!(
        inspect(args, ctx),
        EvalValue::Error(CellError::Na)
    ))
}

/// NA() - the #N/A error value
pub fn fn_na(_args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    Ok(Computed::Value(EvalValue::Error(CellError::Na)))
}
