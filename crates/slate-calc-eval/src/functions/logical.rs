//! Logical functions

use slate_calc_core::CellError;

use crate::area::{Computed, Operand, TwoD};
use crate::error::EvalResult;
use crate::evaluator::EvalContext;
use crate::resolve;
use crate::value::EvalValue;

/// The associative combinators behind AND/OR/XOR
#[derive(Debug, Clone, Copy)]
enum BoolOp {
    And,
    Or,
    Xor,
}

impl BoolOp {
    /// Seed of the fold
    fn initial(self) -> bool {
        match self {
            BoolOp::And => true,
            BoolOp::Or | BoolOp::Xor => false,
        }
    }

    /// Fold one converted value into the running result
    fn fold(self, acc: bool, value: bool) -> bool {
        match self {
            BoolOp::And => acc && value,
            BoolOp::Or => acc || value,
            BoolOp::Xor => acc ^ value,
        }
    }
}

/// Shared AND/OR/XOR evaluation
///
/// Area arguments visit every cell leniently: blanks and unconvertible text
/// skip silently, errors propagate. Scalar and reference arguments coerce
/// strictly, so a direct empty-string argument fails with `#VALUE!` instead
/// of being skipped. Missing arguments are ignored entirely. If no argument
/// contributed a convertible value, the whole call fails with `#VALUE!`.
fn eval_boolean_fold(
    op: BoolOp,
    args: &[Operand<'_>],
    ctx: &EvalContext<'_>,
) -> EvalResult<Computed> {
    let mut acc = op.initial();
    let mut seen = false;

    for arg in args {
        match arg {
            Operand::Area(area) => {
                for row in 0..area.height() {
                    for col in 0..area.width() {
                        match resolve::to_bool(&area.value_at(row, col), true) {
                            Ok(Some(b)) => {
                                acc = op.fold(acc, b);
                                seen = true;
                            }
                            Ok(None) => {}
                            Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
                        }
                    }
                }
            }
            other => {
                let value = match resolve::single_value(other, ctx.row, ctx.col) {
                    Ok(v) => v,
                    Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
                };
                if matches!(value, EvalValue::Missing) {
                    continue;
                }
                match resolve::to_bool(&value, false) {
                    Ok(Some(b)) => {
                        acc = op.fold(acc, b);
                        seen = true;
                    }
                    Ok(None) => {}
                    Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
                }
            }
        }
    }

    if !seen {
        // No evidence at all: cannot determine a result
        return Ok(Computed::Value(EvalValue::Error(CellError::Value)));
    }
    Ok(Computed::Value(EvalValue::Bool(acc)))
}

/// AND function
pub fn fn_and(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    eval_boolean_fold(BoolOp::And, args, ctx)
}

/// OR function
pub fn fn_or(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    eval_boolean_fold(BoolOp::Or, args, ctx)
}

/// XOR function (true for an odd number of true values)
pub fn fn_xor(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    eval_boolean_fold(BoolOp::Xor, args, ctx)
}

/// NOT function
pub fn fn_not(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let value = match resolve::single_value(&args[0], ctx.row, ctx.col) {
        Ok(v) => v,
        Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
    };
    let b = match resolve::to_bool(&value, false) {
        Ok(Some(b)) => b,
        Ok(None) => false,
        Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
    };
    Ok(Computed::Value(EvalValue::Bool(!b)))
}

/// IF function
pub fn fn_if(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let condition = match resolve::single_value(&args[0], ctx.row, ctx.col) {
        Ok(v) => v,
        Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
    };
    if let EvalValue::Error(e) = condition {
        return Ok(Computed::Value(EvalValue::Error(e)));
    }
    let condition = match resolve::to_bool(&condition, false) {
        Ok(Some(b)) => b,
        Ok(None) => false,
        Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
    };

    let chosen = if condition { args.get(1) } else { args.get(2) };
    let value = match chosen {
        Some(operand) => match resolve::single_value(operand, ctx.row, ctx.col) {
            Ok(v) => v,
            Err(e) => return Ok(Computed::Value(EvalValue::Error(e))),
        },
        // Omitted else-branch
        None => EvalValue::Bool(false),
    };
    // An omitted-but-present argument slot yields 0
    let value = match value {
        EvalValue::Missing => EvalValue::Number(0.0),
        v => v,
    };
    Ok(Computed::Value(value))
}

/// IFERROR(value, value_if_error)
pub fn fn_iferror(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let value = resolve::single_value(&args[0], ctx.row, ctx.col);
    match value {
        Ok(EvalValue::Error(_)) | Err(_) => {
            let fallback = match resolve::single_value(&args[1], ctx.row, ctx.col) {
                Ok(v) => v,
                Err(e) => EvalValue::Error(e),
            };
            Ok(Computed::Value(fallback))
        }
        Ok(v) => Ok(Computed::Value(v)),
    }
}

/// IFNA(value, value_if_na) - catches only #N/A, other errors propagate
pub fn fn_ifna(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let value = match resolve::single_value(&args[0], ctx.row, ctx.col) {
        Ok(v) => v,
        Err(e) => EvalValue::Error(e),
    };
    match value {
        EvalValue::Error(CellError::Na) => {
            let fallback = match resolve::single_value(&args[1], ctx.row, ctx.col) {
                Ok(v) => v,
                Err(e) => EvalValue::Error(e),
            };
            Ok(Computed::Value(fallback))
        }
        v => Ok(Computed::Value(v)),
    }
}

/// TRUE() - Returns the logical value TRUE
pub fn fn_true(_args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    Ok(Computed::Value(EvalValue::Bool(true)))
}

/// FALSE() - Returns the logical value FALSE
pub fn fn_false(_args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    Ok(Computed::Value(EvalValue::Bool(false)))
}
