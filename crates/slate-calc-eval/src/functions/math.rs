//! Math functions

use slate_calc_core::CellError;

use crate::area::{Computed, Operand, TwoD};
use crate::error::EvalResult;
use crate::evaluator::EvalContext;
use crate::operators::ArithmeticOp;
use crate::resolve;
use crate::value::EvalValue;

/// Fold the numeric content of an argument list
///
/// Literal scalar arguments coerce strictly (so `SUM("3")` counts 3 and
/// `SUM("abc")` fails); cells reached through references and areas
/// contribute only genuine numbers, with text, booleans and blanks skipped
/// the way range aggregation does. Errors propagate from anywhere.
fn fold_numeric(args: &[Operand<'_>], f: &mut impl FnMut(f64)) -> Option<CellError> {
    for arg in args {
        match arg {
            Operand::Value(EvalValue::Missing) | Operand::Value(EvalValue::Blank) => {}
            Operand::Value(v) => match resolve::to_number(v) {
                Ok(n) => f(n),
                Err(e) => return Some(e),
            },
            Operand::Ref(r) => match r.value() {
                EvalValue::Number(n) => f(n),
                EvalValue::Error(e) => return Some(e),
                _ => {}
            },
            Operand::Area(area) => {
                for row in 0..area.height() {
                    for col in 0..area.width() {
                        match area.value_at(row, col) {
                            EvalValue::Number(n) => f(n),
                            EvalValue::Error(e) => return Some(e),
                            _ => {}
                        }
                    }
                }
            }
        }
    }
    None
}

/// Resolve one scalar argument to a number
fn arg_number(
    args: &[Operand<'_>],
    index: usize,
    ctx: &EvalContext<'_>,
) -> Result<f64, CellError> {
    let value = resolve::single_value(&args[index], ctx.row, ctx.col)?;
    resolve::to_number(&value)
}

fn number(n: f64) -> EvalResult<Computed> {
    Ok(Computed::Value(EvalValue::Number(n)))
}

fn error(e: CellError) -> EvalResult<Computed> {
    Ok(Computed::Value(EvalValue::Error(e)))
}

/// SUM function
pub fn fn_sum(args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let mut sum = 0.0;
    if let Some(e) = fold_numeric(args, &mut |n| sum += n) {
        return error(e);
    }
    number(sum)
}

/// AVERAGE function
pub fn fn_average(args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let mut sum = 0.0;
    let mut count = 0u32;
    if let Some(e) = fold_numeric(args, &mut |n| {
        sum += n;
        count += 1;
    }) {
        return error(e);
    }
    if count == 0 {
        return error(CellError::Div0);
    }
    number(sum / count as f64)
}

/// MIN function
pub fn fn_min(args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let mut min: Option<f64> = None;
    if let Some(e) = fold_numeric(args, &mut |n| {
        min = Some(min.map_or(n, |m| m.min(n)));
    }) {
        return error(e);
    }
    number(min.unwrap_or(0.0))
}

/// MAX function
pub fn fn_max(args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let mut max: Option<f64> = None;
    if let Some(e) = fold_numeric(args, &mut |n| {
        max = Some(max.map_or(n, |m| m.max(n)));
    }) {
        return error(e);
    }
    number(max.unwrap_or(0.0))
}

/// COUNT function (counts numeric values)
pub fn fn_count(args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let mut count = 0u32;
    for arg in args {
        match arg {
            Operand::Value(EvalValue::Number(_)) => count += 1,
            Operand::Value(_) => {}
            Operand::Ref(r) => {
                if matches!(r.value(), EvalValue::Number(_)) {
                    count += 1;
                }
            }
            Operand::Area(area) => {
                for row in 0..area.height() {
                    for col in 0..area.width() {
                        if matches!(area.value_at(row, col), EvalValue::Number(_)) {
                            count += 1;
                        }
                    }
                }
            }
        }
    }
    number(count as f64)
}

/// COUNTA function (counts non-blank values, errors included)
pub fn fn_counta(args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let mut count = 0u32;
    for arg in args {
        match arg {
            Operand::Value(EvalValue::Missing) | Operand::Value(EvalValue::Blank) => {}
            Operand::Value(_) => count += 1,
            Operand::Ref(r) => {
                if !r.value().is_blank() {
                    count += 1;
                }
            }
            Operand::Area(area) => {
                for row in 0..area.height() {
                    for col in 0..area.width() {
                        if !area.value_at(row, col).is_blank() {
                            count += 1;
                        }
                    }
                }
            }
        }
    }
    number(count as f64)
}

/// ABS(number)
pub fn fn_abs(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    match arg_number(args, 0, ctx) {
        Ok(n) => number(n.abs()),
        Err(e) => error(e),
    }
}

/// ROUND(number, [num_digits])
///
/// Uses "round half away from zero", the standard spreadsheet rounding.
pub fn fn_round(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let value = match arg_number(args, 0, ctx) {
        Ok(n) => n,
        Err(e) => return error(e),
    };
    let digits = match args.get(1) {
        Some(_) => match arg_number(args, 1, ctx) {
            Ok(n) => n as i32,
            Err(e) => return error(e),
        },
        None => 0,
    };

    let multiplier = 10_f64.powi(digits);
    let result = if value >= 0.0 {
        (value * multiplier + 0.5).floor() / multiplier
    } else {
        (value * multiplier - 0.5).ceil() / multiplier
    };
    number(result)
}

/// SQRT(number)
pub fn fn_sqrt(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    match arg_number(args, 0, ctx) {
        Ok(n) if n < 0.0 => error(CellError::Num),
        Ok(n) => number(n.sqrt()),
        Err(e) => error(e),
    }
}

/// POWER(number, power)
pub fn fn_power(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let base = match arg_number(args, 0, ctx) {
        Ok(n) => n,
        Err(e) => return error(e),
    };
    let exponent = match arg_number(args, 1, ctx) {
        Ok(n) => n,
        Err(e) => return error(e),
    };
    match ArithmeticOp::Power.combine(base, exponent) {
        Ok(n) => number(n),
        Err(e) => error(e),
    }
}

/// RAND() - uniform random number in [0, 1)
///
/// Volatile: recalculates on every evaluation and is never result-cached.
pub fn fn_rand(_args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    number(rng.gen::<f64>())
}

/// RANDBETWEEN(bottom, top) - random integer in [bottom, top]
pub fn fn_randbetween(args: &[Operand<'_>], ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    use rand::Rng;

    let bottom = match arg_number(args, 0, ctx) {
        Ok(n) => n.ceil() as i64,
        Err(e) => return error(e),
    };
    let top = match arg_number(args, 1, ctx) {
        Ok(n) => n.floor() as i64,
        Err(e) => return error(e),
    };
    if bottom > top {
        return error(CellError::Num);
    }

    let mut rng = rand::thread_rng();
    number(rng.gen_range(bottom..=top) as f64)
}
