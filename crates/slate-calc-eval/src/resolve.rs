//! Operand resolution and coercion
//!
//! Collapses reference/array operands to scalars in scalar-argument
//! positions and converts between value kinds with Excel's semantics.
//! Failures are spreadsheet data ([`ValueResult`]), converted back into
//! error values at the nearest operator or function boundary.

use slate_calc_core::CellError;

use crate::area::{AreaView, Operand, TwoD};
use crate::error::ValueResult;
use crate::value::EvalValue;

/// Collapse any operand to a single scalar value
///
/// Scalars pass through; a reference dereferences to its inner value; an
/// area applies implicit intersection against the evaluating cell's row and
/// column. Never returns a reference or area. The returned value may itself
/// be an error value (e.g. a referenced cell holding `#REF!`); an `Err` is
/// a resolution failure (intersection did not apply).
pub fn single_value(
    operand: &Operand<'_>,
    eval_row: u32,
    eval_col: u16,
) -> ValueResult<EvalValue> {
    match operand {
        Operand::Value(v) => Ok(v.clone()),
        Operand::Ref(r) => Ok(r.value()),
        Operand::Area(area) => intersect_area(area, eval_row, eval_col),
    }
}

/// Excel's implicit intersection
///
/// A 1x1 area yields its only cell. A single-column area whose row span
/// contains the evaluating cell's row yields the intersecting cell, and
/// symmetrically for a single row and the evaluating column. Anything else
/// fails with `#VALUE!`. In-memory arrays have no sheet anchor, so a
/// single-row or single-column array yields its first element instead.
fn intersect_area(area: &AreaView<'_>, eval_row: u32, eval_col: u16) -> ValueResult<EvalValue> {
    if area.height() == 1 && area.width() == 1 {
        return Ok(area.value_at(0, 0));
    }
    match area {
        AreaView::Sheet(sheet_area) => {
            let region = sheet_area.region();
            if region.is_column() && region.contains_row(eval_row) {
                Ok(sheet_area.value_at((eval_row - region.first_row()) as usize, 0))
            } else if region.is_row() && region.contains_col(eval_col) {
                Ok(sheet_area.value_at(0, (eval_col - region.first_col()) as usize))
            } else {
                Err(CellError::Value)
            }
        }
        AreaView::Array(array) => {
            if array.height() == 1 || array.width() == 1 {
                Ok(array.value_at(0, 0))
            } else {
                Err(CellError::Value)
            }
        }
    }
}

/// Coerce a scalar to a number
///
/// Blank and missing coerce to 0; booleans to 1/0; strings parse (trimmed)
/// or fail with `#VALUE!`; error values propagate their own code.
pub fn to_number(value: &EvalValue) -> ValueResult<f64> {
    match value {
        EvalValue::Number(n) => Ok(*n),
        EvalValue::Bool(true) => Ok(1.0),
        EvalValue::Bool(false) => Ok(0.0),
        EvalValue::Text(s) => s.trim().parse::<f64>().map_err(|_| CellError::Value),
        EvalValue::Blank | EvalValue::Missing => Ok(0.0),
        EvalValue::Error(e) => Err(*e),
    }
}

/// Coerce a scalar to a boolean
///
/// `Ok(None)` means "no opinion": blank and missing never convert, and in
/// area contexts (`strings_are_blanks`) unconvertible text is skipped the
/// same way. In scalar-argument contexts unconvertible text fails with
/// `#VALUE!`. Error values propagate their own code.
pub fn to_bool(value: &EvalValue, strings_are_blanks: bool) -> ValueResult<Option<bool>> {
    match value {
        EvalValue::Bool(b) => Ok(Some(*b)),
        EvalValue::Number(n) => Ok(Some(*n != 0.0)),
        EvalValue::Text(s) => {
            if s.eq_ignore_ascii_case("TRUE") {
                Ok(Some(true))
            } else if s.eq_ignore_ascii_case("FALSE") {
                Ok(Some(false))
            } else if strings_are_blanks {
                Ok(None)
            } else {
                Err(CellError::Value)
            }
        }
        EvalValue::Blank | EvalValue::Missing => Ok(None),
        EvalValue::Error(e) => Err(*e),
    }
}

/// Coerce a scalar to text using the canonical renderings
///
/// Callers propagate error values before coercing; an error here renders
/// as its code string for display-only paths.
pub fn to_text(value: &EvalValue) -> String {
    value.to_text()
}
