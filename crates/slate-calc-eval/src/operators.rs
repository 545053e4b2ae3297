//! Operator evaluators
//!
//! Two-operand numeric operators, relational operators, concatenation, and
//! the unary operators. Each operator has a scalar entry point and, where
//! the operator participates in array formulas, an array entry point; the
//! evaluator picks between them.

use slate_calc_core::{BinaryOperator, CellError, UnaryOperator};

use crate::area::{ArrayArea, Computed, Operand};
use crate::array::{self, ArraySide};
use crate::compare;
use crate::error::ValueResult;
use crate::resolve;
use crate::value::EvalValue;

/// The two-operand numeric operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl ArithmeticOp {
    /// Map from the expression-level operator, if arithmetic
    pub fn from_binary(op: BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Add => Some(ArithmeticOp::Add),
            BinaryOperator::Subtract => Some(ArithmeticOp::Subtract),
            BinaryOperator::Multiply => Some(ArithmeticOp::Multiply),
            BinaryOperator::Divide => Some(ArithmeticOp::Divide),
            BinaryOperator::Power => Some(ArithmeticOp::Power),
            _ => None,
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Subtract => a - b,
            ArithmeticOp::Multiply => a * b,
            ArithmeticOp::Divide => a / b,
            ArithmeticOp::Power => a.powf(b),
        }
    }

    /// Combine two collected numbers into a finished result
    ///
    /// Checks the NaN sentinel from array collection, division by zero
    /// (which must yield `#DIV/0!`, not `#NUM!`), and 0^0. A NaN or
    /// infinite result becomes `#NUM!`. A zero result normalizes to `+0.0`
    /// for every operator except subtraction, which preserves `-0.0`.
    pub fn combine(self, a: f64, b: f64) -> ValueResult<f64> {
        if a.is_nan() || b.is_nan() {
            return Err(CellError::Value);
        }
        match self {
            ArithmeticOp::Divide if b == 0.0 => return Err(CellError::Div0),
            ArithmeticOp::Power if a == 0.0 && b == 0.0 => return Err(CellError::Num),
            _ => {}
        }
        let raw = self.apply(a, b);
        if raw.is_nan() || raw.is_infinite() {
            return Err(CellError::Num);
        }
        if raw == 0.0 && !matches!(self, ArithmeticOp::Subtract) {
            // Subtraction may legitimately produce -0.0 and keeps its sign
            return Ok(0.0);
        }
        Ok(raw)
    }
}

/// Scalar arithmetic: resolve, coerce, combine
///
/// Resolution and coercion failures become the result value.
pub fn eval_arithmetic_scalar(
    op: ArithmeticOp,
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
    eval_row: u32,
    eval_col: u16,
) -> EvalValue {
    let result = scalar_number(lhs, eval_row, eval_col)
        .and_then(|a| scalar_number(rhs, eval_row, eval_col).map(|b| (a, b)))
        .and_then(|(a, b)| op.combine(a, b));
    match result {
        Ok(n) => EvalValue::Number(n),
        Err(e) => EvalValue::Error(e),
    }
}

fn scalar_number(operand: &Operand<'_>, eval_row: u32, eval_col: u16) -> ValueResult<f64> {
    let value = resolve::single_value(operand, eval_row, eval_col)?;
    resolve::to_number(&value)
}

/// Array arithmetic: element-wise over the overlapping region
///
/// The result extent is the *smaller* of two grid operands per dimension
/// (truncate, don't pad); a scalar side broadcasts to the grid's extent.
/// Per-position failures become that position's error value.
pub fn eval_arithmetic_array(
    op: ArithmeticOp,
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
) -> Computed {
    let l = array::prepare(lhs);
    let r = array::prepare(rhs);
    let (height, width) = array::min_shape(&l, &r);

    let mut rows = Vec::with_capacity(height);
    for row in 0..height {
        let mut cells = Vec::with_capacity(width);
        for col in 0..width {
            cells.push(combine_position(op, &l, &r, row, col));
        }
        rows.push(cells);
    }
    Computed::from_array(ArrayArea::new(rows))
}

fn combine_position(
    op: ArithmeticOp,
    lhs: &ArraySide<'_>,
    rhs: &ArraySide<'_>,
    row: usize,
    col: usize,
) -> EvalValue {
    let result = array::collect_number(&lhs.fetch_direct(row, col))
        .and_then(|a| array::collect_number(&rhs.fetch_direct(row, col)).map(|b| (a, b)))
        .and_then(|(a, b)| op.combine(a, b));
    match result {
        Ok(n) => EvalValue::Number(n),
        Err(e) => EvalValue::Error(e),
    }
}

/// The relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl RelationalOp {
    /// Map from the expression-level operator, if relational
    pub fn from_binary(op: BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Equal => Some(RelationalOp::Equal),
            BinaryOperator::NotEqual => Some(RelationalOp::NotEqual),
            BinaryOperator::LessThan => Some(RelationalOp::LessThan),
            BinaryOperator::LessEqual => Some(RelationalOp::LessEqual),
            BinaryOperator::GreaterThan => Some(RelationalOp::GreaterThan),
            BinaryOperator::GreaterEqual => Some(RelationalOp::GreaterEqual),
            _ => None,
        }
    }

    /// Map a comparison result through this operator's predicate
    pub fn holds(self, cmp: i32) -> bool {
        match self {
            RelationalOp::Equal => cmp == 0,
            RelationalOp::NotEqual => cmp != 0,
            RelationalOp::LessThan => cmp < 0,
            RelationalOp::LessEqual => cmp <= 0,
            RelationalOp::GreaterThan => cmp > 0,
            RelationalOp::GreaterEqual => cmp >= 0,
        }
    }
}

/// Scalar relational comparison
///
/// Both operands resolve to single values first; any resolution error (or
/// an error value in either operand) is the result.
pub fn eval_relational_scalar(
    op: RelationalOp,
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
    eval_row: u32,
    eval_col: u16,
) -> EvalValue {
    let a = match resolve::single_value(lhs, eval_row, eval_col) {
        Ok(v) => v,
        Err(e) => return EvalValue::Error(e),
    };
    if let EvalValue::Error(e) = a {
        return EvalValue::Error(e);
    }
    let b = match resolve::single_value(rhs, eval_row, eval_col) {
        Ok(v) => v,
        Err(e) => return EvalValue::Error(e),
    };
    if let EvalValue::Error(e) = b {
        return EvalValue::Error(e);
    }
    EvalValue::Bool(op.holds(compare::compare(&a, &b)))
}

/// Array relational comparison: broadcast to the max extent
///
/// Each result cell compares the correspondingly-indexed source cells;
/// length-1 axes repeat, positions beyond a longer axis become `#N/A`, and
/// a per-cell error becomes that cell's value without aborting the array.
pub fn eval_relational_array(
    op: RelationalOp,
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
) -> Computed {
    let l = array::prepare(lhs);
    let r = array::prepare(rhs);
    let (height, width) = array::max_shape(&l, &r);

    let mut rows = Vec::with_capacity(height);
    for row in 0..height {
        let mut cells = Vec::with_capacity(width);
        for col in 0..width {
            cells.push(compare_position(op, &l, &r, row, col));
        }
        rows.push(cells);
    }
    Computed::from_array(ArrayArea::new(rows))
}

fn compare_position(
    op: RelationalOp,
    lhs: &ArraySide<'_>,
    rhs: &ArraySide<'_>,
    row: usize,
    col: usize,
) -> EvalValue {
    let a = match lhs.fetch_broadcast(row, col) {
        Some(v) => v,
        None => return EvalValue::Error(CellError::Na),
    };
    if let EvalValue::Error(e) = a {
        return EvalValue::Error(e);
    }
    let b = match rhs.fetch_broadcast(row, col) {
        Some(v) => v,
        None => return EvalValue::Error(CellError::Na),
    };
    if let EvalValue::Error(e) = b {
        return EvalValue::Error(e);
    }
    EvalValue::Bool(op.holds(compare::compare(&a, &b)))
}

/// Text concatenation (`&`)
pub fn eval_concat(
    lhs: &Operand<'_>,
    rhs: &Operand<'_>,
    eval_row: u32,
    eval_col: u16,
) -> EvalValue {
    let a = match resolve::single_value(lhs, eval_row, eval_col) {
        Ok(v) => v,
        Err(e) => return EvalValue::Error(e),
    };
    if let EvalValue::Error(e) = a {
        return EvalValue::Error(e);
    }
    let b = match resolve::single_value(rhs, eval_row, eval_col) {
        Ok(v) => v,
        Err(e) => return EvalValue::Error(e),
    };
    if let EvalValue::Error(e) = b {
        return EvalValue::Error(e);
    }
    EvalValue::Text(resolve::to_text(&a) + &resolve::to_text(&b))
}

/// Unary operators: negation and percent
pub fn eval_unary(
    op: UnaryOperator,
    operand: &Operand<'_>,
    eval_row: u32,
    eval_col: u16,
) -> EvalValue {
    let n = match resolve::single_value(operand, eval_row, eval_col)
        .and_then(|v| resolve::to_number(&v))
    {
        Ok(n) => n,
        Err(e) => return EvalValue::Error(e),
    };
    match op {
        UnaryOperator::Negate => EvalValue::Number(-n),
        UnaryOperator::Percent => EvalValue::Number(n / 100.0),
    }
}
