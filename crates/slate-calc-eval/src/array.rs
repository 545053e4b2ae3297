//! Array/matrix evaluation support
//!
//! Shared machinery for element-wise evaluation over 2-D operands: numeric
//! collection with a fixed policy for unconvertible cells, and the two
//! broadcast shapes (max-extent for relational operators, min-extent for
//! arithmetic).

use crate::area::{Operand, TwoD};
use crate::error::ValueResult;
use crate::value::EvalValue;

/// Collect one cell into a numeric matrix slot
///
/// Policy for cells that do not convert: text that fails to parse becomes a
/// NaN sentinel which the consuming evaluator must check and turn into
/// `#VALUE!` before combining; a NaN must never fold silently into a
/// valid-looking numeric result. Error cells keep their own code.
pub fn collect_number(value: &EvalValue) -> ValueResult<f64> {
    match value {
        EvalValue::Number(n) => Ok(*n),
        EvalValue::Bool(true) => Ok(1.0),
        EvalValue::Bool(false) => Ok(0.0),
        EvalValue::Text(s) => Ok(s.trim().parse::<f64>().unwrap_or(f64::NAN)),
        EvalValue::Blank | EvalValue::Missing => Ok(0.0),
        EvalValue::Error(e) => Err(*e),
    }
}

/// One operand prepared for an element-wise loop
///
/// Single-cell operands (plain scalars and cell references) participate as
/// scalars; areas and arrays participate through the [`TwoD`] capability.
pub enum ArraySide<'b> {
    /// Broadcasts to every result position
    Scalar(EvalValue),
    /// Indexed per position
    Grid(&'b dyn TwoD),
}

impl ArraySide<'_> {
    /// The operand's own extent; `None` for scalars
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            ArraySide::Scalar(_) => None,
            ArraySide::Grid(g) => Some((g.height(), g.width())),
        }
    }

    /// Fetch without axis broadcasting; `(row, col)` must lie inside the
    /// operand's extent (arithmetic min-shape loops guarantee this)
    pub fn fetch_direct(&self, row: usize, col: usize) -> EvalValue {
        match self {
            ArraySide::Scalar(v) => v.clone(),
            ArraySide::Grid(g) => g.value_at(row, col),
        }
    }

    /// Fetch with per-axis broadcasting for max-shape loops
    ///
    /// A length-1 axis repeats its only row/column; an index beyond a longer
    /// axis has no source cell and returns `None` (the caller maps it to
    /// `#N/A`).
    pub fn fetch_broadcast(&self, row: usize, col: usize) -> Option<EvalValue> {
        match self {
            ArraySide::Scalar(v) => Some(v.clone()),
            ArraySide::Grid(g) => {
                let (h, w) = (g.height(), g.width());
                let r = if h == 1 {
                    0
                } else if row < h {
                    row
                } else {
                    return None;
                };
                let c = if w == 1 {
                    0
                } else if col < w {
                    col
                } else {
                    return None;
                };
                Some(g.value_at(r, c))
            }
        }
    }
}

/// Prepare an operand for an element-wise loop
pub fn prepare<'b>(operand: &'b Operand<'_>) -> ArraySide<'b> {
    match operand {
        Operand::Value(v) => ArraySide::Scalar(v.clone()),
        Operand::Ref(r) => ArraySide::Scalar(r.value()),
        Operand::Area(a) => ArraySide::Grid(a),
    }
}

/// Result shape for relational broadcast: the max of the operand extents
pub fn max_shape(lhs: &ArraySide<'_>, rhs: &ArraySide<'_>) -> (usize, usize) {
    match (lhs.shape(), rhs.shape()) {
        (Some((h1, w1)), Some((h2, w2))) => (h1.max(h2), w1.max(w2)),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => (1, 1),
    }
}

/// Result shape for arithmetic: the overlapping (min) region of two grids;
/// a scalar side broadcasts to the grid's own extent
pub fn min_shape(lhs: &ArraySide<'_>, rhs: &ArraySide<'_>) -> (usize, usize) {
    match (lhs.shape(), rhs.shape()) {
        (Some((h1, w1)), Some((h2, w2))) => (h1.min(h2), w1.min(w2)),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => (1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::ArrayArea;
    use slate_calc_core::CellError;

    fn grid(h: usize, w: usize) -> ArrayArea {
        ArrayArea::new(vec![vec![EvalValue::Number(1.0); w]; h])
    }

    #[test]
    fn test_collect_number_policy() {
        assert_eq!(collect_number(&EvalValue::Number(2.0)), Ok(2.0));
        assert_eq!(collect_number(&EvalValue::Bool(true)), Ok(1.0));
        assert_eq!(collect_number(&EvalValue::Blank), Ok(0.0));
        assert_eq!(collect_number(&EvalValue::Text("4".into())), Ok(4.0));
        // Unconvertible text becomes the NaN sentinel, not an error here
        assert!(collect_number(&EvalValue::Text("abc".into()))
            .unwrap()
            .is_nan());
        // Error cells keep their own code
        assert_eq!(
            collect_number(&EvalValue::Error(CellError::Ref)),
            Err(CellError::Ref)
        );
    }

    #[test]
    fn test_shapes() {
        let a = grid(3, 2);
        let b = grid(2, 5);
        let ga = ArraySide::Grid(&a);
        let gb = ArraySide::Grid(&b);
        let s = ArraySide::Scalar(EvalValue::Number(1.0));

        assert_eq!(max_shape(&ga, &gb), (3, 5));
        assert_eq!(min_shape(&ga, &gb), (2, 2));
        assert_eq!(max_shape(&ga, &s), (3, 2));
        assert_eq!(min_shape(&ga, &s), (3, 2));
        assert_eq!(max_shape(&s, &s), (1, 1));
    }

    #[test]
    fn test_fetch_broadcast_axis_rules() {
        // A single row repeats down, but a 2-row grid has no third row
        let row = ArrayArea::new(vec![vec![
            EvalValue::Number(1.0),
            EvalValue::Number(2.0),
        ]]);
        let side = ArraySide::Grid(&row);
        assert_eq!(side.fetch_broadcast(5, 1), Some(EvalValue::Number(2.0)));
        assert_eq!(side.fetch_broadcast(5, 2), None);

        let two = grid(2, 1);
        let side = ArraySide::Grid(&two);
        assert_eq!(side.fetch_broadcast(1, 7), Some(EvalValue::Number(1.0)));
        assert_eq!(side.fetch_broadcast(2, 0), None);
    }
}
