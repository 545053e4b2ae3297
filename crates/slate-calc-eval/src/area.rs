//! Reference and area views
//!
//! References never own cells: a [`RefView`] or [`SheetArea`] is a cheap
//! window over the backing value source, created per evaluation step and
//! discarded when the expression finishes. [`ArrayArea`] is the one owning
//! variant, used for literal array constants and materialized array-operation
//! results.

use slate_calc_core::CellRange;

use crate::evaluator::ValueSource;
use crate::value::EvalValue;

/// An inclusive rectangular region of cells
///
/// Immutable once constructed; `first <= last` holds in both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    first_row: u32,
    first_col: u16,
    last_row: u32,
    last_col: u16,
}

impl Region {
    /// Create a region; bounds must already be ordered
    ///
    /// # Panics
    /// Panics if `first_row > last_row` or `first_col > last_col`: inverted
    /// bounds are a bug in the calling layer, not spreadsheet data.
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        assert!(
            first_row <= last_row,
            "inverted region rows: {} > {}",
            first_row,
            last_row
        );
        assert!(
            first_col <= last_col,
            "inverted region columns: {} > {}",
            first_col,
            last_col
        );
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    /// First (top) row
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    /// First (left) column
    pub fn first_col(&self) -> u16 {
        self.first_col
    }

    /// Last (bottom) row, inclusive
    pub fn last_row(&self) -> u32 {
        self.last_row
    }

    /// Last (right) column, inclusive
    pub fn last_col(&self) -> u16 {
        self.last_col
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        (self.last_col - self.first_col + 1) as usize
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        (self.last_row - self.first_row + 1) as usize
    }

    /// Whether the region is a single row
    pub fn is_row(&self) -> bool {
        self.first_row == self.last_row
    }

    /// Whether the region is a single column
    pub fn is_column(&self) -> bool {
        self.first_col == self.last_col
    }

    /// Whether the region covers exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.is_row() && self.is_column()
    }

    /// Whether an absolute row lies within the region's row span
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.first_row && row <= self.last_row
    }

    /// Whether an absolute column lies within the region's column span
    pub fn contains_col(&self, col: u16) -> bool {
        col >= self.first_col && col <= self.last_col
    }

    /// Produce a shifted/resized region relative to this one
    ///
    /// The four offsets are relative to the region's first row/column, so
    /// `offset(0, height-1, 0, width-1)` is the identity. Used by
    /// reference-returning functions; does not mutate the original.
    ///
    /// # Panics
    /// Panics if the offsets produce inverted or negative bounds.
    pub fn offset(
        &self,
        rel_first_row: i32,
        rel_last_row: i32,
        rel_first_col: i32,
        rel_last_col: i32,
    ) -> Region {
        let first_row = self.first_row as i64 + rel_first_row as i64;
        let last_row = self.first_row as i64 + rel_last_row as i64;
        let first_col = self.first_col as i64 + rel_first_col as i64;
        let last_col = self.first_col as i64 + rel_last_col as i64;
        assert!(
            first_row >= 0 && first_col >= 0 && last_row >= 0 && last_col >= 0,
            "region offset out of sheet bounds"
        );
        Region::new(
            first_row as u32,
            first_col as u16,
            last_row as u32,
            last_col as u16,
        )
    }
}

impl From<CellRange> for Region {
    fn from(range: CellRange) -> Self {
        Region::new(
            range.start.row,
            range.start.col,
            range.end.row,
            range.end.col,
        )
    }
}

/// The 2-D value capability
///
/// Array evaluation operates against this capability rather than against
/// sheet areas directly, so literal array constants and live sheet ranges
/// are interchangeable operands.
pub trait TwoD {
    /// Number of rows
    fn height(&self) -> usize;

    /// Number of columns
    fn width(&self) -> usize;

    /// Fetch a value by region-relative coordinates
    ///
    /// # Panics
    /// Panics when the coordinate lies outside the region; out-of-range
    /// access is a programming error, not a spreadsheet error.
    fn value_at(&self, row: usize, col: usize) -> EvalValue;
}

/// A resolved single-cell reference view
///
/// Exposes the cell's current value and its coordinates; does not own the
/// cell.
#[derive(Clone, Copy)]
pub struct RefView<'a> {
    sheet: usize,
    row: u32,
    col: u16,
    source: &'a dyn ValueSource,
}

impl<'a> RefView<'a> {
    /// Create a reference view over a value source
    pub fn new(sheet: usize, row: u32, col: u16, source: &'a dyn ValueSource) -> Self {
        Self {
            sheet,
            row,
            col,
            source,
        }
    }

    /// Sheet index of the referenced cell
    pub fn sheet(&self) -> usize {
        self.sheet
    }

    /// Row of the referenced cell
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Column of the referenced cell
    pub fn col(&self) -> u16 {
        self.col
    }

    /// The referenced cell's current value
    pub fn value(&self) -> EvalValue {
        self.source.value_at(self.sheet, self.row, self.col)
    }
}

impl std::fmt::Debug for RefView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefView")
            .field("sheet", &self.sheet)
            .field("row", &self.row)
            .field("col", &self.col)
            .finish()
    }
}

/// A lazily-evaluated window over a live sheet
#[derive(Clone, Copy)]
pub struct SheetArea<'a> {
    sheet: usize,
    region: Region,
    source: &'a dyn ValueSource,
}

impl<'a> SheetArea<'a> {
    /// Create a sheet-backed area view
    pub fn new(sheet: usize, region: Region, source: &'a dyn ValueSource) -> Self {
        Self {
            sheet,
            region,
            source,
        }
    }

    /// Sheet index the area is anchored to
    pub fn sheet(&self) -> usize {
        self.sheet
    }

    /// The covered region, in absolute sheet coordinates
    pub fn region(&self) -> Region {
        self.region
    }

    /// Produce a shifted/resized view relative to this one
    ///
    /// Used by reference-returning functions; the original view is left
    /// untouched. Offsets follow [`Region::offset`].
    pub fn offset(
        &self,
        rel_first_row: i32,
        rel_last_row: i32,
        rel_first_col: i32,
        rel_last_col: i32,
    ) -> SheetArea<'a> {
        SheetArea {
            sheet: self.sheet,
            region: self
                .region
                .offset(rel_first_row, rel_last_row, rel_first_col, rel_last_col),
            source: self.source,
        }
    }
}

impl TwoD for SheetArea<'_> {
    fn height(&self) -> usize {
        self.region.height()
    }

    fn width(&self) -> usize {
        self.region.width()
    }

    fn value_at(&self, row: usize, col: usize) -> EvalValue {
        assert!(
            row < self.height() && col < self.width(),
            "area access out of range: ({}, {}) in {}x{}",
            row,
            col,
            self.height(),
            self.width()
        );
        self.source.value_at(
            self.sheet,
            self.region.first_row + row as u32,
            self.region.first_col + col as u16,
        )
    }
}

impl std::fmt::Debug for SheetArea<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetArea")
            .field("sheet", &self.sheet)
            .field("region", &self.region)
            .finish()
    }
}

/// A purely in-memory, materialized 2-D value array
///
/// Owns its backing values outright; no live-sheet link. Created for array
/// literals and per array-operation result, and discarded when no longer
/// referenced by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayArea {
    rows: Vec<Vec<EvalValue>>,
}

impl ArrayArea {
    /// Create an array from row-major values
    ///
    /// # Panics
    /// Panics on an empty array or ragged rows.
    pub fn new(rows: Vec<Vec<EvalValue>>) -> Self {
        assert!(
            !rows.is_empty() && !rows[0].is_empty(),
            "array area must have at least one cell"
        );
        let width = rows[0].len();
        assert!(
            rows.iter().all(|r| r.len() == width),
            "array area rows must have equal lengths"
        );
        Self { rows }
    }

    /// Row-major access to the backing values
    pub fn rows(&self) -> &[Vec<EvalValue>] {
        &self.rows
    }
}

impl TwoD for ArrayArea {
    fn height(&self) -> usize {
        self.rows.len()
    }

    fn width(&self) -> usize {
        self.rows[0].len()
    }

    fn value_at(&self, row: usize, col: usize) -> EvalValue {
        assert!(
            row < self.height() && col < self.width(),
            "array access out of range: ({}, {}) in {}x{}",
            row,
            col,
            self.height(),
            self.width()
        );
        self.rows[row][col].clone()
    }
}

/// A resolved rectangular reference operand
///
/// Sheet ranges and in-memory arrays present the same surface to the
/// resolution and array-evaluation layers.
#[derive(Debug, Clone)]
pub enum AreaView<'a> {
    /// Live window over a sheet
    Sheet(SheetArea<'a>),
    /// Materialized in-memory array
    Array(ArrayArea),
}

impl AreaView<'_> {
    /// Whether the area covers more than one cell
    pub fn is_multi_cell(&self) -> bool {
        self.height() * self.width() > 1
    }

    /// Copy the covered cells into an owned in-memory array
    pub fn materialize(&self) -> ArrayArea {
        match self {
            AreaView::Array(a) => a.clone(),
            AreaView::Sheet(s) => ArrayArea::new(
                (0..s.height())
                    .map(|row| (0..s.width()).map(|col| s.value_at(row, col)).collect())
                    .collect(),
            ),
        }
    }
}

impl TwoD for AreaView<'_> {
    fn height(&self) -> usize {
        match self {
            AreaView::Sheet(a) => a.height(),
            AreaView::Array(a) => a.height(),
        }
    }

    fn width(&self) -> usize {
        match self {
            AreaView::Sheet(a) => a.width(),
            AreaView::Array(a) => a.width(),
        }
    }

    fn value_at(&self, row: usize, col: usize) -> EvalValue {
        match self {
            AreaView::Sheet(a) => a.value_at(row, col),
            AreaView::Array(a) => a.value_at(row, col),
        }
    }
}

/// An operand as seen by operators and functions
///
/// References stay unresolved until an evaluator pulls them through the
/// resolution layer, so functions can treat a range as a range.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// A plain scalar
    Value(EvalValue),
    /// A resolved single-cell reference
    Ref(RefView<'a>),
    /// A resolved rectangular reference or array
    Area(AreaView<'a>),
}

impl Operand<'_> {
    /// Whether this operand spans more than one cell
    pub fn is_multi_cell(&self) -> bool {
        match self {
            Operand::Value(_) | Operand::Ref(_) => false,
            Operand::Area(a) => a.is_multi_cell(),
        }
    }
}

/// Result of a top-level evaluation step: a scalar or a materialized array
#[derive(Debug, Clone)]
pub enum Computed {
    /// Scalar result
    Value(EvalValue),
    /// 2-D array result (more than one cell)
    Array(ArrayArea),
}

impl Computed {
    /// Wrap an array result, unwrapping a 1x1 array to a plain scalar
    ///
    /// Downstream consumers test for areas to decide whether further
    /// dereferencing is needed, so a 1-cell array must never escape.
    pub fn from_array(array: ArrayArea) -> Self {
        if array.height() == 1 && array.width() == 1 {
            Computed::Value(array.value_at(0, 0))
        } else {
            Computed::Array(array)
        }
    }

    /// Convert into an operand for an enclosing expression
    pub fn into_operand<'a>(self) -> Operand<'a> {
        match self {
            Computed::Value(v) => Operand::Value(v),
            Computed::Array(a) => Operand::Area(AreaView::Array(a)),
        }
    }

    /// The scalar value, if this is one
    pub fn as_value(&self) -> Option<&EvalValue> {
        match self {
            Computed::Value(v) => Some(v),
            Computed::Array(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_dimensions() {
        let r = Region::new(1, 1, 3, 2);
        assert_eq!(r.height(), 3);
        assert_eq!(r.width(), 2);
        assert!(!r.is_row());
        assert!(!r.is_column());
        assert!(!r.is_single_cell());

        let row = Region::new(5, 0, 5, 9);
        assert!(row.is_row());
        assert!(!row.is_column());

        let cell = Region::new(2, 2, 2, 2);
        assert!(cell.is_single_cell());
    }

    #[test]
    #[should_panic(expected = "inverted region rows")]
    fn test_region_rejects_inverted_rows() {
        Region::new(3, 0, 1, 0);
    }

    #[test]
    fn test_region_offset() {
        let r = Region::new(10, 5, 12, 6);
        // Identity offset
        assert_eq!(r.offset(0, 2, 0, 1), r);
        // Shift down one row, keep shape
        let shifted = r.offset(1, 3, 0, 1);
        assert_eq!(shifted.first_row(), 11);
        assert_eq!(shifted.last_row(), 13);
        assert_eq!(shifted.width(), 2);
        // Original untouched
        assert_eq!(r.first_row(), 10);
    }

    #[test]
    fn test_sheet_area_offset() {
        struct Zeros;

        impl crate::evaluator::ValueSource for Zeros {
            fn sheet_index(&self, _name: &str) -> Option<usize> {
                Some(0)
            }

            fn value_at(&self, _sheet: usize, _row: u32, _col: u16) -> EvalValue {
                EvalValue::Number(0.0)
            }

            fn name_expr(&self, _name: &str) -> Option<&slate_calc_core::Expr> {
                None
            }
        }

        let source = Zeros;
        let area = SheetArea::new(0, Region::new(5, 2, 7, 3), &source);
        let shifted = area.offset(1, 3, 0, 1);
        assert_eq!(shifted.region(), Region::new(6, 2, 8, 3));
        // The original view is untouched
        assert_eq!(area.region(), Region::new(5, 2, 7, 3));
    }

    #[test]
    fn test_array_area_access() {
        let arr = ArrayArea::new(vec![
            vec![EvalValue::Number(1.0), EvalValue::Number(2.0)],
            vec![EvalValue::Number(3.0), EvalValue::Number(4.0)],
        ]);
        assert_eq!(arr.height(), 2);
        assert_eq!(arr.width(), 2);
        assert_eq!(arr.value_at(1, 0), EvalValue::Number(3.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_array_area_out_of_range_panics() {
        let arr = ArrayArea::new(vec![vec![EvalValue::Number(1.0)]]);
        arr.value_at(0, 1);
    }

    #[test]
    #[should_panic(expected = "equal lengths")]
    fn test_array_area_rejects_ragged_rows() {
        ArrayArea::new(vec![
            vec![EvalValue::Number(1.0)],
            vec![EvalValue::Number(2.0), EvalValue::Number(3.0)],
        ]);
    }

    #[test]
    fn test_computed_collapses_single_cell_array() {
        let one = ArrayArea::new(vec![vec![EvalValue::Number(7.0)]]);
        match Computed::from_array(one) {
            Computed::Value(EvalValue::Number(n)) => assert_eq!(n, 7.0),
            other => panic!("expected scalar, got {:?}", other),
        }

        let two = ArrayArea::new(vec![vec![EvalValue::Number(1.0), EvalValue::Number(2.0)]]);
        assert!(matches!(Computed::from_array(two), Computed::Array(_)));
    }
}
