//! Convenience re-exports for common usage
//!
//! ```rust
//! use slate_calc::prelude::*;
//! ```

pub use crate::forked::{
    evaluate_cell, ForkedEvaluator, SessionError, SheetScope, StabilityClassifier,
};
pub use slate_calc_core::{
    CellAddress, CellError, CellRange, CellValue, Expr, Workbook, Worksheet,
};
pub use slate_calc_eval::{
    EvalContext, EvalValue, FunctionDef, FunctionRegistry, IndexedUdfFinder, UdfFinder,
};
