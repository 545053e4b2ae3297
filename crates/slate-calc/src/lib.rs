//! # slate-calc
//!
//! A spreadsheet formula evaluation engine with isolated "what-if" sessions.
//!
//! The workspace splits into three layers, re-exported here:
//! - `slate-calc-core` - cell values, error codes, addressing, the
//!   parsed-formula representation, and the master workbook model
//! - `slate-calc-eval` - the evaluation engine: coercion, comparison,
//!   scalar/array operators, and function dispatch
//! - this crate - [`ForkedEvaluator`] sessions layering private input
//!   overlays over one shared, read-only master workbook
//!
//! ## Example
//!
//! ```rust
//! use slate_calc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 20.0).unwrap();
//! sheet
//!     .set_cell_formula(
//!         "A3",
//!         Expr::add(Expr::cell("A1").unwrap(), Expr::cell("A2").unwrap()),
//!     )
//!     .unwrap();
//!
//! let result = evaluate_cell(&workbook, "Sheet1", 2, 0).unwrap();
//! assert_eq!(result, EvalValue::Number(30.0));
//! ```
//!
//! ## What-if sessions
//!
//! ```rust
//! use slate_calc::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 2.0).unwrap();
//! sheet
//!     .set_cell_formula("B1", Expr::mul(Expr::cell("A1").unwrap(), Expr::num(10.0)))
//!     .unwrap();
//!
//! let mut session = ForkedEvaluator::create(&workbook, None);
//! session.update_cell("Sheet1", 0, 0, 7.0).unwrap();
//! assert_eq!(
//!     session.evaluate("Sheet1", 0, 1).unwrap(),
//!     EvalValue::Number(70.0)
//! );
//! // The master workbook itself is never mutated.
//! ```

pub mod forked;
pub mod prelude;

pub use forked::{
    evaluate_cell, ForkedEvaluator, SessionError, SheetScope, StabilityClassifier,
};

// Re-export the data model and engine layers
pub use slate_calc_core::{
    BinaryOperator, CellAddress, CellError, CellRange, CellValue, Error, Expr, Result,
    SharedString, UnaryOperator, Workbook, Worksheet,
};
pub use slate_calc_eval::{
    evaluate, AggregatingUdfFinder, AreaView, ArrayArea, Computed, EvalContext, EvalError,
    EvalValue, FunctionDef, FunctionRegistry, IndexedUdfFinder, Operand, RefView, Region,
    SheetArea, TwoD, UdfFinder, ValueSource,
};
