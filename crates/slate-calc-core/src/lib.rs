//! # slate-calc-core
//!
//! Core data model for the slate-calc formula evaluation engine.
//!
//! This crate provides the fundamental types shared across the workspace:
//! - [`CellValue`] and [`CellError`] - stored cell contents and error codes
//! - [`CellAddress`] and [`CellRange`] - cell addressing and ranges
//! - [`Expr`] - the parsed-formula representation the evaluator consumes
//! - [`Workbook`] and [`Worksheet`] - the master document structure
//!
//! ## Example
//!
//! ```rust
//! use slate_calc_core::{CellValue, Expr, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", 2.0).unwrap();
//! sheet.set_cell_value("B1", 3.0).unwrap();
//! sheet
//!     .set_cell_formula(
//!         "C1",
//!         Expr::add(Expr::cell("A1").unwrap(), Expr::cell("B1").unwrap()),
//!     )
//!     .unwrap();
//!
//! assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(2.0));
//! ```

pub mod cell;
pub mod error;
pub mod formula;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use formula::{BinaryOperator, Expr, UnaryOperator};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
