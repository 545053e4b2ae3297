//! Evaluation error types
//!
//! Spreadsheet-level failures are *values*: they travel as
//! [`CellError`](slate_calc_core::CellError) inside
//! [`EvalValue`](crate::value::EvalValue) through the normal return path, so
//! `=A1+1` where A1 holds `#REF!` produces `#REF!` instead of aborting.
//! [`EvalError`] is reserved for programming-contract violations in the
//! calling layer.

use thiserror::Error;

use slate_calc_core::CellError;

/// Result type for hard (contract-violation) evaluation failures
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Result type for per-operand resolution and coercion
///
/// An `Err` here is spreadsheet data, not a fault: the nearest operator or
/// function boundary converts it back into an error value.
pub type ValueResult<T> = std::result::Result<T, CellError>;

/// Programming-contract violations raised by the evaluator
///
/// These indicate a bug in the calling layer, not a spreadsheet-data
/// problem, and are not expected to be caught by formula-level logic.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Wrong number of arguments in a function call
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Array literal with rows of differing lengths
    #[error("Array literal rows have differing lengths")]
    RaggedArray,

    /// Array literal with no cells
    #[error("Array literal must have at least one cell")]
    EmptyArray,
}
