//! Evaluation-time value model

use std::fmt;

use slate_calc_core::{CellError, CellValue};

/// A scalar value during formula evaluation
///
/// Every dispatch site (coercion, comparison, collection) matches this enum
/// exhaustively, so adding a variant breaks compilation everywhere it
/// matters rather than falling through a default arm.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    /// Numeric value
    Number(f64),
    /// String value
    Text(String),
    /// Boolean value (TRUE/FALSE)
    Bool(bool),
    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),
    /// An empty cell; distinct from the empty string
    Blank,
    /// An omitted optional function argument; distinct from Blank
    Missing,
}

impl EvalValue {
    /// Check if this is a blank cell value
    pub fn is_blank(&self) -> bool {
        matches!(self, EvalValue::Blank)
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, EvalValue::Error(_))
    }

    /// Get the error code if this is one
    pub fn error(&self) -> Option<CellError> {
        match self {
            EvalValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Canonical text rendering
    ///
    /// Integral numbers render without a fractional part; booleans render
    /// TRUE/FALSE; blank and missing render empty.
    pub fn to_text(&self) -> String {
        match self {
            EvalValue::Number(n) => number_to_text(*n),
            EvalValue::Text(s) => s.clone(),
            EvalValue::Bool(true) => "TRUE".to_string(),
            EvalValue::Bool(false) => "FALSE".to_string(),
            EvalValue::Error(e) => e.to_string(),
            EvalValue::Blank | EvalValue::Missing => String::new(),
        }
    }

    /// Convert a stored (non-formula) cell value
    ///
    /// Returns `None` for formula cells: those must be evaluated by the
    /// session layer, never converted directly.
    pub fn from_cell_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Empty => Some(EvalValue::Blank),
            CellValue::Number(n) => Some(EvalValue::Number(*n)),
            CellValue::String(s) => Some(EvalValue::Text(s.as_str().to_string())),
            CellValue::Boolean(b) => Some(EvalValue::Bool(*b)),
            CellValue::Error(e) => Some(EvalValue::Error(*e)),
            CellValue::Formula(_) => None,
        }
    }
}

/// Render a number the way a cell shows it
pub fn number_to_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<f64> for EvalValue {
    fn from(n: f64) -> Self {
        EvalValue::Number(n)
    }
}

impl From<bool> for EvalValue {
    fn from(b: bool) -> Self {
        EvalValue::Bool(b)
    }
}

impl From<&str> for EvalValue {
    fn from(s: &str) -> Self {
        EvalValue::Text(s.to_string())
    }
}

impl From<CellError> for EvalValue {
    fn from(e: CellError) -> Self {
        EvalValue::Error(e)
    }
}
