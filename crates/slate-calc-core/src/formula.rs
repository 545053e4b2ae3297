//! Parsed formula representation
//!
//! Formulas enter the engine already parsed: the tokenizer/parser is a host
//! concern. An [`Expr`] tree is the contract between the host layer and the
//! evaluator, and the builder constructors below let hosts and tests
//! assemble formulas directly.

use crate::cell::{CellAddress, CellError, CellRange};
use crate::error::Result;

/// Formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// String literal
    Text(String),
    /// Boolean literal
    Bool(bool),
    /// Error literal
    Error(CellError),
    /// An omitted optional argument slot, as in `IF(A1,,2)`
    ///
    /// Distinct from a blank cell: only meaningful inside argument lists.
    Missing,

    // === References ===
    /// Single cell reference
    CellRef {
        /// Sheet name; `None` means the evaluating cell's own sheet
        sheet: Option<String>,
        /// 0-based row
        row: u32,
        /// 0-based column
        col: u16,
    },
    /// Rectangular range reference
    RangeRef {
        /// Sheet name; `None` means the evaluating cell's own sheet
        sheet: Option<String>,
        /// The referenced region
        range: CellRange,
    },
    /// Defined name reference
    Name(String),

    // === Operators ===
    /// Binary operation
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    // === Function call ===
    Call { name: String, args: Vec<Expr> },

    // === Array literal ===
    /// 2-D array constant; outer Vec is rows
    Array(Vec<Vec<Expr>>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Text
    Concat,
}

impl BinaryOperator {
    /// Whether this operator is one of the relational (comparison) operators
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }

    /// Whether this operator is one of the arithmetic operators
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Power
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Percent,
}

impl Expr {
    /// Numeric literal
    pub fn num(n: f64) -> Self {
        Expr::Number(n)
    }

    /// String literal
    pub fn text<S: Into<String>>(s: S) -> Self {
        Expr::Text(s.into())
    }

    /// Boolean literal
    pub fn boolean(b: bool) -> Self {
        Expr::Bool(b)
    }

    /// Error literal
    pub fn error(e: CellError) -> Self {
        Expr::Error(e)
    }

    /// Reference to a cell on the evaluating cell's own sheet, by A1 address
    pub fn cell(address: &str) -> Result<Self> {
        let addr = CellAddress::parse(address)?;
        Ok(Expr::CellRef {
            sheet: None,
            row: addr.row,
            col: addr.col,
        })
    }

    /// Reference to a cell on a named sheet, by A1 address
    pub fn cell_on(sheet: &str, address: &str) -> Result<Self> {
        let addr = CellAddress::parse(address)?;
        Ok(Expr::CellRef {
            sheet: Some(sheet.to_string()),
            row: addr.row,
            col: addr.col,
        })
    }

    /// Reference to a cell by 0-based row/column indices
    pub fn cell_at(row: u32, col: u16) -> Self {
        Expr::CellRef {
            sheet: None,
            row,
            col,
        }
    }

    /// Range reference on the evaluating cell's own sheet, by A1:B2 notation
    pub fn range(range: &str) -> Result<Self> {
        Ok(Expr::RangeRef {
            sheet: None,
            range: CellRange::parse(range)?,
        })
    }

    /// Range reference on a named sheet, by A1:B2 notation
    pub fn range_on(sheet: &str, range: &str) -> Result<Self> {
        Ok(Expr::RangeRef {
            sheet: Some(sheet.to_string()),
            range: CellRange::parse(range)?,
        })
    }

    /// Defined-name reference
    pub fn name<S: Into<String>>(name: S) -> Self {
        Expr::Name(name.into())
    }

    /// Function call
    pub fn call<S: Into<String>>(name: S, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// 2-D array literal; outer Vec is rows
    pub fn array(rows: Vec<Vec<Expr>>) -> Self {
        Expr::Array(rows)
    }

    /// Unary negation
    pub fn neg(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }

    /// Percent postfix operator (divides by 100)
    pub fn percent(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOperator::Percent,
            operand: Box::new(operand),
        }
    }

    fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `lhs + rhs`
    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Add, lhs, rhs)
    }

    /// `lhs - rhs`
    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Subtract, lhs, rhs)
    }

    /// `lhs * rhs`
    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Multiply, lhs, rhs)
    }

    /// `lhs / rhs`
    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Divide, lhs, rhs)
    }

    /// `lhs ^ rhs`
    pub fn pow(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Power, lhs, rhs)
    }

    /// `lhs = rhs`
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Equal, lhs, rhs)
    }

    /// `lhs <> rhs`
    pub fn ne(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::NotEqual, lhs, rhs)
    }

    /// `lhs < rhs`
    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::LessThan, lhs, rhs)
    }

    /// `lhs <= rhs`
    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::LessEqual, lhs, rhs)
    }

    /// `lhs > rhs`
    pub fn gt(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::GreaterThan, lhs, rhs)
    }

    /// `lhs >= rhs`
    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::GreaterEqual, lhs, rhs)
    }

    /// `lhs & rhs` (text concatenation)
    pub fn concat(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOperator::Concat, lhs, rhs)
    }

    /// Visit every function-call name in the tree
    pub fn for_each_call_name<F: FnMut(&str)>(&self, f: &mut F) {
        match self {
            Expr::Call { name, args } => {
                f(name);
                for arg in args {
                    arg.for_each_call_name(f);
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.for_each_call_name(f);
                rhs.for_each_call_name(f);
            }
            Expr::Unary { operand, .. } => operand.for_each_call_name(f),
            Expr::Array(rows) => {
                for row in rows {
                    for cell in row {
                        cell.for_each_call_name(f);
                    }
                }
            }
            Expr::Number(_)
            | Expr::Text(_)
            | Expr::Bool(_)
            | Expr::Error(_)
            | Expr::Missing
            | Expr::CellRef { .. }
            | Expr::RangeRef { .. }
            | Expr::Name(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_builder() {
        let expr = Expr::cell("B2").unwrap();
        assert_eq!(
            expr,
            Expr::CellRef {
                sheet: None,
                row: 1,
                col: 1
            }
        );

        let expr = Expr::cell_on("Inputs", "A1").unwrap();
        assert_eq!(
            expr,
            Expr::CellRef {
                sheet: Some("Inputs".into()),
                row: 0,
                col: 0
            }
        );
    }

    #[test]
    fn test_range_builder() {
        let expr = Expr::range("A1:C3").unwrap();
        match expr {
            Expr::RangeRef { sheet: None, range } => {
                assert_eq!(range.row_count(), 3);
                assert_eq!(range.col_count(), 3);
            }
            other => panic!("unexpected expr: {:?}", other),
        }
    }

    #[test]
    fn test_operator_builders() {
        let expr = Expr::add(Expr::num(1.0), Expr::mul(Expr::num(2.0), Expr::num(3.0)));
        match expr {
            Expr::Binary {
                op: BinaryOperator::Add,
                rhs,
                ..
            } => assert!(matches!(
                *rhs,
                Expr::Binary {
                    op: BinaryOperator::Multiply,
                    ..
                }
            )),
            other => panic!("unexpected expr: {:?}", other),
        }
    }

    #[test]
    fn test_for_each_call_name() {
        let expr = Expr::add(
            Expr::call("SUM", vec![Expr::range("A1:A3").unwrap()]),
            Expr::call("IF", vec![Expr::boolean(true), Expr::call("NOW", vec![])]),
        );
        let mut names = Vec::new();
        expr.for_each_call_name(&mut |n| names.push(n.to_string()));
        assert_eq!(names, vec!["SUM", "IF", "NOW"]);
    }

    #[test]
    fn test_operator_classification() {
        assert!(BinaryOperator::Add.is_arithmetic());
        assert!(!BinaryOperator::Add.is_relational());
        assert!(BinaryOperator::LessThan.is_relational());
        assert!(!BinaryOperator::Concat.is_arithmetic());
        assert!(!BinaryOperator::Concat.is_relational());
    }
}
