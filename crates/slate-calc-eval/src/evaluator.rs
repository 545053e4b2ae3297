//! Expression evaluator
//!
//! Walks a parsed [`Expr`] synchronously and recursively against an
//! [`EvalContext`]. References evaluate to lazy views; operators and
//! functions pull their operands through the resolution layer and may enter
//! the array path when an operand spans multiple cells.

use slate_calc_core::{BinaryOperator, CellError, Expr};

use crate::area::{AreaView, ArrayArea, Computed, Operand, Region, RefView, SheetArea};
use crate::error::{EvalError, EvalResult};
use crate::functions::{FunctionRegistry, UdfFinder};
use crate::operators::{self, ArithmeticOp, RelationalOp};
use crate::resolve;
use crate::value::EvalValue;

/// The cell-value provider capability backing an evaluation
///
/// Implementations layer whatever storage they like behind this surface
/// (a plain workbook, a what-if overlay); dependent formula cells must be
/// resolved to values by the implementation before they are handed back.
pub trait ValueSource {
    /// Resolve a sheet name to its index
    fn sheet_index(&self, name: &str) -> Option<usize>;

    /// The current value of a cell; Blank for cells that do not exist
    fn value_at(&self, sheet: usize, row: u32, col: u16) -> EvalValue;

    /// Look up a defined name, if any
    fn name_expr(&self, name: &str) -> Option<&Expr>;
}

/// Context for one formula evaluation
///
/// Carries the value source, the function registry (an explicit per-session
/// instance, never a global), an optional UDF finder, and the evaluating
/// cell's coordinates for implicit intersection.
pub struct EvalContext<'a> {
    /// Cell-value provider
    pub source: &'a dyn ValueSource,
    /// Built-in function table
    pub functions: &'a FunctionRegistry,
    /// Host-registered functions, consulted after the built-ins
    pub udfs: Option<&'a dyn UdfFinder>,
    /// Sheet of the evaluating cell
    pub sheet: usize,
    /// Row of the evaluating cell
    pub row: u32,
    /// Column of the evaluating cell
    pub col: u16,
    /// Whether this formula was entered as an array formula
    pub array_context: bool,
}

impl<'a> EvalContext<'a> {
    /// Create a context for an ordinary (non-array) evaluation
    pub fn new(
        source: &'a dyn ValueSource,
        functions: &'a FunctionRegistry,
        sheet: usize,
        row: u32,
        col: u16,
    ) -> Self {
        Self {
            source,
            functions,
            udfs: None,
            sheet,
            row,
            col,
            array_context: false,
        }
    }

    /// Attach a UDF finder
    pub fn with_udfs(mut self, udfs: &'a dyn UdfFinder) -> Self {
        self.udfs = Some(udfs);
        self
    }

    /// Mark the evaluation as array-entered
    pub fn with_array_context(mut self, array_context: bool) -> Self {
        self.array_context = array_context;
        self
    }
}

/// Evaluate a formula to its final result
///
/// A single reference dereferences to the cell's value. An area result is
/// materialized in array context and collapsed through implicit
/// intersection otherwise. Spreadsheet-level failures come back as error
/// values; an `Err` is a contract violation in the calling layer.
pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> EvalResult<Computed> {
    let operand = evaluate_operand(expr, ctx)?;
    Ok(match operand {
        Operand::Value(v) => Computed::Value(v),
        Operand::Ref(r) => Computed::Value(r.value()),
        Operand::Area(area) => {
            if ctx.array_context {
                Computed::from_array(area.materialize())
            } else {
                match resolve::single_value(&Operand::Area(area), ctx.row, ctx.col) {
                    Ok(v) => Computed::Value(v),
                    Err(e) => Computed::Value(EvalValue::Error(e)),
                }
            }
        }
    })
}

/// Evaluate a sub-expression to an operand, leaving references unresolved
pub fn evaluate_operand<'a>(expr: &Expr, ctx: &EvalContext<'a>) -> EvalResult<Operand<'a>> {
    match expr {
        // === Literals ===
        Expr::Number(n) => Ok(Operand::Value(EvalValue::Number(*n))),
        Expr::Text(s) => Ok(Operand::Value(EvalValue::Text(s.clone()))),
        Expr::Bool(b) => Ok(Operand::Value(EvalValue::Bool(*b))),
        Expr::Error(e) => Ok(Operand::Value(EvalValue::Error(*e))),
        Expr::Missing => Ok(Operand::Value(EvalValue::Missing)),

        // === References ===
        Expr::CellRef { sheet, row, col } => match resolve_sheet(sheet.as_deref(), ctx) {
            Some(sheet) => Ok(Operand::Ref(RefView::new(sheet, *row, *col, ctx.source))),
            None => Ok(Operand::Value(EvalValue::Error(CellError::Ref))),
        },

        Expr::RangeRef { sheet, range } => match resolve_sheet(sheet.as_deref(), ctx) {
            Some(sheet) => Ok(Operand::Area(AreaView::Sheet(SheetArea::new(
                sheet,
                Region::from(*range),
                ctx.source,
            )))),
            None => Ok(Operand::Value(EvalValue::Error(CellError::Ref))),
        },

        Expr::Name(name) => match ctx.source.name_expr(name) {
            Some(bound) => evaluate_operand(bound, ctx),
            None => Ok(Operand::Value(EvalValue::Error(CellError::Name))),
        },

        // === Operators ===
        Expr::Unary { op, operand } => {
            let operand = evaluate_operand(operand, ctx)?;
            Ok(Operand::Value(operators::eval_unary(
                *op, &operand, ctx.row, ctx.col,
            )))
        }

        Expr::Binary { op, lhs, rhs } => {
            let lhs = evaluate_operand(lhs, ctx)?;
            let rhs = evaluate_operand(rhs, ctx)?;
            evaluate_binary(*op, lhs, rhs, ctx)
        }

        // === Functions ===
        Expr::Call { name, args } => dispatch_function(name, args, ctx),

        // === Array literal ===
        Expr::Array(rows) => {
            if rows.is_empty() || rows[0].is_empty() {
                return Err(EvalError::EmptyArray);
            }
            let width = rows[0].len();
            if rows.iter().any(|r| r.len() != width) {
                return Err(EvalError::RaggedArray);
            }
            let mut values = Vec::with_capacity(rows.len());
            for row in rows {
                let mut cells = Vec::with_capacity(width);
                for element in row {
                    let operand = evaluate_operand(element, ctx)?;
                    let value = match resolve::single_value(&operand, ctx.row, ctx.col) {
                        Ok(v) => v,
                        Err(e) => EvalValue::Error(e),
                    };
                    cells.push(value);
                }
                values.push(cells);
            }
            Ok(Operand::Area(AreaView::Array(ArrayArea::new(values))))
        }
    }
}

/// Binary-operator dispatch: scalar path or array path
///
/// The array path is chosen when the formula is array-entered and at least
/// one operand spans multiple cells; outside array context a multi-cell
/// operand must survive implicit intersection or the operation fails.
fn evaluate_binary<'a>(
    op: BinaryOperator,
    lhs: Operand<'a>,
    rhs: Operand<'a>,
    ctx: &EvalContext<'a>,
) -> EvalResult<Operand<'a>> {
    let array_path = ctx.array_context && (lhs.is_multi_cell() || rhs.is_multi_cell());

    if let Some(arith) = ArithmeticOp::from_binary(op) {
        if array_path {
            return Ok(operators::eval_arithmetic_array(arith, &lhs, &rhs).into_operand());
        }
        return Ok(Operand::Value(operators::eval_arithmetic_scalar(
            arith, &lhs, &rhs, ctx.row, ctx.col,
        )));
    }

    if let Some(rel) = RelationalOp::from_binary(op) {
        if array_path {
            return Ok(operators::eval_relational_array(rel, &lhs, &rhs).into_operand());
        }
        return Ok(Operand::Value(operators::eval_relational_scalar(
            rel, &lhs, &rhs, ctx.row, ctx.col,
        )));
    }

    debug_assert!(matches!(op, BinaryOperator::Concat));
    Ok(Operand::Value(operators::eval_concat(
        &lhs, &rhs, ctx.row, ctx.col,
    )))
}

/// Function-call dispatch
///
/// Built-ins first, then the session's UDF finder; a name nobody recognizes
/// is `#NAME?`. Argument counts outside the declared range are a bug in the
/// calling layer and fail hard.
fn dispatch_function<'a>(
    name: &str,
    args: &[Expr],
    ctx: &EvalContext<'a>,
) -> EvalResult<Operand<'a>> {
    let def = match ctx
        .functions
        .get(name)
        .or_else(|| ctx.udfs.and_then(|u| u.find(name)))
    {
        Some(def) => def,
        None => return Ok(Operand::Value(EvalValue::Error(CellError::Name))),
    };

    if args.len() < def.min_args {
        return Err(EvalError::Arity {
            function: name.to_uppercase(),
            expected: format!("at least {}", def.min_args),
            actual: args.len(),
        });
    }
    if let Some(max) = def.max_args {
        if args.len() > max {
            return Err(EvalError::Arity {
                function: name.to_uppercase(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    let mut operands = Vec::with_capacity(args.len());
    for arg in args {
        operands.push(evaluate_operand(arg, ctx)?);
    }

    let computed = (def.implementation)(&operands, ctx)?;
    Ok(computed.into_operand())
}

fn resolve_sheet(sheet: Option<&str>, ctx: &EvalContext<'_>) -> Option<usize> {
    match sheet {
        Some(name) => ctx.source.sheet_index(name),
        None => Some(ctx.sheet),
    }
}
