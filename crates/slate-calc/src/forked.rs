//! Forked "what-if" evaluation sessions
//!
//! A [`ForkedEvaluator`] binds an independent evaluation session to one
//! shared, read-only master workbook. Each session owns a private overlay of
//! input-cell values and a private result cache, so any number of sessions
//! can evaluate concurrently on separate threads without locking the master.
//! The master must not be mutated while sessions exist; that precondition is
//! documented, not enforced by the type system.

use std::cell::RefCell;
use std::sync::Arc;

use ahash::AHashMap;
use thiserror::Error;

use slate_calc_core::{CellValue, Expr, Workbook};
use slate_calc_eval::{
    evaluate, Computed, EvalContext, EvalError, EvalValue, FunctionRegistry, TwoD, UdfFinder,
    ValueSource,
};

/// (sheet, row, col) coordinate of a master cell
type CellKey = (usize, u32, u16);

/// Errors reported by the session API
///
/// These are contract-level failures in the calling layer; spreadsheet-level
/// failures come back as error values from [`ForkedEvaluator::evaluate`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Sheet name does not exist in the master workbook
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// Update targeted a coordinate with no corresponding master cell
    ///
    /// The overlay is keyed by identity of an existing master cell, so
    /// updating a missing cell is rejected rather than silently creating
    /// one.
    #[error("No master cell at {sheet}!({row},{col})")]
    MissingCell { sheet: String, row: u32, col: u16 },

    /// Overlay values must be plain values, not formulas
    #[error("Cannot overlay a formula; update cells with plain values")]
    FormulaOverlay,

    /// The requested cell's formula violated an evaluation contract
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Distinguishes immutable "calculation" cells from mutable input cells
///
/// Cells classified final are eligible for result caching within a session;
/// everything else is re-read (and re-evaluated) on every dependent lookup.
pub trait StabilityClassifier: Send + Sync {
    /// Whether the cell's content will never change via `update_cell`
    fn is_cell_final(&self, sheet: usize, row: u32, col: u16) -> bool;
}

impl<F> StabilityClassifier for F
where
    F: Fn(usize, u32, u16) -> bool + Send + Sync,
{
    fn is_cell_final(&self, sheet: usize, row: u32, col: u16) -> bool {
        self(sheet, row, col)
    }
}

/// Classifier marking whole sheets as final
///
/// The usual setup keeps mutable inputs on one designated sheet and marks
/// every other sheet final.
pub struct SheetScope {
    final_sheets: Vec<usize>,
}

impl SheetScope {
    /// Mark the named sheets final
    pub fn new(workbook: &Workbook, sheet_names: &[&str]) -> Result<Self, SessionError> {
        let mut final_sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let index = workbook
                .sheet_index(name)
                .ok_or_else(|| SessionError::UnknownSheet(name.to_string()))?;
            final_sheets.push(index);
        }
        Ok(Self { final_sheets })
    }
}

impl StabilityClassifier for SheetScope {
    fn is_cell_final(&self, sheet: usize, _row: u32, _col: u16) -> bool {
        self.final_sheets.contains(&sheet)
    }
}

/// An isolated evaluation session over a shared master workbook
pub struct ForkedEvaluator<'a> {
    master: &'a Workbook,
    classifier: Option<Arc<dyn StabilityClassifier>>,
    functions: FunctionRegistry,
    udfs: Option<Box<dyn UdfFinder>>,
    /// Per-session mutable overlay, read-through over the master
    overlay: AHashMap<CellKey, CellValue>,
    /// Private result cache for cells the classifier marks final
    cache: RefCell<AHashMap<CellKey, EvalValue>>,
}

impl<'a> ForkedEvaluator<'a> {
    /// Bind a new independent session to a shared master workbook
    ///
    /// Passing no classifier disables result caching entirely.
    pub fn create(
        master: &'a Workbook,
        classifier: Option<Arc<dyn StabilityClassifier>>,
    ) -> Self {
        tracing::debug!(
            sheets = master.sheet_count(),
            caching = classifier.is_some(),
            "created forked evaluation session"
        );
        Self {
            master,
            classifier,
            functions: FunctionRegistry::new(),
            udfs: None,
            overlay: AHashMap::new(),
            cache: RefCell::new(AHashMap::new()),
        }
    }

    /// Attach a finder for host-registered functions
    pub fn with_udf_finder(mut self, udfs: Box<dyn UdfFinder>) -> Self {
        self.udfs = Some(udfs);
        self
    }

    /// The session's own function registry, for per-session registration
    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Install a value into this session's private overlay
    ///
    /// The target coordinate must hold a cell in the master workbook;
    /// updating a missing cell is rejected. A successful update invalidates
    /// this session's result cache. The master is never touched.
    pub fn update_cell<V: Into<CellValue>>(
        &mut self,
        sheet_name: &str,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<(), SessionError> {
        let sheet = self.sheet_named(sheet_name)?;
        let worksheet = self
            .master
            .worksheet(sheet)
            .ok_or_else(|| SessionError::UnknownSheet(sheet_name.to_string()))?;
        if !worksheet.has_cell_at(row, col) {
            tracing::warn!(
                sheet = sheet_name,
                row,
                col,
                "rejected update: no corresponding master cell"
            );
            return Err(SessionError::MissingCell {
                sheet: sheet_name.to_string(),
                row,
                col,
            });
        }

        let value = value.into();
        if value.is_formula() {
            return Err(SessionError::FormulaOverlay);
        }

        self.overlay.insert((sheet, row, col), value);
        // Dependencies are not tracked per cell; a changed input simply
        // drops every cached result in this session.
        self.cache.borrow_mut().clear();
        Ok(())
    }

    /// Evaluate a cell as seen through this session's overlay
    ///
    /// Spreadsheet-level failures come back as error values; an `Err` means
    /// the calling layer violated a contract (unknown sheet, malformed
    /// formula).
    pub fn evaluate(
        &self,
        sheet_name: &str,
        row: u32,
        col: u16,
    ) -> Result<EvalValue, SessionError> {
        let sheet = self.sheet_named(sheet_name)?;
        Ok(self.cell_eval_value(sheet, row, col)?)
    }

    fn sheet_named(&self, sheet_name: &str) -> Result<usize, SessionError> {
        self.master
            .sheet_index(sheet_name)
            .ok_or_else(|| SessionError::UnknownSheet(sheet_name.to_string()))
    }

    /// The value of a cell through overlay, master value, or formula
    fn cell_eval_value(&self, sheet: usize, row: u32, col: u16) -> Result<EvalValue, EvalError> {
        if let Some(value) = self.overlay.get(&(sheet, row, col)) {
            // update_cell rejects formulas, so this conversion cannot miss
            return Ok(EvalValue::from_cell_value(value).expect("overlay holds plain values"));
        }

        let cell = self
            .master
            .worksheet(sheet)
            .and_then(|ws| ws.cell_at(row, col));
        match cell {
            None => Ok(EvalValue::Blank),
            Some(CellValue::Formula(expr)) => self.evaluate_formula(sheet, row, col, expr),
            Some(plain) => {
                Ok(EvalValue::from_cell_value(plain).expect("formula variant handled above"))
            }
        }
    }

    fn evaluate_formula(
        &self,
        sheet: usize,
        row: u32,
        col: u16,
        expr: &Expr,
    ) -> Result<EvalValue, EvalError> {
        let key = (sheet, row, col);
        let cacheable =
            self.is_final(sheet, row, col) && !formula_is_volatile(expr, &self.functions);

        if cacheable {
            if let Some(value) = self.cache.borrow().get(&key) {
                return Ok(value.clone());
            }
        }

        let mut ctx = EvalContext::new(self, &self.functions, sheet, row, col);
        if let Some(udfs) = self.udfs.as_deref() {
            ctx = ctx.with_udfs(udfs);
        }
        let value = match evaluate(expr, &ctx)? {
            Computed::Value(v) => v,
            // Non-array-entered evaluation; an array-valued function result
            // stores its top-left cell
            Computed::Array(a) => a.value_at(0, 0),
        };

        if cacheable {
            self.cache.borrow_mut().insert(key, value.clone());
        }
        Ok(value)
    }

    fn is_final(&self, sheet: usize, row: u32, col: u16) -> bool {
        self.classifier
            .as_ref()
            .is_some_and(|c| c.is_cell_final(sheet, row, col))
    }
}

impl ValueSource for ForkedEvaluator<'_> {
    fn sheet_index(&self, name: &str) -> Option<usize> {
        self.master.sheet_index(name)
    }

    fn value_at(&self, sheet: usize, row: u32, col: u16) -> EvalValue {
        match self.cell_eval_value(sheet, row, col) {
            Ok(value) => value,
            // A malformed stored formula is a bug in the host layer, on par
            // with out-of-range area access
            Err(e) => panic!(
                "invalid formula in dependent cell ({}, {}, {}): {}",
                sheet, row, col, e
            ),
        }
    }

    fn name_expr(&self, name: &str) -> Option<&Expr> {
        self.master.name_expr(name)
    }
}

/// One-shot evaluation of a single cell against the master workbook
///
/// Equivalent to a fresh session with no overlay and no caching.
pub fn evaluate_cell(
    workbook: &Workbook,
    sheet_name: &str,
    row: u32,
    col: u16,
) -> Result<EvalValue, SessionError> {
    ForkedEvaluator::create(workbook, None).evaluate(sheet_name, row, col)
}

/// Whether any function called by the formula is volatile
fn formula_is_volatile(expr: &Expr, functions: &FunctionRegistry) -> bool {
    let mut volatile = false;
    expr.for_each_call_name(&mut |name| {
        if let Some(def) = functions.get(name) {
            volatile |= def.volatile;
        }
    });
    volatile
}
