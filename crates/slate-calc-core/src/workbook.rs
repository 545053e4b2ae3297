//! Workbook type - the main document structure

use ahash::AHashMap;

use crate::error::{Error, Result};
use crate::formula::Expr;
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (spreadsheet document)
///
/// A workbook contains one or more worksheets plus workbook-scoped defined
/// names. Once evaluation sessions have been created over a workbook it must
/// be treated as read-only; that precondition is what makes concurrent
/// sessions safe.
#[derive(Debug)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
    /// Defined names (workbook scope), each bound to a parsed expression
    defined_names: AHashMap<String, Expr>,
}

impl Workbook {
    /// Create a new empty workbook with one worksheet
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.add_worksheet_with_name("Sheet1").unwrap();
        wb
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            defined_names: AHashMap::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get a mutable worksheet by name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|ws| ws.name() == name)
    }

    /// Get the index of a worksheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new worksheet with default name
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;

        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name));

        Ok(index)
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        if self.worksheets[index].name() != new_name {
            self.validate_sheet_name(new_name)?;
        }
        self.worksheets[index].set_name(new_name);
        Ok(())
    }

    // === Defined names ===

    /// Bind a defined name to a parsed expression
    ///
    /// The expression is typically a reference (`Expr::cell_on(..)`,
    /// `Expr::range_on(..)`) or a constant, but any expression is allowed.
    pub fn define_name<S: Into<String>>(&mut self, name: S, expr: Expr) -> Result<()> {
        let name = name.into();
        if name.is_empty() || name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidName(name));
        }
        self.defined_names.insert(name.to_uppercase(), expr);
        Ok(())
    }

    /// Look up a defined name (case-insensitive)
    pub fn name_expr(&self, name: &str) -> Option<&Expr> {
        self.defined_names.get(&name.to_uppercase())
    }

    // === Validation ===

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("empty name".into()));
        }
        if name.len() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "name too long ({} chars, max {})",
                name.len(),
                MAX_SHEET_NAME_LEN
            )));
        }
        if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
            return Err(Error::InvalidSheetName(format!(
                "name contains invalid characters: {}",
                name
            )));
        }
        if self.sheet_index(name).is_some() {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }

    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.sheet_index(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook_has_sheet1() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert_eq!(wb.sheet_index("Sheet1"), Some(0));
    }

    #[test]
    fn test_add_and_lookup_sheets() {
        let mut wb = Workbook::new();
        let idx = wb.add_worksheet_with_name("Inputs").unwrap();
        assert_eq!(idx, 1);
        assert!(wb.worksheet_by_name("Inputs").is_some());
        assert_eq!(wb.sheet_index("Inputs"), Some(1));
        assert_eq!(wb.sheet_index("Missing"), None);
    }

    #[test]
    fn test_duplicate_sheet_name_rejected() {
        let mut wb = Workbook::new();
        assert!(matches!(
            wb.add_worksheet_with_name("Sheet1"),
            Err(Error::DuplicateSheetName(_))
        ));
    }

    #[test]
    fn test_invalid_sheet_names_rejected() {
        let mut wb = Workbook::new();
        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("a/b").is_err());
        assert!(wb
            .add_worksheet_with_name(&"x".repeat(MAX_SHEET_NAME_LEN + 1))
            .is_err());
    }

    #[test]
    fn test_generated_sheet_names() {
        let mut wb = Workbook::new();
        wb.add_worksheet().unwrap();
        assert_eq!(wb.worksheet(1).unwrap().name(), "Sheet2");
    }

    #[test]
    fn test_defined_names() {
        let mut wb = Workbook::new();
        wb.define_name("TaxRate", Expr::num(0.0725)).unwrap();
        assert_eq!(wb.name_expr("TAXRATE"), Some(&Expr::Number(0.0725)));
        assert_eq!(wb.name_expr("taxrate"), Some(&Expr::Number(0.0725)));
        assert!(wb.name_expr("Unknown").is_none());
        assert!(wb.define_name("1bad", Expr::num(1.0)).is_err());
    }
}
