//! User-defined function lookup
//!
//! Host code registers custom and add-in functions by name; the evaluator
//! consults the session's finder after the built-in registry. A name no
//! finder recognizes is spreadsheet data (`#NAME?`), never an internal
//! error.

use std::collections::HashMap;

use super::FunctionDef;

/// A source of user-defined functions
pub trait UdfFinder: Send + Sync {
    /// Look up a function by name (case-insensitive), or `None`
    fn find(&self, name: &str) -> Option<&FunctionDef>;
}

/// Tries a list of finders in order; the first match wins
#[derive(Default)]
pub struct AggregatingUdfFinder {
    finders: Vec<Box<dyn UdfFinder>>,
}

impl AggregatingUdfFinder {
    /// Create an aggregator with no registered finders
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finder; earlier finders take precedence
    pub fn add(&mut self, finder: Box<dyn UdfFinder>) {
        self.finders.push(finder);
    }
}

impl UdfFinder for AggregatingUdfFinder {
    fn find(&self, name: &str) -> Option<&FunctionDef> {
        self.finders.iter().find_map(|f| f.find(name))
    }
}

/// A finder that also assigns each function a stable small index
///
/// Indices come from a monotonic counter at registration time, so they are
/// collision-free and consistent for the finder's lifetime; a name is never
/// hashed into an index.
#[derive(Default)]
pub struct IndexedUdfFinder {
    defs: Vec<FunctionDef>,
    by_name: HashMap<String, usize>,
}

impl IndexedUdfFinder {
    /// Create an empty indexed finder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, returning its assigned index
    ///
    /// Re-registering a name replaces the definition but keeps the index.
    pub fn register(&mut self, def: FunctionDef) -> usize {
        let key = def.name.to_uppercase();
        match self.by_name.get(&key) {
            Some(&index) => {
                self.defs[index] = def;
                index
            }
            None => {
                let index = self.defs.len();
                self.defs.push(def);
                self.by_name.insert(key, index);
                index
            }
        }
    }

    /// The index assigned to a name, if registered
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_uppercase()).copied()
    }

    /// Look up a function by its assigned index
    pub fn by_index(&self, index: usize) -> Option<&FunctionDef> {
        self.defs.get(index)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no functions are registered
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl UdfFinder for IndexedUdfFinder {
    fn find(&self, name: &str) -> Option<&FunctionDef> {
        self.index_of(name).and_then(|i| self.by_index(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Computed, Operand};
    use crate::error::EvalResult;
    use crate::evaluator::EvalContext;
    use crate::functions::FunctionImpl;
    use crate::value::EvalValue;

    fn fn_one(_args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
        Ok(Computed::Value(EvalValue::Number(1.0)))
    }

    fn fn_two(_args: &[Operand<'_>], _ctx: &EvalContext<'_>) -> EvalResult<Computed> {
        Ok(Computed::Value(EvalValue::Number(2.0)))
    }

    fn def(name: &'static str, implementation: FunctionImpl) -> FunctionDef {
        FunctionDef {
            name,
            min_args: 0,
            max_args: Some(0),
            implementation,
            volatile: false,
        }
    }

    #[test]
    fn test_indexed_finder_monotonic_indices() {
        let mut finder = IndexedUdfFinder::new();
        assert_eq!(finder.register(def("ALPHA", fn_one)), 0);
        assert_eq!(finder.register(def("BETA", fn_one)), 1);
        assert_eq!(finder.index_of("alpha"), Some(0));
        assert_eq!(finder.index_of("BETA"), Some(1));
        assert_eq!(finder.index_of("GAMMA"), None);
        assert_eq!(finder.by_index(1).unwrap().name, "BETA");
    }

    #[test]
    fn test_indexed_finder_reregister_keeps_index() {
        let mut finder = IndexedUdfFinder::new();
        finder.register(def("ALPHA", fn_one));
        finder.register(def("BETA", fn_one));
        assert_eq!(finder.register(def("ALPHA", fn_two)), 0);
        assert_eq!(finder.len(), 2);
        let got = finder.find("ALPHA").unwrap();
        let expected: FunctionImpl = fn_two;
        assert_eq!(got.implementation as usize, expected as usize);
    }

    #[test]
    fn test_aggregator_first_match_wins() {
        let mut a = IndexedUdfFinder::new();
        a.register(def("SHARED", fn_one));
        let mut b = IndexedUdfFinder::new();
        b.register(def("SHARED", fn_two));
        b.register(def("ONLY_B", fn_two));

        let mut agg = AggregatingUdfFinder::new();
        agg.add(Box::new(a));
        agg.add(Box::new(b));

        let shared = agg.find("SHARED").unwrap();
        let expected: FunctionImpl = fn_one;
        assert_eq!(shared.implementation as usize, expected as usize);
        assert!(agg.find("ONLY_B").is_some());
        assert!(agg.find("NOWHERE").is_none());
    }
}
