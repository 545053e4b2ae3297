//! Value comparison
//!
//! A strict total order across mixed scalar kinds, used by the relational
//! operators and by sort-dependent functions. Both operands must already be
//! resolved: an error value reaching the comparator is a caller bug.

use std::cmp::Ordering;

use crate::value::EvalValue;

/// Compare two resolved scalars, Excel-style
///
/// Returns a negative, zero, or positive integer. When kinds differ the
/// type rank decides: Boolean > String > Number. Blanks and missing
/// arguments compare equal to each other and against the other kind's zero
/// value.
///
/// # Panics
/// Panics when either operand is an unresolved error value; resolution must
/// have normalized operands first.
pub fn compare(a: &EvalValue, b: &EvalValue) -> i32 {
    match (a, b) {
        (EvalValue::Blank | EvalValue::Missing, EvalValue::Blank | EvalValue::Missing) => 0,
        (EvalValue::Blank | EvalValue::Missing, other) => compare_blank(other),
        (other, EvalValue::Blank | EvalValue::Missing) => -compare_blank(other),

        (EvalValue::Number(l), EvalValue::Number(r)) => compare_numbers(*l, *r),
        (EvalValue::Text(l), EvalValue::Text(r)) => compare_text(l, r),
        (EvalValue::Bool(l), EvalValue::Bool(r)) => (*l as i32) - (*r as i32),

        // Mixed kinds: type rank decides (Boolean > String > Number)
        (l, r) => type_rank(l) - type_rank(r),
    }
}

/// Compare a blank against a non-blank value
///
/// Blank is treated as 0 for numeric comparison, `false` for boolean
/// comparison, and the empty string for string comparison. The result is
/// from the blank's point of view: negative means blank sorts first.
pub fn compare_blank(other: &EvalValue) -> i32 {
    match other {
        EvalValue::Number(n) => compare_numbers(0.0, *n),
        EvalValue::Bool(b) => (false as i32) - (*b as i32),
        EvalValue::Text(s) => {
            if s.is_empty() {
                0
            } else {
                // Empty sorts before any non-empty string
                -1
            }
        }
        EvalValue::Blank | EvalValue::Missing => 0,
        EvalValue::Error(_) => {
            panic!("comparison operand must be resolved: {:?}", other)
        }
    }
}

/// Rank used when comparing across kinds
fn type_rank(v: &EvalValue) -> i32 {
    match v {
        EvalValue::Number(_) => 0,
        EvalValue::Text(_) => 1,
        EvalValue::Bool(_) => 2,
        EvalValue::Blank | EvalValue::Error(_) | EvalValue::Missing => {
            panic!("comparison operand must be resolved: {:?}", v)
        }
    }
}

/// IEEE comparison with `-0.0 == 0.0`
fn compare_numbers(a: f64, b: f64) -> i32 {
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        0
    }
}

/// Culture-invariant, case-insensitive string comparison
fn compare_text(a: &str, b: &str) -> i32 {
    match a.to_lowercase().cmp(&b.to_lowercase()) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> EvalValue {
        EvalValue::Number(n)
    }

    fn text(s: &str) -> EvalValue {
        EvalValue::Text(s.to_string())
    }

    #[test]
    fn test_numbers() {
        assert!(compare(&num(1.0), &num(2.0)) < 0);
        assert!(compare(&num(2.0), &num(1.0)) > 0);
        assert_eq!(compare(&num(1.5), &num(1.5)), 0);
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(compare(&num(-0.0), &num(0.0)), 0);
        assert_eq!(compare(&num(0.0), &num(-0.0)), 0);
    }

    #[test]
    fn test_strings_case_insensitive() {
        assert_eq!(compare(&text("Hello"), &text("hello")), 0);
        assert!(compare(&text("abc"), &text("abd")) < 0);
        assert!(compare(&text("b"), &text("A")) > 0);
    }

    #[test]
    fn test_booleans() {
        assert!(compare(&EvalValue::Bool(false), &EvalValue::Bool(true)) < 0);
        assert_eq!(compare(&EvalValue::Bool(true), &EvalValue::Bool(true)), 0);
    }

    #[test]
    fn test_type_rank_precedence() {
        // Boolean > String > Number, regardless of the values involved
        assert!(compare(&EvalValue::Bool(false), &text("zzz")) > 0);
        assert!(compare(&text(""), &num(1e300)) > 0);
        assert!(compare(&EvalValue::Bool(false), &num(1e300)) > 0);
    }

    #[test]
    fn test_blank_comparisons() {
        assert_eq!(compare(&EvalValue::Blank, &EvalValue::Blank), 0);
        assert_eq!(compare(&EvalValue::Blank, &num(0.0)), 0);
        assert_eq!(compare(&num(0.0), &EvalValue::Blank), 0);
        assert!(compare(&EvalValue::Blank, &num(1.0)) < 0);
        assert!(compare(&EvalValue::Blank, &num(-1.0)) > 0);
        assert_eq!(compare(&EvalValue::Blank, &EvalValue::Bool(false)), 0);
        assert!(compare(&EvalValue::Blank, &EvalValue::Bool(true)) < 0);
        assert_eq!(compare(&EvalValue::Blank, &text("")), 0);
        assert!(compare(&EvalValue::Blank, &text("a")) < 0);
    }

    #[test]
    #[should_panic(expected = "must be resolved")]
    fn test_error_operand_panics() {
        compare(
            &EvalValue::Error(slate_calc_core::CellError::Na),
            &num(1.0),
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn scalar() -> impl Strategy<Value = EvalValue> {
            prop_oneof![
                (-1e12..1e12f64).prop_map(EvalValue::Number),
                "[a-zA-Z]{0,6}".prop_map(EvalValue::Text),
                any::<bool>().prop_map(EvalValue::Bool),
                Just(EvalValue::Blank),
            ]
        }

        proptest! {
            #[test]
            fn prop_compare_antisymmetric(a in scalar(), b in scalar()) {
                prop_assert_eq!(compare(&a, &b), -compare(&b, &a));
            }

            #[test]
            fn prop_compare_reflexive(a in scalar()) {
                prop_assert_eq!(compare(&a, &a), 0);
            }

            #[test]
            fn prop_blank_equals_zero(n in proptest::num::f64::NORMAL) {
                let against_zero = compare(&EvalValue::Blank, &EvalValue::Number(n));
                let zero_cmp = compare(&EvalValue::Number(0.0), &EvalValue::Number(n));
                prop_assert_eq!(against_zero, zero_cmp);
            }
        }
    }

    #[test]
    fn test_antisymmetry_samples() {
        let samples = [
            num(0.0),
            num(-2.5),
            num(7.0),
            text(""),
            text("abc"),
            text("ABD"),
            EvalValue::Bool(false),
            EvalValue::Bool(true),
            EvalValue::Blank,
        ];
        for a in &samples {
            assert_eq!(compare(a, a), 0);
            for b in &samples {
                assert_eq!(compare(a, b), -compare(b, a), "{:?} vs {:?}", a, b);
            }
        }
    }
}
