//! End-to-end tests for forked what-if sessions

use std::sync::Arc;

use pretty_assertions::assert_eq;
use slate_calc::prelude::*;

/// Master workbook shared by most tests:
/// `Inputs!A1 = 2`, `Inputs!B1 = 3`,
/// `Calculations!A1 = B1 * Inputs!A1 - Inputs!B1`, `Calculations!B1 = 5`
fn build_master() -> Workbook {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Inputs").unwrap();
    wb.add_worksheet_with_name("Calculations").unwrap();

    let inputs = wb.worksheet_by_name_mut("Inputs").unwrap();
    inputs.set_cell_value("A1", 2.0).unwrap();
    inputs.set_cell_value("B1", 3.0).unwrap();

    let calc = wb.worksheet_by_name_mut("Calculations").unwrap();
    calc.set_cell_formula(
        "A1",
        Expr::sub(
            Expr::mul(
                Expr::cell("B1").unwrap(),
                Expr::cell_on("Inputs", "A1").unwrap(),
            ),
            Expr::cell_on("Inputs", "B1").unwrap(),
        ),
    )
    .unwrap();
    calc.set_cell_value("B1", 5.0).unwrap();
    wb
}

fn calculations_only(wb: &Workbook) -> Arc<dyn StabilityClassifier> {
    Arc::new(SheetScope::new(wb, &["Calculations"]).unwrap())
}

fn number(value: EvalValue) -> f64 {
    match value {
        EvalValue::Number(n) => n,
        other => panic!("expected number, got {:?}", other),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}

#[test]
fn two_sessions_stay_isolated() {
    let wb = build_master();
    let classifier = calculations_only(&wb);

    let mut fe1 = ForkedEvaluator::create(&wb, Some(classifier.clone()));
    let mut fe2 = ForkedEvaluator::create(&wb, Some(classifier));

    fe1.update_cell("Inputs", 0, 0, 4.0).unwrap();
    fe1.update_cell("Inputs", 0, 1, 1.1).unwrap();
    fe2.update_cell("Inputs", 0, 0, 1.2).unwrap();
    fe2.update_cell("Inputs", 0, 1, 2.0).unwrap();

    // 5 * 4 - 1.1
    assert_close(number(fe1.evaluate("Calculations", 0, 0).unwrap()), 18.9);
    // 5 * 1.2 - 2.0
    assert_close(number(fe2.evaluate("Calculations", 0, 0).unwrap()), 4.0);

    // Re-evaluating one session is not affected by the other
    assert_close(number(fe1.evaluate("Calculations", 0, 0).unwrap()), 18.9);

    // The master's own values never moved: 5 * 2 - 3
    assert_close(
        number(evaluate_cell(&wb, "Calculations", 0, 0).unwrap()),
        7.0,
    );
}

#[test]
fn sessions_evaluate_concurrently() {
    let wb = build_master();
    let classifier = calculations_only(&wb);

    std::thread::scope(|scope| {
        for worker in 0..4u32 {
            let wb = &wb;
            let classifier = classifier.clone();
            scope.spawn(move || {
                let mut fe = ForkedEvaluator::create(wb, Some(classifier));
                for step in 0..200u32 {
                    let a = (worker * 1000 + step) as f64;
                    let b = step as f64 / 7.0;
                    fe.update_cell("Inputs", 0, 0, a).unwrap();
                    fe.update_cell("Inputs", 0, 1, b).unwrap();
                    let got = number(fe.evaluate("Calculations", 0, 0).unwrap());
                    let expected = 5.0 * a - b;
                    assert!(
                        (got - expected).abs() < 1e-9,
                        "worker {} step {}: expected {} got {}",
                        worker,
                        step,
                        expected,
                        got
                    );
                }
            });
        }
    });
}

#[test]
fn update_on_missing_cell_is_reportable() {
    let wb = build_master();
    let mut fe = ForkedEvaluator::create(&wb, None);

    // Row 9 was never created in the master
    let err = fe.update_cell("Inputs", 9, 0, 1.0).unwrap_err();
    match err {
        SessionError::MissingCell { sheet, row, col } => {
            assert_eq!(sheet, "Inputs");
            assert_eq!(row, 9);
            assert_eq!(col, 0);
        }
        other => panic!("expected MissingCell, got {:?}", other),
    }

    // The session survives the rejected update
    assert_close(number(fe.evaluate("Calculations", 0, 0).unwrap()), 7.0);
    // And a missing cell still *evaluates* as blank, which is different
    // from the update failure above
    assert_eq!(fe.evaluate("Inputs", 9, 0).unwrap(), EvalValue::Blank);
}

#[test]
fn dependent_formula_chains_resolve_through_overlay() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet
        .set_cell_formula(
            "A2",
            Expr::mul(Expr::cell("A1").unwrap(), Expr::num(2.0)),
        )
        .unwrap();
    sheet
        .set_cell_formula(
            "A3",
            Expr::add(Expr::cell("A2").unwrap(), Expr::cell("A1").unwrap()),
        )
        .unwrap();

    let mut fe = ForkedEvaluator::create(&wb, None);
    assert_eq!(fe.evaluate("Sheet1", 2, 0).unwrap(), EvalValue::Number(3.0));

    fe.update_cell("Sheet1", 0, 0, 10.0).unwrap();
    assert_eq!(
        fe.evaluate("Sheet1", 2, 0).unwrap(),
        EvalValue::Number(30.0)
    );
}

#[test]
fn error_values_flow_through_sessions() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet
        .set_cell_formula(
            "B1",
            Expr::div(Expr::num(1.0), Expr::cell("A1").unwrap()),
        )
        .unwrap();
    sheet
        .set_cell_formula("C1", Expr::add(Expr::cell("B1").unwrap(), Expr::num(1.0)))
        .unwrap();

    let mut fe = ForkedEvaluator::create(&wb, None);
    assert_eq!(fe.evaluate("Sheet1", 0, 2).unwrap(), EvalValue::Number(2.0));

    // Zero divisor: the error shows up as the dependent cell's value and
    // corrupts nothing else
    fe.update_cell("Sheet1", 0, 0, 0.0).unwrap();
    assert_eq!(
        fe.evaluate("Sheet1", 0, 1).unwrap(),
        EvalValue::Error(CellError::Div0)
    );
    assert_eq!(
        fe.evaluate("Sheet1", 0, 2).unwrap(),
        EvalValue::Error(CellError::Div0)
    );
    assert_eq!(fe.evaluate("Sheet1", 0, 0).unwrap(), EvalValue::Number(0.0));
}

#[test]
fn overlay_accepts_all_plain_value_kinds() {
    let wb = build_master();
    let mut fe = ForkedEvaluator::create(&wb, None);

    fe.update_cell("Inputs", 0, 0, "not a number").unwrap();
    assert_eq!(
        fe.evaluate("Calculations", 0, 0).unwrap(),
        EvalValue::Error(CellError::Value)
    );

    fe.update_cell("Inputs", 0, 0, true).unwrap();
    // TRUE coerces to 1: 5 * 1 - 3
    assert_close(number(fe.evaluate("Calculations", 0, 0).unwrap()), 2.0);
}

#[test]
fn session_udfs_are_per_session() {
    fn fn_answer(
        _args: &[slate_calc::Operand<'_>],
        _ctx: &EvalContext<'_>,
    ) -> Result<slate_calc::Computed, slate_calc::EvalError> {
        Ok(slate_calc::Computed::Value(EvalValue::Number(42.0)))
    }

    let mut wb = Workbook::new();
    wb.worksheet_mut(0)
        .unwrap()
        .set_cell_formula("A1", Expr::call("ANSWER", vec![]))
        .unwrap();

    let mut with_udf = ForkedEvaluator::create(&wb, None);
    with_udf.functions_mut().register(FunctionDef {
        name: "ANSWER",
        min_args: 0,
        max_args: Some(0),
        implementation: fn_answer,
        volatile: false,
    });
    assert_eq!(
        with_udf.evaluate("Sheet1", 0, 0).unwrap(),
        EvalValue::Number(42.0)
    );

    // A session without the registration sees an unrecognized name
    let without_udf = ForkedEvaluator::create(&wb, None);
    assert_eq!(
        without_udf.evaluate("Sheet1", 0, 0).unwrap(),
        EvalValue::Error(CellError::Name)
    );
}
