use jsmorph_core::passes::{
    CompressCommaPass, CompressConditionalPass, ConvertComputedToStaticPass,
    DeadVariableEliminationPass, ExpandBooleanPass, InlineLiteralsPass, InsertDebuggerPass,
    NormalizeIdentifiersPass, UnshortenPass,
};
use jsmorph_core::{RefactorPass, SequentialIdGenerator};
use jsmorph_test_helpers::{assert_tree_eq, session};

#[test]
fn test_deminify_pipeline() {
    let mut session = session(r#"var a = window; a["foo"] = !0 ? 1 : 2;"#);
    let mut passes: Vec<Box<dyn RefactorPass>> = vec![
        Box::new(UnshortenPass::new()),
        Box::new(ConvertComputedToStaticPass::new()),
        Box::new(ExpandBooleanPass::new()),
        Box::new(CompressConditionalPass::new()),
    ];
    let changes = session.run_passes(&mut passes).expect("pipeline failed");
    assert_eq!(changes, 4);
    assert_tree_eq(&session, "window.foo = 1;");
}

#[test]
fn test_inline_then_eliminate() {
    let mut session = session("function f() { var limit = 10; return g(limit, limit); } f();");
    let mut passes: Vec<Box<dyn RefactorPass>> = vec![
        Box::new(InlineLiteralsPass::new()),
        Box::new(DeadVariableEliminationPass::new()),
    ];
    session.run_passes(&mut passes).expect("pipeline failed");
    assert_tree_eq(&session, "function f() { return g(10, 10); } f();");
}

#[test]
fn test_comma_compression() {
    let mut session = session("(0, obj.method)(); x = (1, 2, y);");
    let dropped = session
        .run_pass(&mut CompressCommaPass::new())
        .expect("pass failed");
    // `(1, 2), y` needs a second round once `1, 2` has become `2`.
    assert_eq!(dropped, 3);
    assert_tree_eq(&session, "obj.method(); x = y;");
}

#[test]
fn test_normalize_with_shadowed_parameters() {
    let mut session = session("function f(a) { return function (a) { return a; }; } f();");
    let renamed = session
        .run_pass(&mut NormalizeIdentifiersPass::new(SequentialIdGenerator::new("")))
        .expect("pass failed");
    assert_eq!(renamed, 2);
    assert_tree_eq(
        &session,
        "function f($arg0_a) { return function ($arg0_b) { return $arg0_b; }; } f();",
    );
}

#[test]
fn test_debugger_insertion_counts_functions() {
    let mut session = session("function f() {} class A { m() { return 1; } }");
    let count = session
        .run_pass(&mut InsertDebuggerPass::new())
        .expect("pass failed");
    assert_eq!(count, 2);
    assert_tree_eq(
        &session,
        "function f() { debugger; } class A { m() { debugger; return 1; } }",
    );
}

#[test]
fn test_pass_names() {
    let passes: Vec<Box<dyn RefactorPass>> = vec![
        Box::new(DeadVariableEliminationPass::new()),
        Box::new(UnshortenPass::new()),
        Box::new(InlineLiteralsPass::new()),
        Box::new(InsertDebuggerPass::new()),
    ];
    let names: Vec<&str> = passes.iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec!["dead-variable-elimination", "unshorten", "inline-literals", "insert-debugger"]
    );
}
