use indoc::indoc;
use jsmorph_core::passes::DeadVariableEliminationPass;
use jsmorph_test_helpers::{assert_tree_eq, session};

#[test]
fn test_unread_bindings_are_removed() {
    let mut session = session("var foo = 1; let bar = 2; const baz = 3; x = baz;");
    let removed = session.remove_dead_variables().expect("elimination failed");
    assert_eq!(removed, 2);
    assert_tree_eq(&session, "const baz = 3; x = baz;");
}

#[test]
fn test_consumed_update_counts_as_read() {
    let mut session = session("var a = 2, b = 3; a++; a--; window.foo = b++;");
    let removed = session.remove_dead_variables().expect("elimination failed");
    assert_eq!(removed, 1);
    assert_tree_eq(&session, "var b = 3; window.foo = b++;");
}

#[test]
fn test_literal_assignment_statements_are_dropped() {
    let mut session = session(indoc! {"
        function f() {
            var a;
            a = 1;
            a += 2;
            return 0;
        }
        f();
    "});
    session.remove_dead_variables().expect("elimination failed");
    assert_tree_eq(&session, "function f() { return 0; } f();");
}

#[test]
fn test_assignment_in_expression_keeps_its_value() {
    let mut session = session("function f() { var a; return (a = g()); } f();");
    session.remove_dead_variables().expect("elimination failed");
    assert_tree_eq(&session, "function f() { return g(); } f();");
}

#[test]
fn test_unused_functions_and_classes_go_too() {
    let mut session = session("function unused() {} class Unused {} function used() {} used();");
    let removed = session.remove_dead_variables().expect("elimination failed");
    assert_eq!(removed, 2);
    assert_tree_eq(&session, "function used() {} used();");
}

#[test]
fn test_implicit_globals_are_protected() {
    let mut session = session("x = 1; y++;");
    let removed = session.remove_dead_variables().expect("elimination failed");
    assert_eq!(removed, 0);
    assert_tree_eq(&session, "x = 1; y++;");
}

#[test]
fn test_top_level_protection_is_opt_in() {
    let source = "var top = 1; function f() { var local = 2; } f();";

    let mut session = session(source);
    session
        .run_pass(&mut DeadVariableEliminationPass::preserving_top_level())
        .expect("elimination failed");
    assert_tree_eq(&session, "var top = 1; function f() {} f();");

    let mut session = jsmorph_test_helpers::session(source);
    session.remove_dead_variables().expect("elimination failed");
    assert_tree_eq(&session, "function f() {} f();");
}

#[test]
fn test_pending_edits_are_applied_first() {
    let mut session = session("var a = 1; f(a);");
    session.delete("ExpressionStatement").expect("delete failed");
    session.remove_dead_variables().expect("elimination failed");
    assert!(!session.is_dirty());
    assert_eq!(session.print().expect("print failed"), "");
}
