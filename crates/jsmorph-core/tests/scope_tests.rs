use jsmorph_core::scope::{Accessibility, ScopeKind};
use jsmorph_core::Error;
use jsmorph_syntax::Node;
use jsmorph_test_helpers::{assert_tree_eq, session};

#[test]
fn test_rename_touches_every_declaration_and_reference() {
    let mut session = session("var a = 1; function f() { return a + a; } a = 2;");
    let binding = session
        .select_one(r#"VariableDeclarator > BindingIdentifier[name="a"]"#)
        .expect("one binding");
    let renamed = session.rename(binding, "z").expect("rename failed");
    // One declaration site plus three references.
    assert_eq!(renamed, 4);
    assert!(!session.is_dirty());
    assert_tree_eq(&session, "var z = 1; function f() { return z + z; } z = 2;");
}

#[test]
fn test_rename_respects_shadowing() {
    let mut session = session("var a; function f(a) { return a; } a;");
    session
        .rename("VariableDeclarator > BindingIdentifier", "b")
        .expect("rename failed");
    assert_tree_eq(&session, "var b; function f(a) { return a; } b;");
}

#[test]
fn test_mass_rename_covers_every_scope() {
    let mut session = session("function f(x) { return x; } function g(x) { return x * 2; }");
    let renamed = session.mass_rename(&[("x", "value")]).expect("rename failed");
    assert_eq!(renamed, 4);
    assert_tree_eq(
        &session,
        "function f(value) { return value; } function g(value) { return value * 2; }",
    );
}

#[test]
fn test_references_and_declarations() {
    let session = session("let n = 0; n++; f(n);");
    let read = session
        .select(r#"CallExpression IdentifierExpression[name="n"]"#)
        .expect("select failed")[0];
    let declarations = session.find_declarations(read).expect("lookup failed");
    assert_eq!(declarations.len(), 1);
    let accessibility: Vec<Accessibility> = session
        .find_references(read)
        .expect("lookup failed")
        .iter()
        .map(|r| r.accessibility)
        .collect();
    assert_eq!(
        accessibility,
        vec![Accessibility::Write, Accessibility::ReadWrite, Accessibility::Read]
    );
}

#[test]
fn test_lookup_by_name_and_scope() {
    let session = session("var a; function f() { var a; }");
    let variables = session.lookup_variable_by_name("a");
    assert_eq!(variables.len(), 2);

    let kinds: Vec<ScopeKind> = variables
        .iter()
        .map(|&v| {
            let scope = session.lookup_scope(v).expect("scope");
            session.scope(scope).expect("scope").kind
        })
        .collect();
    assert_eq!(kinds, vec![ScopeKind::Script, ScopeKind::Function]);

    let function = session.select_one("FunctionDeclaration").expect("one function");
    assert!(session.inner_scope(function).is_some());
}

#[test]
fn test_unresolvable_node_is_an_error() {
    let session = session("1 + 2;");
    let literal = session
        .select("LiteralNumericExpression")
        .expect("select failed")[0];
    assert!(matches!(
        session.lookup_variable(literal),
        Err(Error::UnresolvedIdentifier { .. })
    ));
}

#[test]
fn test_handles_go_stale_after_apply() {
    let mut session = session("var a = 1; b;");
    let binding = session.select_one("BindingIdentifier").expect("one binding");
    let variable = session.lookup_variable(binding).expect("lookup failed");
    assert_eq!(variable.generation(), 0);

    session.delete("ExpressionStatement").expect("delete failed");
    session.apply();

    match session.variable(variable) {
        Err(Error::StaleHandle { found, current }) => {
            assert_eq!(found, 0);
            assert_eq!(current, 1);
        }
        other => panic!("expected a stale handle error, got {other:?}"),
    }
    let fresh = session.lookup_variable_by_name("a");
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].generation(), 1);
}

#[test]
fn test_handles_go_stale_after_invalidate() {
    let mut session = session("var a; var b; var c;");
    let c = session.lookup_variable_by_name("c")[0];
    let root = session.root();
    if let Node::Script { statements } = &mut session.ast_mut()[root] {
        statements.truncate(1);
    }
    session.invalidate();

    assert!(matches!(
        session.variable(c),
        Err(Error::StaleHandle { found: 0, current: 1 })
    ));
    assert_eq!(session.lookup_variable_by_name("a").len(), 1);
    assert!(session.lookup_variable_by_name("c").is_empty());
}

#[test]
fn test_rename_onto_sibling_keeps_index_consistent() {
    let mut session = session("function f() { var a = 1; var b = 2; return a + b; }");
    let a = session.lookup_variable_by_name("a")[0];
    let b = session.lookup_variable_by_name("b")[0];
    session.rename_variable(a, "b").expect("rename failed");

    let scope = session.lookup_scope(b).expect("scope lookup failed");
    assert_eq!(session.lookup_scope(a).expect("scope lookup failed"), scope);
    let in_scope = session
        .scope_index()
        .scope_variables(scope)
        .expect("scope variables failed");
    assert!(in_scope.contains(&a) && in_scope.contains(&b));
    assert_eq!(session.lookup_variable_by_name("b").len(), 2);
    assert_tree_eq(&session, "function f() { var b = 1; var b = 2; return b + b; }");
}
