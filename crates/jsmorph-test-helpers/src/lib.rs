//! Shared helpers for jsmorph tests.

use std::sync::Once;

use jsmorph_core::Session;
use jsmorph_syntax::{parse_script_new, NodeId};

static TRACING_INIT: Once = Once::new();

/// Routes `tracing` output to the test harness. Safe to call from every
/// test; filtering follows `RUST_LOG`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Parses `source` into a fresh session with default configuration.
pub fn session(source: &str) -> Session {
    init_tracing();
    match Session::parse(source) {
        Ok(session) => session,
        Err(err) => panic!("failed to parse test source {source:?}: {err}"),
    }
}

/// Parses `source` and reprints it, giving the canonical form the printer
/// would produce for it.
pub fn normalize(source: &str) -> String {
    match parse_script_new(source) {
        Ok((ast, root)) => jsmorph_syntax::generate(&ast, root),
        Err(err) => panic!("failed to parse expected source {source:?}: {err}"),
    }
}

/// Asserts that the session prints the same as `expected` once both go
/// through the printer.
#[track_caller]
pub fn assert_tree_eq(session: &Session, expected: &str) {
    let actual = match session.print() {
        Ok(text) => text,
        Err(err) => panic!("session cannot be printed: {err}"),
    };
    assert_eq!(actual, normalize(expected));
}

/// The `index`-th top-level statement of the session's script.
#[track_caller]
pub fn statement(session: &Session, index: usize) -> NodeId {
    let statements = session.ast()[session.root()]
        .statements()
        .unwrap_or_default();
    match statements.get(index) {
        Some(id) => *id,
        None => panic!("script has {} statements, wanted #{index}", statements.len()),
    }
}

/// Pretty JSON of a subtree, handy when a structural assertion fails.
pub fn dump(session: &Session, id: NodeId) -> String {
    serde_json::to_string_pretty(&session.ast().to_value(id)).unwrap_or_default()
}
