use jsmorph_syntax::{Node, NodeId};
use tracing::trace;

use super::RefactorPass;
use crate::error::Result;
use crate::session::{InsertPosition, Session};

const FUNCTIONS: &str = "FunctionDeclaration, FunctionExpression, ArrowExpression, Method";

/// Puts a `debugger;` statement at the start of every selected function.
/// Arrow functions with an expression body get a block body that returns
/// the expression.
#[derive(Debug, Clone)]
pub struct InsertDebuggerPass {
    selector: String,
}

impl InsertDebuggerPass {
    pub fn new() -> Self {
        Self::with_selector(FUNCTIONS)
    }

    pub fn with_selector(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    fn instrument(session: &mut Session, function: NodeId) -> bool {
        let body = match &session.ast()[function] {
            Node::FunctionDeclaration { body, .. }
            | Node::FunctionExpression { body, .. }
            | Node::ArrowExpression { body, .. }
            | Node::Method { body, .. } => *body,
            other => {
                trace!(kind = %other.kind(), "not a function; skipping");
                return false;
            }
        };
        let first = match &session.ast()[body] {
            Node::FunctionBody { statements } => Some(statements.first().copied()),
            _ => None,
        };

        let debugger = session.ast_mut().alloc(Node::DebuggerStatement);
        match first {
            Some(Some(first)) => {
                session.queue_insert(first, debugger, InsertPosition::Before);
                true
            }
            Some(None) => {
                let block = session.ast_mut().alloc(Node::FunctionBody {
                    statements: vec![debugger],
                });
                session.queue_replace(body, block)
            }
            None => {
                let ret = session.ast_mut().alloc(Node::ReturnStatement {
                    expression: Some(body),
                });
                let block = session.ast_mut().alloc(Node::FunctionBody {
                    statements: vec![debugger, ret],
                });
                session.queue_replace(body, block)
            }
        }
    }
}

impl Default for InsertDebuggerPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RefactorPass for InsertDebuggerPass {
    fn name(&self) -> &'static str {
        "insert-debugger"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        session.apply();
        let mut instrumented = 0;
        for function in session.select(&self.selector)? {
            if Self::instrument(session, function) {
                instrumented += 1;
            }
        }
        session.apply();
        Ok(instrumented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_debugger_lands_in_every_function_shape() {
        let mut session = Session::parse("function f() { return 1; } g = function () {}; h = (x) => x;").unwrap();
        let count = session.run_pass(&mut InsertDebuggerPass::new()).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            session.print().unwrap(),
            indoc! {"
                function f() {
                  debugger;
                  return 1;
                }
                g = function () {
                  debugger;
                };
                h = (x) => {
                  debugger;
                  return x;
                };
            "}
        );
    }

    #[test]
    fn test_selector_narrows_functions() {
        let mut session = Session::parse("function f() { a(); } function g() { b(); }").unwrap();
        let count = session
            .run_pass(&mut InsertDebuggerPass::with_selector(r#"FunctionDeclaration[name.name="g"]"#))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            session.print().unwrap(),
            "function f() {\n  a();\n}\nfunction g() {\n  debugger;\n  b();\n}\n"
        );
    }
}
