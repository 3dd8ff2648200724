use jsmorph_syntax::{Node, NodeId};
use tracing::{debug, trace};

use super::RefactorPass;
use crate::error::Result;
use crate::scope::{Accessibility, Reference, ScopeKind, VariableId};
use crate::session::Session;

/// Removes variables, functions and classes that are never read.
///
/// Implicit globals are never touched. With `preserve_top_level` set,
/// bindings declared at the top of the script are kept as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadVariableEliminationPass {
    pub preserve_top_level: bool,
}

enum Cleanup {
    Delete(NodeId),
    Replace(NodeId, NodeId),
}

impl DeadVariableEliminationPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preserving_top_level() -> Self {
        Self {
            preserve_top_level: true,
        }
    }

    fn is_protected(&self, session: &Session, variable: VariableId) -> Result<bool> {
        let index = session.scope_index();
        if index.is_global(variable)? {
            return Ok(true);
        }
        if self.preserve_top_level {
            let scope = index.scope(index.scope_of(variable)?)?;
            return Ok(scope.kind == ScopeKind::Script);
        }
        Ok(false)
    }

    /// Whether `reference` observes the variable's value. An update or
    /// compound assignment that is a whole statement on its own does not.
    fn is_true_read(session: &Session, reference: &Reference) -> bool {
        match reference.accessibility {
            Accessibility::Read => true,
            Accessibility::Write => false,
            Accessibility::ReadWrite => {
                let Some(parent) = session.parent(reference.node) else {
                    return true;
                };
                match session.parent(parent).map(|p| &session.ast()[p]) {
                    Some(Node::ExpressionStatement { expression }) => *expression != parent,
                    _ => true,
                }
            }
        }
    }

    fn cleanup_for(session: &Session, reference: &Reference) -> Option<Cleanup> {
        let ast = session.ast();
        let parent = session.parent(reference.node)?;
        let context = session.parent(parent);
        let in_statement = |expression: NodeId| {
            context.is_some_and(|c| {
                matches!(&ast[c], Node::ExpressionStatement { expression: e } if *e == expression)
            })
        };

        match &ast[parent] {
            Node::VariableDeclarator { .. }
            | Node::FunctionDeclaration { .. }
            | Node::ClassDeclaration { .. } => Some(Cleanup::Delete(parent)),
            Node::UpdateExpression { .. } if in_statement(parent) => {
                context.map(Cleanup::Delete)
            }
            Node::AssignmentExpression {
                binding,
                expression,
            }
            | Node::CompoundAssignmentExpression {
                binding,
                expression,
                ..
            } if *binding == reference.node => {
                if ast.is_literal(*expression) && in_statement(parent) {
                    context.map(Cleanup::Delete)
                } else {
                    Some(Cleanup::Replace(parent, *expression))
                }
            }
            other => {
                trace!(kind = %other.kind(), "leaving reference context in place");
                None
            }
        }
    }
}

impl RefactorPass for DeadVariableEliminationPass {
    fn name(&self) -> &'static str {
        "dead-variable-elimination"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        session.apply();
        let owners = session.select("VariableDeclarator, FunctionDeclaration, ClassDeclaration")?;
        let mut removed = 0;

        for owner in owners {
            let binding = match &session.ast()[owner] {
                Node::VariableDeclarator { binding, .. } => *binding,
                Node::FunctionDeclaration { name, .. } | Node::ClassDeclaration { name, .. } => *name,
                _ => continue,
            };
            if !matches!(session.ast()[binding], Node::BindingIdentifier { .. }) {
                trace!("skipping destructuring declaration");
                continue;
            }
            let variable = match session.lookup_variable(binding) {
                Ok(variable) => variable,
                Err(err) => {
                    debug!(%err, "skipping unresolvable declaration");
                    continue;
                }
            };
            if self.is_protected(session, variable)? {
                continue;
            }

            let references = session.variable(variable)?.references.clone();
            if references.iter().any(|r| Self::is_true_read(session, r)) {
                continue;
            }

            let cleanups: Vec<Cleanup> = references
                .iter()
                .filter_map(|r| Self::cleanup_for(session, r))
                .collect();
            for cleanup in cleanups {
                match cleanup {
                    Cleanup::Delete(node) => session.queue_delete(node),
                    Cleanup::Replace(target, replacement) => {
                        session.queue_replace(target, replacement);
                    }
                }
            }
            session.queue_delete(owner);
            debug!(name = %session.variable(variable)?.name, "removing unused binding");
            removed += 1;
        }

        session.apply();
        Ok(removed)
    }
}

impl Session {
    /// Runs [`DeadVariableEliminationPass`] with default options.
    pub fn remove_dead_variables(&mut self) -> Result<usize> {
        self.run_pass(&mut DeadVariableEliminationPass::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eliminate(source: &str) -> String {
        let mut session = Session::parse(source).unwrap();
        session.remove_dead_variables().unwrap();
        session.print().unwrap()
    }

    #[test]
    fn test_unused_locals_are_removed() {
        assert_eq!(
            eliminate("function f() { var a = 1; var b = 2; return b; } f();"),
            "function f() {\n  var b = 2;\n  return b;\n}\nf();\n"
        );
    }

    #[test]
    fn test_statement_updates_are_not_reads() {
        assert_eq!(
            eliminate("var a = 2, b = 3; a++; a--; window.foo = b++;"),
            "var b = 3;\nwindow.foo = b++;\n"
        );
    }

    #[test]
    fn test_non_literal_assignment_keeps_right_side() {
        assert_eq!(
            eliminate("function f() { var a; a = g(); } f();"),
            "function f() {\n  g();\n}\nf();\n"
        );
    }

    #[test]
    fn test_implicit_global_is_kept() {
        assert_eq!(eliminate("x = 1;"), "x = 1;\n");
    }

    #[test]
    fn test_preserve_top_level_keeps_script_bindings() {
        let mut session = Session::parse("var a = 1; function f() { var b; }").unwrap();
        let removed = session
            .run_pass(&mut DeadVariableEliminationPass::preserving_top_level())
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(session.print().unwrap(), "var a = 1;\nfunction f() {}\n");
    }

    #[test]
    fn test_destructuring_is_skipped() {
        assert_eq!(eliminate("var { a } = o;"), "var { a } = o;\n");
    }
}
