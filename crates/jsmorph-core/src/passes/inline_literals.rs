use jsmorph_syntax::{Node, NodeId};
use tracing::trace;

use super::RefactorPass;
use crate::error::Result;
use crate::scope::{Accessibility, Variable};
use crate::session::Session;

/// Replaces reads of a variable that is only ever assigned a literal in
/// its declaration with copies of that literal.
///
/// The declaration itself is left in place; running
/// [`DeadVariableEliminationPass`](super::DeadVariableEliminationPass)
/// afterwards removes it once nothing reads it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineLiteralsPass;

impl InlineLiteralsPass {
    pub fn new() -> Self {
        Self
    }

    /// The literal initializer of `variable`, if it is a constant.
    fn constant_literal(session: &Session, variable: &Variable) -> Option<NodeId> {
        let [declaration] = variable.declarations.as_slice() else {
            return None;
        };
        let declarator = session.parent(declaration.node)?;
        let Node::VariableDeclarator {
            binding,
            init: Some(init),
        } = &session.ast()[declarator]
        else {
            return None;
        };
        if *binding != declaration.node || !session.ast().is_literal(*init) {
            return None;
        }
        let reassigned = variable
            .references
            .iter()
            .any(|r| r.accessibility.is_write() && r.node != declaration.node);
        (!reassigned).then_some(*init)
    }
}

impl RefactorPass for InlineLiteralsPass {
    fn name(&self) -> &'static str {
        "inline-literals"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        session.apply();
        let index = session.scope_index();
        let mut plan = Vec::new();
        for id in index.variables() {
            let variable = index.variable(id)?;
            let Some(literal) = Self::constant_literal(session, variable) else {
                continue;
            };
            for reference in &variable.references {
                if reference.accessibility != Accessibility::Read {
                    continue;
                }
                let shorthand = session
                    .parent(reference.node)
                    .is_some_and(|p| matches!(session.ast()[p], Node::ShorthandProperty { .. }));
                if shorthand {
                    trace!(name = %variable.name, "not inlining into shorthand property");
                    continue;
                }
                plan.push((reference.node, literal));
            }
        }

        let mut inlined = 0;
        for (target, literal) in plan {
            let copy = session.ast_mut().deep_clone(literal);
            if session.queue_replace(target, copy) {
                inlined += 1;
            }
        }
        session.apply();
        Ok(inlined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(source: &str) -> (usize, String) {
        let mut session = Session::parse(source).unwrap();
        let inlined = session.run_pass(&mut InlineLiteralsPass::new()).unwrap();
        (inlined, session.print().unwrap())
    }

    #[test]
    fn test_constant_reads_are_inlined() {
        let (inlined, output) = inline("const a = 'x'; f(a, a + 1);");
        assert_eq!(inlined, 2);
        assert_eq!(output, "const a = \"x\";\nf(\"x\", \"x\" + 1);\n");
    }

    #[test]
    fn test_reassigned_variable_is_left_alone() {
        let (inlined, output) = inline("var a = 1; a = 2; f(a);");
        assert_eq!(inlined, 0);
        assert_eq!(output, "var a = 1;\na = 2;\nf(a);\n");
    }

    #[test]
    fn test_shorthand_property_is_skipped() {
        let (inlined, output) = inline("let a = 1; f({ a }, a);");
        assert_eq!(inlined, 1);
        assert_eq!(output, "let a = 1;\nf({ a }, 1);\n");
    }
}
