use jsmorph_syntax::{Node, NodeId};
use tracing::trace;

use super::RefactorPass;
use crate::error::Result;
use crate::id_generator::{IdGenerator, MemorableIdGenerator};
use crate::scope::{DeclarationKind, ScopeKind, VariableId};
use crate::session::Session;

/// Renames every non-global variable to a generated name.
///
/// Locals become `$$<id>`; parameters become `$arg<position>_<id>` so that
/// shadowed parameters stay distinguishable.
#[derive(Debug)]
pub struct NormalizeIdentifiersPass<G: IdGenerator> {
    generator: G,
}

impl<G: IdGenerator> NormalizeIdentifiersPass<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn into_generator(self) -> G {
        self.generator
    }

    /// Picks a new name for every variable, scope by scope in document
    /// order.
    fn plan(&mut self, session: &Session) -> Result<Vec<(VariableId, String)>> {
        let index = session.scope_index();
        let mut plan = Vec::new();
        for scope_id in index.scopes() {
            let scope = index.scope(scope_id)?;
            if matches!(scope.kind, ScopeKind::Global | ScopeKind::Script) {
                continue;
            }
            for variable_id in index.scope_variables(scope_id)? {
                let variable = index.variable(variable_id)?;
                let Some(first) = variable.declarations.first() else {
                    trace!(name = %variable.name, "skipping undeclared variable");
                    continue;
                };
                let id = self.generator.next_id();
                let position = match first.kind {
                    DeclarationKind::Parameter => parameter_position(session, first.node),
                    _ => None,
                };
                let name = match position {
                    Some(position) => format!("$arg{position}_{id}"),
                    None => format!("$${id}"),
                };
                plan.push((variable_id, name));
            }
        }
        Ok(plan)
    }
}

impl Default for NormalizeIdentifiersPass<MemorableIdGenerator> {
    fn default() -> Self {
        Self::new(MemorableIdGenerator::new(1))
    }
}

impl<G: IdGenerator> RefactorPass for NormalizeIdentifiersPass<G> {
    fn name(&self) -> &'static str {
        "normalize-identifiers"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        session.apply();
        let plan = self.plan(session)?;
        let count = plan.len();
        for (variable, name) in plan {
            session.rename_variable(variable, &name)?;
        }
        Ok(count)
    }
}

/// Index of the formal parameter that holds `binding`, counting a rest
/// parameter as the last position.
fn parameter_position(session: &Session, binding: NodeId) -> Option<usize> {
    let mut child = binding;
    let mut current = session.parent(binding);
    while let Some(parent) = current {
        if let Node::FormalParameters { items, rest } = &session.ast()[parent] {
            return items
                .iter()
                .position(|&item| item == child)
                .or_else(|| (*rest == Some(child)).then_some(items.len()));
        }
        child = parent;
        current = session.parent(parent);
    }
    None
}

impl Session {
    /// Renames every non-global variable with names from `generator`.
    /// Returns the number of variables renamed.
    pub fn normalize_identifiers(&mut self, generator: impl IdGenerator) -> Result<usize> {
        self.run_pass(&mut NormalizeIdentifiersPass::new(generator))
    }
}
