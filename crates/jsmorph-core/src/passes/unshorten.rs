use jsmorph_syntax::Node;
use tracing::debug;

use super::RefactorPass;
use crate::error::Result;
use crate::session::Session;

/// Removes aliases such as `var a = b;` by renaming every use of `a` to
/// `b` and deleting the declarator.
#[derive(Debug, Clone)]
pub struct UnshortenPass {
    selector: String,
}

impl UnshortenPass {
    pub fn new() -> Self {
        Self::with_selector("VariableDeclarator")
    }

    /// Restricts the pass to declarators matched by `selector`.
    pub fn with_selector(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl Default for UnshortenPass {
    fn default() -> Self {
        Self::new()
    }
}

impl RefactorPass for UnshortenPass {
    fn name(&self) -> &'static str {
        "unshorten"
    }

    fn run(&mut self, session: &mut Session) -> Result<usize> {
        session.apply();
        let mut removed = 0;
        for declarator in session.select(&self.selector)? {
            let (binding, alias) = match &session.ast()[declarator] {
                Node::VariableDeclarator {
                    binding,
                    init: Some(init),
                } => match &session.ast()[*init] {
                    Node::IdentifierExpression { name } => (*binding, name.clone()),
                    other => {
                        debug!(init = %other.kind(), "initializer is not an identifier; skipping");
                        continue;
                    }
                },
                other => {
                    debug!(kind = %other.kind(), "not an initialized declarator; skipping");
                    continue;
                }
            };
            let variable = match session.lookup_variable(binding) {
                Ok(variable) => variable,
                Err(err) => {
                    debug!(%err, "skipping unresolvable alias");
                    continue;
                }
            };
            session.rename_variable(variable, &alias)?;
            session.queue_delete(declarator);
            removed += 1;
        }
        session.apply();
        Ok(removed)
    }
}
