//! Replacement and insertion payloads.

use std::fmt;
use std::future::Future;

use jsmorph_syntax::{parse_script, structurally_equal, Ast, Node, NodeId};
use tracing::debug;

use super::queue::InsertPosition;
use super::{Session, Targets};
use crate::error::{Error, Result};

/// What a replacer callback hands back: an existing or freshly built
/// node, or source text to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Node(NodeId),
    Source(String),
}

impl From<NodeId> for Replacement {
    fn from(id: NodeId) -> Self {
        Replacement::Node(id)
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Source(text)
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::Source(text.to_string())
    }
}

type ReplacerFn<'a> = Box<dyn FnMut(&mut Ast, NodeId) -> Result<Replacement> + 'a>;

/// The payload of a replace or insert call.
///
/// A node payload is deep-copied for every target and source text is
/// parsed once and copied. A callback runs once per target and may build
/// new nodes in the arena.
pub enum Replacer<'a> {
    Node(NodeId),
    Source(String),
    With(ReplacerFn<'a>),
}

impl<'a> Replacer<'a> {
    pub fn node(id: NodeId) -> Self {
        Replacer::Node(id)
    }

    pub fn source(text: impl Into<String>) -> Self {
        Replacer::Source(text.into())
    }

    pub fn with<F, R>(mut f: F) -> Self
    where
        F: FnMut(&mut Ast, NodeId) -> R + 'a,
        R: Into<Replacement>,
    {
        Replacer::With(Box::new(move |ast, id| Ok(f(ast, id).into())))
    }

    pub fn try_with<F>(f: F) -> Self
    where
        F: FnMut(&mut Ast, NodeId) -> Result<Replacement> + 'a,
    {
        Replacer::With(Box::new(f))
    }
}

impl fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacer::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Replacer::Source(text) => f.debug_tuple("Source").field(text).finish(),
            Replacer::With(_) => f.write_str("With(..)"),
        }
    }
}

impl From<NodeId> for Replacer<'_> {
    fn from(id: NodeId) -> Self {
        Replacer::Node(id)
    }
}

impl From<&str> for Replacer<'_> {
    fn from(text: &str) -> Self {
        Replacer::Source(text.to_string())
    }
}

impl From<String> for Replacer<'_> {
    fn from(text: String) -> Self {
        Replacer::Source(text)
    }
}

/// Source text parsed once and copied per target.
struct Template {
    script: NodeId,
    text: String,
}

impl Session {
    /// Queues a replacement for every target. Returns how many targets
    /// got a replacement distinct from themselves.
    ///
    /// Either every replacement is queued or, on error, none is.
    pub fn replace<'r>(&mut self, targets: impl Targets, replacer: impl Into<Replacer<'r>>) -> Result<usize> {
        let nodes = targets.resolve(self)?;
        let mut replacer = replacer.into();
        let count = self.replace_nodes(&nodes, &mut replacer, false)?;
        self.settle();
        Ok(count)
    }

    /// Like [`replace`](Self::replace) with an asynchronous callback.
    ///
    /// Targets are handled strictly one after another: each callback's
    /// future is awaited before the next callback starts. If any future
    /// fails, nothing from this call is queued; earlier queued edits stay.
    pub async fn replace_async<F, Fut>(&mut self, targets: impl Targets, mut replacer: F) -> Result<usize>
    where
        F: FnMut(&mut Ast, NodeId) -> Fut,
        Fut: Future<Output = Result<Replacement>>,
    {
        let nodes = targets.resolve(self)?;
        let mut staged = Vec::with_capacity(nodes.len());
        for node in nodes {
            let replacement = replacer(&mut self.ast, node).await?;
            let replacement = self.materialize(replacement, node)?;
            if replacement != node {
                staged.push((node, replacement));
            }
        }
        let count = self.commit_replacements(staged);
        self.settle();
        Ok(count)
    }

    /// Selects, replaces and applies until a round replaces nothing.
    /// Returns the number of productive rounds.
    ///
    /// A replacement structurally equal to its target does not count as a
    /// change, and the rounds are capped by
    /// [`SessionConfig::max_fixed_point_passes`](crate::SessionConfig).
    pub fn replace_recursive<'r>(
        &mut self,
        targets: impl Targets,
        replacer: impl Into<Replacer<'r>>,
    ) -> Result<usize> {
        let mut replacer = replacer.into();
        let limit = self.config.max_fixed_point_passes;
        let mut passes = 0;
        loop {
            let nodes = targets.resolve(self)?;
            let count = self.replace_nodes(&nodes, &mut replacer, true)?;
            self.apply();
            if count == 0 {
                debug!(passes, "fixed point reached");
                return Ok(passes);
            }
            passes += 1;
            if passes >= limit {
                return Err(Error::FixedPointNotReached { passes });
            }
        }
    }

    /// Queues `payload` as a new statement before every target.
    pub fn insert_before<'r>(&mut self, targets: impl Targets, payload: impl Into<Replacer<'r>>) -> Result<usize> {
        self.insert(targets, payload.into(), InsertPosition::Before)
    }

    /// Queues `payload` as a new statement after every target.
    pub fn insert_after<'r>(&mut self, targets: impl Targets, payload: impl Into<Replacer<'r>>) -> Result<usize> {
        self.insert(targets, payload.into(), InsertPosition::After)
    }

    fn insert(&mut self, targets: impl Targets, mut payload: Replacer<'_>, position: InsertPosition) -> Result<usize> {
        let nodes = targets.resolve(self)?;
        let template = self.template(&payload)?;
        let mut staged = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !self.ast[node].is_statement() {
                return Err(Error::InsertTargetNotStatement {
                    kind: self.ast.kind(node),
                });
            }
            let statement = match (&mut payload, &template) {
                (_, Some(template)) => {
                    let statement = self.first_statement(template.script, &template.text)?;
                    self.ast.deep_clone(statement)
                }
                (Replacer::Node(id), None) => self.ast.deep_clone(*id),
                (Replacer::With(f), None) => match f(&mut self.ast, node)? {
                    Replacement::Node(id) => id,
                    Replacement::Source(text) => {
                        let script = parse_script(&mut self.ast, &text)?;
                        self.first_statement(script, &text)?
                    }
                },
                (Replacer::Source(text), None) => {
                    let script = parse_script(&mut self.ast, text)?;
                    self.first_statement(script, text)?
                }
            };
            if !self.ast[statement].is_statement() {
                return Err(Error::InsertPayloadNotStatement {
                    kind: self.ast.kind(statement),
                });
            }
            staged.push((node, statement));
        }
        let count = staged.len();
        for (anchor, statement) in staged {
            self.queue.insert(anchor, position, statement);
        }
        self.settle();
        Ok(count)
    }

    /// Runs `replacer` against `nodes` and queues the results together.
    pub(crate) fn replace_nodes(
        &mut self,
        nodes: &[NodeId],
        replacer: &mut Replacer<'_>,
        skip_equal: bool,
    ) -> Result<usize> {
        let template = self.template(replacer)?;
        let mut staged = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let replacement = match (&mut *replacer, &template) {
                (_, Some(template)) => {
                    let extracted = self.extract(template.script, &template.text, node)?;
                    self.ast.deep_clone(extracted)
                }
                (Replacer::Node(id), None) => self.ast.deep_clone(*id),
                (Replacer::With(f), None) => {
                    let replacement = f(&mut self.ast, node)?;
                    self.materialize(replacement, node)?
                }
                (Replacer::Source(text), None) => {
                    let script = parse_script(&mut self.ast, text)?;
                    self.extract(script, text, node)?
                }
            };
            if replacement == node {
                continue;
            }
            if skip_equal && structurally_equal(&self.ast, node, replacement) {
                continue;
            }
            staged.push((node, replacement));
        }
        Ok(self.commit_replacements(staged))
    }

    fn commit_replacements(&mut self, staged: Vec<(NodeId, NodeId)>) -> usize {
        staged
            .into_iter()
            .filter(|&(target, replacement)| self.queue.replace(target, replacement))
            .count()
    }

    fn template(&mut self, replacer: &Replacer<'_>) -> Result<Option<Template>> {
        match replacer {
            Replacer::Source(text) => Ok(Some(Template {
                script: parse_script(&mut self.ast, text)?,
                text: text.clone(),
            })),
            _ => Ok(None),
        }
    }

    fn materialize(&mut self, replacement: Replacement, target: NodeId) -> Result<NodeId> {
        match replacement {
            Replacement::Node(id) => Ok(id),
            Replacement::Source(text) => {
                let script = parse_script(&mut self.ast, &text)?;
                self.extract(script, &text, target)
            }
        }
    }

    /// The part of a parsed script that fits where `target` stands: its
    /// first statement for statement targets, otherwise the expression of
    /// its first statement.
    fn extract(&self, script: NodeId, text: &str, target: NodeId) -> Result<NodeId> {
        let statement = self.first_statement(script, text)?;
        if self.ast[target].is_statement() {
            return Ok(statement);
        }
        match &self.ast[statement] {
            Node::ExpressionStatement { expression } => Ok(*expression),
            other => Err(Error::ExpressionExpected { kind: other.kind() }),
        }
    }

    fn first_statement(&self, script: NodeId, text: &str) -> Result<NodeId> {
        self.ast[script]
            .statements()
            .and_then(|statements| statements.first().copied())
            .ok_or_else(|| Error::EmptyReplacement {
                text: text.to_string(),
            })
    }
}
