//! Mutation sessions.
//!
//! A [`Session`] owns one tree plus everything derived from it. Edits are
//! queued against node ids and materialized together by
//! [`Session::apply`]; the parent map and the scope index are rebuilt
//! lazily on first use after every apply.

mod apply;
mod queue;
mod replace;

pub use apply::ApplyReport;
pub use queue::{InsertPosition, Insertion, MutationQueue};
pub use replace::{Replacement, Replacer};

use jsmorph_syntax::{
    build_parent_map, generate, parse_script, parse_script_new, query, Ast, Node, NodeId,
    ParentMap, Selector,
};
use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::scope::{Declaration, Reference, Scope, ScopeId, ScopeIndex, Variable, VariableId};

/// Anything that names a set of nodes in a session: selector text, a
/// parsed selector, or node ids.
pub trait Targets {
    fn resolve(&self, session: &Session) -> Result<Vec<NodeId>>;
}

impl Targets for &str {
    fn resolve(&self, session: &Session) -> Result<Vec<NodeId>> {
        session.select(self)
    }
}

impl Targets for String {
    fn resolve(&self, session: &Session) -> Result<Vec<NodeId>> {
        session.select(self)
    }
}

impl Targets for &Selector {
    fn resolve(&self, session: &Session) -> Result<Vec<NodeId>> {
        Ok(query(&session.ast, &[session.root], self))
    }
}

/// Several selectors, matched as one comma-separated selector.
impl Targets for &[&str] {
    fn resolve(&self, session: &Session) -> Result<Vec<NodeId>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        session.select(&self.join(", "))
    }
}

impl<const N: usize> Targets for [&str; N] {
    fn resolve(&self, session: &Session) -> Result<Vec<NodeId>> {
        self.as_slice().resolve(session)
    }
}

impl Targets for NodeId {
    fn resolve(&self, _session: &Session) -> Result<Vec<NodeId>> {
        Ok(vec![*self])
    }
}

impl Targets for &[NodeId] {
    fn resolve(&self, _session: &Session) -> Result<Vec<NodeId>> {
        Ok(self.to_vec())
    }
}

impl Targets for Vec<NodeId> {
    fn resolve(&self, _session: &Session) -> Result<Vec<NodeId>> {
        Ok(self.clone())
    }
}

pub struct Session {
    ast: Ast,
    root: NodeId,
    config: SessionConfig,
    generation: u64,
    queue: MutationQueue,
    parents: OnceCell<ParentMap>,
    scopes: OnceCell<ScopeIndex>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("root", &self.root)
            .field("generation", &self.generation)
            .field("pending", &self.queue.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Session {
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with_config(source, SessionConfig::default())
    }

    pub fn parse_with_config(source: &str, config: SessionConfig) -> Result<Self> {
        let (ast, root) = parse_script_new(source)?;
        Ok(Self::with_config(ast, root, config))
    }

    pub fn new(ast: Ast, root: NodeId) -> Self {
        Self::with_config(ast, root, SessionConfig::default())
    }

    pub fn with_config(ast: Ast, root: NodeId, config: SessionConfig) -> Self {
        Self {
            ast,
            root,
            config,
            generation: 0,
            queue: MutationQueue::new(),
            parents: OnceCell::new(),
            scopes: OnceCell::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Direct access to the arena, for building nodes to queue.
    ///
    /// Changing nodes that are reachable from the root bypasses the queue;
    /// call [`invalidate`](Self::invalidate) afterwards.
    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bumped by every apply and invalidate. Scope handles are tied to it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drops the cached parent map and scope index and starts a new
    /// generation, so handles from the old index are rejected.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.parents = OnceCell::new();
        self.scopes = OnceCell::new();
    }

    fn parent_map(&self) -> &ParentMap {
        self.parents
            .get_or_init(|| build_parent_map(&self.ast, self.root))
    }

    pub fn scope_index(&self) -> &ScopeIndex {
        self.scopes
            .get_or_init(|| ScopeIndex::build(&self.ast, self.root, self.generation))
    }

    // Selection

    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.select_from(&[self.root], selector)
    }

    pub fn select_from(&self, roots: &[NodeId], selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(query(&self.ast, roots, &selector))
    }

    /// The single match of `selector`; zero or several matches are an
    /// error.
    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        match self.select(selector)?.as_slice() {
            [one] => Ok(*one),
            found => Err(Error::ExpectedOne {
                selector: selector.to_string(),
                found: found.len(),
            }),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent_map().get(&id).copied()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let parents = self.parent_map();
        let mut out = Vec::new();
        let mut current = id;
        while let Some(&parent) = parents.get(&current) {
            out.push(parent);
            current = parent;
        }
        out
    }

    pub fn find_parents(&self, targets: impl Targets) -> Result<Vec<NodeId>> {
        let mut out: Vec<NodeId> = Vec::new();
        for id in targets.resolve(self)? {
            if let Some(parent) = self.parent(id) {
                if !out.contains(&parent) {
                    out.push(parent);
                }
            }
        }
        Ok(out)
    }

    /// For every origin, walks up its ancestors and returns the matches of
    /// `selector` inside the first ancestor whose subtree has any.
    pub fn closest(&self, origins: impl Targets, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        let mut out = Vec::new();
        for origin in origins.resolve(self)? {
            for ancestor in self.ancestors(origin) {
                let matches = query(&self.ast, &[ancestor], &selector);
                if !matches.is_empty() {
                    out.extend(matches);
                    break;
                }
            }
        }
        Ok(out)
    }

    /// Expressions structurally equal to the expression statement that
    /// `sample` consists of.
    pub fn find_matching_expression(&self, sample: &str) -> Result<Vec<NodeId>> {
        let (scratch, script) = parse_script_new(sample)?;
        let expression = scratch[script]
            .statements()
            .and_then(|statements| statements.first())
            .and_then(|&first| match &scratch[first] {
                Node::ExpressionStatement { expression } => Some(*expression),
                _ => None,
            });
        Ok(match expression {
            Some(expression) => self.matching(&scratch, expression),
            None => Vec::new(),
        })
    }

    /// Statements structurally equal to the first statement of `sample`.
    pub fn find_matching_statement(&self, sample: &str) -> Result<Vec<NodeId>> {
        let (scratch, script) = parse_script_new(sample)?;
        let first = scratch[script]
            .statements()
            .and_then(|statements| statements.first().copied());
        Ok(match first {
            Some(statement) => self.matching(&scratch, statement),
            None => Vec::new(),
        })
    }

    fn matching(&self, sample_ast: &Ast, sample: NodeId) -> Vec<NodeId> {
        let kind = sample_ast.kind(sample);
        let value = sample_ast.to_value(sample);
        jsmorph_syntax::traverse::descendants(&self.ast, self.root)
            .into_iter()
            .filter(|&id| self.ast.kind(id) == kind && self.ast.to_value(id) == value)
            .collect()
    }

    // Scope lookups

    pub fn lookup_variable(&self, node: NodeId) -> Result<VariableId> {
        self.scope_index().lookup_variable(&self.ast, node)
    }

    pub fn lookup_variable_by_name(&self, name: &str) -> Vec<VariableId> {
        self.scope_index().variables_by_name(name)
    }

    pub fn lookup_scope(&self, variable: VariableId) -> Result<ScopeId> {
        self.scope_index().scope_of(variable)
    }

    /// The innermost scope introduced by `owner` (a function, block, ...).
    pub fn inner_scope(&self, owner: NodeId) -> Option<ScopeId> {
        self.scope_index().scope_for_owner(owner)
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable> {
        self.scope_index().variable(id)
    }

    pub fn scope(&self, id: ScopeId) -> Result<&Scope> {
        self.scope_index().scope(id)
    }

    pub fn find_references(&self, node: NodeId) -> Result<Vec<Reference>> {
        let variable = self.lookup_variable(node)?;
        Ok(self.variable(variable)?.references.clone())
    }

    pub fn find_declarations(&self, node: NodeId) -> Result<Vec<Declaration>> {
        let variable = self.lookup_variable(node)?;
        Ok(self.variable(variable)?.declarations.clone())
    }

    // Renaming

    /// Renames the variable behind every target. Targets that resolve to
    /// no single variable are skipped. Returns the number of identifier
    /// nodes changed.
    pub fn rename(&mut self, targets: impl Targets, new_name: &str) -> Result<usize> {
        let mut variables = Vec::new();
        for node in targets.resolve(self)? {
            match self.lookup_variable(node) {
                Ok(variable) if !variables.contains(&variable) => variables.push(variable),
                Ok(_) => {}
                Err(err) => debug!(%err, "skipping rename target"),
            }
        }
        let mut renamed = 0;
        for variable in variables {
            renamed += self.rename_variable(variable, new_name)?;
        }
        Ok(renamed)
    }

    /// Sets the name on every declaration and reference site of
    /// `variable` in place. Tree shape is unchanged, so nothing is queued
    /// and existing handles stay valid. Renaming onto a name already bound
    /// in the same scope keeps both variables listed under that name.
    pub fn rename_variable(&mut self, variable: VariableId, new_name: &str) -> Result<usize> {
        let var = self.scope_index().variable(variable)?;
        let mut sites: Vec<NodeId> = Vec::new();
        let all = var
            .declarations
            .iter()
            .map(|d| d.node)
            .chain(var.references.iter().map(|r| r.node));
        for site in all {
            if !sites.contains(&site) {
                sites.push(site);
            }
        }

        let renamed = sites
            .into_iter()
            .filter(|&site| self.ast.set_identifier_name(site, new_name))
            .count();
        if let Some(index) = self.scopes.get_mut() {
            index.rename(variable, new_name)?;
        }
        Ok(renamed)
    }

    /// Renames every variable called `from` to `to`, for each pair.
    pub fn mass_rename(&mut self, pairs: &[(&str, &str)]) -> Result<usize> {
        let mut renamed = 0;
        for (from, to) in pairs {
            for variable in self.lookup_variable_by_name(from) {
                renamed += self.rename_variable(variable, to)?;
            }
        }
        Ok(renamed)
    }

    // Queued edits

    pub fn delete(&mut self, targets: impl Targets) -> Result<usize> {
        let nodes = targets.resolve(self)?;
        for &node in &nodes {
            self.queue.delete(node);
        }
        self.settle();
        Ok(nodes.len())
    }

    /// Queues `replacement` in place of `target`. Returns `false` when the
    /// target is already queued for deletion.
    pub fn queue_replace(&mut self, target: NodeId, replacement: NodeId) -> bool {
        self.queue.replace(target, replacement)
    }

    pub fn queue_delete(&mut self, target: NodeId) {
        self.queue.delete(target);
    }

    /// Queues a statement next to `anchor` without checking either node;
    /// an unusable anchor is reported and dropped at apply time.
    pub fn queue_insert(&mut self, anchor: NodeId, statement: NodeId, position: InsertPosition) {
        self.queue.insert(anchor, position, statement);
    }

    /// Forgets every queued edit.
    pub fn discard_pending(&mut self) {
        self.queue.clear();
    }

    /// Materializes all queued edits. A no-op when nothing is queued.
    pub fn apply(&mut self) -> ApplyReport {
        if !self.is_dirty() {
            return ApplyReport::default();
        }
        let queue = std::mem::take(&mut self.queue);
        let (root, report) = apply::apply_queue(&mut self.ast, self.root, queue);
        self.root = root;
        self.invalidate();
        debug!(
            generation = self.generation,
            replaced = report.replaced,
            deleted = report.deleted,
            inserted = report.inserted,
            pruned = report.pruned,
            dropped = report.dropped,
            "applied queued edits"
        );
        report
    }

    pub(crate) fn settle(&mut self) {
        if self.config.auto_apply {
            self.apply();
        }
    }

    // Output

    pub fn print(&self) -> Result<String> {
        self.generate(self.root)
    }

    /// Prints the subtree at `id`.
    pub fn generate(&self, id: NodeId) -> Result<String> {
        if self.is_dirty() {
            return Err(Error::DirtySession);
        }
        Ok(generate(&self.ast, id))
    }

    /// Parses `source` into this session's arena without attaching it.
    pub fn parse_detached(&mut self, source: &str) -> Result<NodeId> {
        Ok(parse_script(&mut self.ast, source)?)
    }
}
