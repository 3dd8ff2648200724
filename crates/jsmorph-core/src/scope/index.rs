use jsmorph_syntax::{Ast, Node, NodeId};
use rustc_hash::FxHashMap;

use super::analyzer::{Scope, ScopeAnalyzer, ScopeGraph, ScopeKind, ScopeRef, Variable, VariableRef};
use crate::error::{Error, Result};

/// Handle to a [`Variable`] in one build of a [`ScopeIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId {
    index: VariableRef,
    generation: u64,
}

impl VariableId {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle to a [`Scope`] in one build of a [`ScopeIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: ScopeRef,
    generation: u64,
}

impl ScopeId {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lookup tables over a [`ScopeGraph`]: node to variable, name to
/// variables, variable to scope and scope owner to scope.
///
/// An index belongs to one tree generation. Handles it hands out carry that
/// generation and are rejected by any later build.
#[derive(Debug)]
pub struct ScopeIndex {
    graph: ScopeGraph,
    generation: u64,
    by_node: FxHashMap<NodeId, Vec<VariableRef>>,
    by_name: FxHashMap<String, Vec<VariableRef>>,
    by_owner: FxHashMap<NodeId, ScopeRef>,
}

impl ScopeIndex {
    pub fn build(ast: &Ast, root: NodeId, generation: u64) -> Self {
        let graph = ScopeAnalyzer::new(ast).analyze(root);
        Self::from_graph(graph, generation)
    }

    pub fn from_graph(graph: ScopeGraph, generation: u64) -> Self {
        let mut by_node: FxHashMap<NodeId, Vec<VariableRef>> = FxHashMap::default();
        let mut by_name: FxHashMap<String, Vec<VariableRef>> = FxHashMap::default();
        for (id, variable) in graph.variables() {
            by_name.entry(variable.name.clone()).or_default().push(id);
            let sites = variable
                .declarations
                .iter()
                .map(|d| d.node)
                .chain(variable.references.iter().map(|r| r.node));
            for node in sites {
                let entry = by_node.entry(node).or_default();
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }
        let mut by_owner = FxHashMap::default();
        // Later scopes of the same owner are nested inside earlier ones.
        for (id, scope) in graph.scopes() {
            by_owner.insert(scope.owner, id);
        }
        Self {
            graph,
            generation,
            by_node,
            by_name,
            by_owner,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn graph(&self) -> &ScopeGraph {
        &self.graph
    }

    fn check(&self, generation: u64) -> Result<()> {
        if generation == self.generation {
            Ok(())
        } else {
            Err(Error::StaleHandle {
                found: generation,
                current: self.generation,
            })
        }
    }

    fn variable_id(&self, index: VariableRef) -> VariableId {
        VariableId {
            index,
            generation: self.generation,
        }
    }

    fn scope_id(&self, index: ScopeRef) -> ScopeId {
        ScopeId {
            index,
            generation: self.generation,
        }
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable> {
        self.check(id.generation)?;
        self.graph.variable(id.index).ok_or(Error::UnknownHandle)
    }

    pub fn scope(&self, id: ScopeId) -> Result<&Scope> {
        self.check(id.generation)?;
        self.graph.scope(id.index).ok_or(Error::UnknownHandle)
    }

    pub fn scope_of(&self, id: VariableId) -> Result<ScopeId> {
        self.check(id.generation)?;
        let scope = self.graph.scope_of(id.index).ok_or(Error::UnknownHandle)?;
        Ok(self.scope_id(scope))
    }

    pub fn parent_scope(&self, id: ScopeId) -> Result<Option<ScopeId>> {
        Ok(self.scope(id)?.parent.map(|p| self.scope_id(p)))
    }

    pub fn child_scopes(&self, id: ScopeId) -> Result<Vec<ScopeId>> {
        Ok(self.scope(id)?.children.iter().map(|&c| self.scope_id(c)).collect())
    }

    pub fn scope_variables(&self, id: ScopeId) -> Result<Vec<VariableId>> {
        Ok(self
            .scope(id)?
            .variable_refs()
            .map(|v| self.variable_id(v))
            .collect())
    }

    pub fn global_scope(&self) -> ScopeId {
        self.scope_id(self.graph.global())
    }

    pub fn script_scope(&self) -> ScopeId {
        self.scope_id(self.graph.script())
    }

    /// True when the variable is an implicit global (used but never
    /// declared in the analyzed tree).
    pub fn is_global(&self, id: VariableId) -> Result<bool> {
        let scope = self.scope_of(id)?;
        Ok(self.scope(scope)?.kind == ScopeKind::Global)
    }

    /// The innermost scope introduced by `owner`, if any.
    pub fn scope_for_owner(&self, owner: NodeId) -> Option<ScopeId> {
        self.by_owner.get(&owner).map(|&s| self.scope_id(s))
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.graph.variables().map(|(id, _)| self.variable_id(id))
    }

    /// Scopes in creation order, which is document order.
    pub fn scopes(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.graph.scopes().map(|(id, _)| self.scope_id(id))
    }

    pub fn variables_by_name(&self, name: &str) -> Vec<VariableId> {
        self.by_name
            .get(name)
            .map(|vars| vars.iter().map(|&v| self.variable_id(v)).collect())
            .unwrap_or_default()
    }

    /// Resolves an identifier-like node, or a node that owns one
    /// (declarator, assignment, update, function or class), to its
    /// variable.
    pub fn lookup_variable(&self, ast: &Ast, node: NodeId) -> Result<VariableId> {
        let target = identifier_of(ast, node).unwrap_or(node);
        let found = self.by_node.get(&target).map_or(&[][..], Vec::as_slice);
        match found {
            [var] => Ok(self.variable_id(*var)),
            [] => Err(Error::UnresolvedIdentifier {
                kind: ast.kind(node),
            }),
            many => Err(Error::AmbiguousVariable {
                kind: ast.kind(node),
                count: many.len(),
            }),
        }
    }

    /// Updates the recorded name of a variable after its identifiers were
    /// renamed in the tree. Handles stay valid.
    pub(crate) fn rename(&mut self, id: VariableId, new_name: &str) -> Result<()> {
        let old_name = self.variable(id)?.name.clone();
        if let Some(vars) = self.by_name.get_mut(&old_name) {
            vars.retain(|&v| v != id.index);
            if vars.is_empty() {
                self.by_name.remove(&old_name);
            }
        }
        self.by_name
            .entry(new_name.to_string())
            .or_default()
            .push(id.index);
        if self.graph.rename(id.index, new_name) {
            Ok(())
        } else {
            Err(Error::UnknownHandle)
        }
    }
}

/// The identifier node a declaration-owning or assigning node names.
fn identifier_of(ast: &Ast, node: NodeId) -> Option<NodeId> {
    match &ast[node] {
        Node::VariableDeclarator { binding, .. }
        | Node::AssignmentExpression { binding, .. }
        | Node::CompoundAssignmentExpression { binding, .. }
        | Node::BindingWithDefault { binding, .. }
        | Node::BindingPropertyIdentifier { binding, .. } => Some(*binding),
        Node::UpdateExpression { operand, .. } => Some(*operand),
        Node::FunctionDeclaration { name, .. }
        | Node::ClassDeclaration { name, .. }
        | Node::ShorthandProperty { name } => Some(*name),
        Node::FunctionExpression { name, .. } | Node::ClassExpression { name, .. } => *name,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsmorph_syntax::{parse_script_new, query_str};

    fn index(source: &str) -> (Ast, NodeId, ScopeIndex) {
        let (ast, root) = parse_script_new(source).unwrap();
        let index = ScopeIndex::build(&ast, root, 0);
        (ast, root, index)
    }

    #[test]
    fn test_lookup_from_every_site() {
        let (ast, root, index) = index("var a = 1; a = 2; a++; f(a);");
        let declarator = query_str(&ast, &[root], "VariableDeclarator").unwrap()[0];
        let expected = index.lookup_variable(&ast, declarator).unwrap();
        for selector in ["AssignmentExpression", "UpdateExpression", "IdentifierExpression[name=\"a\"]"] {
            let node = query_str(&ast, &[root], selector).unwrap()[0];
            assert_eq!(index.lookup_variable(&ast, node).unwrap(), expected, "{selector}");
        }
        let variable = index.variable(expected).unwrap();
        assert_eq!(variable.name, "a");
        assert_eq!(variable.declarations.len(), 1);
        assert_eq!(variable.references.len(), 4);
    }

    #[test]
    fn test_unresolvable_node() {
        let (ast, root, index) = index("1;");
        let literal = query_str(&ast, &[root], "LiteralNumericExpression").unwrap()[0];
        assert!(matches!(
            index.lookup_variable(&ast, literal),
            Err(Error::UnresolvedIdentifier { .. })
        ));
    }

    #[test]
    fn test_by_name_spans_scopes() {
        let (_, _, index) = index("var a; function f() { var a; }");
        assert_eq!(index.variables_by_name("a").len(), 2);
        assert!(index.variables_by_name("missing").is_empty());
    }

    #[test]
    fn test_stale_handles_are_rejected() {
        let (ast, root, index) = index("var a;");
        let var = index.variables_by_name("a")[0];
        let rebuilt = ScopeIndex::build(&ast, root, 1);
        assert!(matches!(
            rebuilt.variable(var),
            Err(Error::StaleHandle { found: 0, current: 1 })
        ));
    }

    #[test]
    fn test_global_detection() {
        let (_, _, index) = index("var a; b = 1;");
        let a = index.variables_by_name("a")[0];
        let b = index.variables_by_name("b")[0];
        assert!(!index.is_global(a).unwrap());
        assert!(index.is_global(b).unwrap());
    }

    #[test]
    fn test_scope_for_owner() {
        let (ast, root, index) = index("function f() {}");
        let function = query_str(&ast, &[root], "FunctionDeclaration").unwrap()[0];
        let scope = index.scope_for_owner(function).unwrap();
        assert_eq!(index.scope(scope).unwrap().kind, ScopeKind::Function);
        assert_eq!(index.scope_for_owner(root), Some(index.script_scope()));
    }

    #[test]
    fn test_rename_keeps_handles_valid() {
        let (_, _, mut index) = index("var a;");
        let var = index.variables_by_name("a")[0];
        index.rename(var, "b").unwrap();
        assert_eq!(index.variable(var).unwrap().name, "b");
        assert_eq!(index.variables_by_name("b"), vec![var]);
        assert!(index.variables_by_name("a").is_empty());
    }

    #[test]
    fn test_handle_from_another_index_is_an_error() {
        let (_, _, wide) = index("var a; var b; var c;");
        let (_, _, narrow) = index("var a;");
        let c = wide.variables_by_name("c")[0];
        assert!(matches!(narrow.variable(c), Err(Error::UnknownHandle)));
        assert!(matches!(narrow.scope_of(c), Err(Error::UnknownHandle)));
    }

    #[test]
    fn test_rename_onto_sibling_keeps_both_in_scope() {
        let (ast, root, mut index) = index("function f() { var a = 1; var b = 2; return a + b; }");
        let function = query_str(&ast, &[root], "FunctionDeclaration").unwrap()[0];
        let scope = index.scope_for_owner(function).unwrap();
        let a = index.variables_by_name("a")[0];
        let b = index.variables_by_name("b")[0];
        index.rename(a, "b").unwrap();

        let in_scope = index.scope_variables(scope).unwrap();
        assert_eq!(in_scope.len(), 3);
        assert!(in_scope.contains(&a) && in_scope.contains(&b));
        let names: Vec<&str> = index.scope(scope).unwrap().variable_names().collect();
        assert_eq!(names, ["arguments", "b"]);
        assert_eq!(index.variables_by_name("b"), vec![b, a]);
    }
}
