//! Lexical scope construction.
//!
//! Runs in two phases over the tree: the first creates every scope and
//! declares every binding (so hoisted declarations are visible before their
//! textual position), the second resolves the identifier uses collected by
//! the first. Names that resolve nowhere become implicit variables of the
//! global scope.

use id_arena::{Arena, Id};
use indexmap::IndexMap;
use jsmorph_syntax::ast::VariableDeclarationKind;
use jsmorph_syntax::{Ast, Node, NodeId};
use tracing::trace;

pub type ScopeRef = Id<Scope>;
pub type VariableRef = Id<Variable>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Implicit globals: names used but never declared.
    Global,
    /// Top-level declarations of the analyzed tree.
    Script,
    Function,
    ArrowFunction,
    /// Binds the name of a named function expression.
    FunctionName,
    /// Binds the name of a named class expression.
    ClassName,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Read,
    Write,
    ReadWrite,
}

impl Accessibility {
    pub fn is_read(self) -> bool {
        matches!(self, Accessibility::Read | Accessibility::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Accessibility::Write | Accessibility::ReadWrite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    FunctionDeclaration,
    FunctionExpressionName,
    ClassDeclaration,
    ClassExpressionName,
    Parameter,
}

impl From<VariableDeclarationKind> for DeclarationKind {
    fn from(kind: VariableDeclarationKind) -> Self {
        match kind {
            VariableDeclarationKind::Var => DeclarationKind::Var,
            VariableDeclarationKind::Let => DeclarationKind::Let,
            VariableDeclarationKind::Const => DeclarationKind::Const,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    /// The `BindingIdentifier` introducing the name.
    pub node: NodeId,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// An `IdentifierExpression`, `AssignmentTargetIdentifier` or, for
    /// initialized declarators, the `BindingIdentifier`.
    pub node: NodeId,
    pub accessibility: Accessibility,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub references: Vec<Reference>,
    pub(crate) scope: ScopeRef,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// The node that introduces the scope.
    pub owner: NodeId,
    pub(crate) parent: Option<ScopeRef>,
    pub(crate) children: Vec<ScopeRef>,
    /// Variables bound here, by name. A rename onto a name already bound in
    /// the same scope leaves both variables under that name, earliest first.
    pub(crate) variables: IndexMap<String, Vec<VariableRef>>,
}

impl Scope {
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// The variables bound by this scope, grouped by name.
    pub fn variable_refs(&self) -> impl Iterator<Item = VariableRef> + '_ {
        self.variables.values().flatten().copied()
    }

    fn binding(&self, name: &str) -> Option<VariableRef> {
        self.variables.get(name).and_then(|vars| vars.first()).copied()
    }
}

/// All scopes and variables of one analyzed tree.
#[derive(Debug)]
pub struct ScopeGraph {
    pub(crate) scopes: Arena<Scope>,
    pub(crate) variables: Arena<Variable>,
    pub(crate) global: ScopeRef,
    pub(crate) script: ScopeRef,
}

impl ScopeGraph {
    pub fn global(&self) -> ScopeRef {
        self.global
    }

    pub fn script(&self) -> ScopeRef {
        self.script
    }

    /// `None` for a handle from another graph.
    pub fn scope(&self, id: ScopeRef) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn variable(&self, id: VariableRef) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn scope_of(&self, id: VariableRef) -> Option<ScopeRef> {
        self.variables.get(id).map(|v| v.scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeRef, &Scope)> {
        self.scopes.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableRef, &Variable)> {
        self.variables.iter()
    }

    /// Looks `name` up from `scope` outwards.
    pub fn resolve(&self, scope: ScopeRef, name: &str) -> Option<VariableRef> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            if let Some(var) = scope.binding(name) {
                return Some(var);
            }
            current = scope.parent;
        }
        None
    }

    /// Moves `id` to `new_name` in its scope's table. Returns false for a
    /// handle from another graph.
    pub(crate) fn rename(&mut self, id: VariableRef, new_name: &str) -> bool {
        let Some(variable) = self.variables.get_mut(id) else {
            return false;
        };
        let old_name = std::mem::replace(&mut variable.name, new_name.to_string());
        let Some(scope) = self.scopes.get_mut(variable.scope) else {
            return false;
        };
        if let Some(vars) = scope.variables.get_mut(&old_name) {
            vars.retain(|&v| v != id);
            if vars.is_empty() {
                scope.variables.shift_remove(&old_name);
            }
        }
        let vars = scope.variables.entry(new_name.to_string()).or_default();
        if !vars.contains(&id) {
            vars.push(id);
        }
        true
    }
}

pub struct ScopeAnalyzer<'a> {
    ast: &'a Ast,
    scopes: Arena<Scope>,
    variables: Arena<Variable>,
    unresolved: Vec<(NodeId, Accessibility, ScopeRef)>,
}

impl<'a> ScopeAnalyzer<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            scopes: Arena::new(),
            variables: Arena::new(),
            unresolved: Vec::new(),
        }
    }

    /// Builds the scope graph for the tree at `root`. A `Script` root
    /// contributes its statements to the script scope; any other root is
    /// analyzed as if it were the only statement of a script.
    pub fn analyze(mut self, root: NodeId) -> ScopeGraph {
        let global = self.push_scope(ScopeKind::Global, root, None);
        let script = self.push_scope(ScopeKind::Script, root, Some(global));
        match &self.ast[root] {
            Node::Script { statements } => {
                for &statement in statements {
                    self.visit(statement, script);
                }
            }
            _ => self.visit(root, script),
        }

        let unresolved = std::mem::take(&mut self.unresolved);
        let mut graph = ScopeGraph {
            scopes: self.scopes,
            variables: self.variables,
            global,
            script,
        };
        for (node, accessibility, scope) in unresolved {
            let Some(name) = self.ast.identifier_name(node) else {
                continue;
            };
            let var = match graph.resolve(scope, name) {
                Some(var) => var,
                None => {
                    trace!(name, "implicit global");
                    Self::new_variable(&mut graph.scopes, &mut graph.variables, global, name)
                }
            };
            graph.variables[var].references.push(Reference {
                node,
                accessibility,
            });
        }
        graph
    }

    fn push_scope(&mut self, kind: ScopeKind, owner: NodeId, parent: Option<ScopeRef>) -> ScopeRef {
        let id = self.scopes.alloc(Scope {
            kind,
            owner,
            parent,
            children: Vec::new(),
            variables: IndexMap::new(),
        });
        if let Some(parent) = parent {
            self.scopes[parent].children.push(id);
        }
        id
    }

    fn new_variable(
        scopes: &mut Arena<Scope>,
        variables: &mut Arena<Variable>,
        scope: ScopeRef,
        name: &str,
    ) -> VariableRef {
        let id = variables.alloc(Variable {
            name: name.to_string(),
            declarations: Vec::new(),
            references: Vec::new(),
            scope,
        });
        scopes[scope].variables.insert(name.to_string(), vec![id]);
        id
    }

    fn declare(&mut self, scope: ScopeRef, node: NodeId, kind: DeclarationKind) {
        let Some(name) = self.ast.identifier_name(node) else {
            return;
        };
        let var = match self.scopes[scope].binding(name) {
            Some(var) => var,
            None => Self::new_variable(&mut self.scopes, &mut self.variables, scope, name),
        };
        self.variables[var].declarations.push(Declaration { node, kind });
    }

    fn reference(&mut self, node: NodeId, accessibility: Accessibility, scope: ScopeRef) {
        self.unresolved.push((node, accessibility, scope));
    }

    /// Nearest scope that receives `var` and function declarations.
    fn hoist_target(&self, scope: ScopeRef) -> ScopeRef {
        let mut current = scope;
        loop {
            let entry = &self.scopes[current];
            match (entry.kind, entry.parent) {
                (ScopeKind::Function | ScopeKind::ArrowFunction | ScopeKind::Script, _) => {
                    return current
                }
                (_, Some(parent)) => current = parent,
                (_, None) => return current,
            }
        }
    }

    fn visit(&mut self, id: NodeId, scope: ScopeRef) {
        let ast = self.ast;
        match &ast[id] {
            Node::Block { statements } => {
                let block = self.push_scope(ScopeKind::Block, id, Some(scope));
                for &statement in statements {
                    self.visit(statement, block);
                }
            }
            Node::VariableDeclaration { kind, declarators } => {
                let target = match kind {
                    VariableDeclarationKind::Var => self.hoist_target(scope),
                    _ => scope,
                };
                for &declarator in declarators {
                    let Node::VariableDeclarator { binding, init } = &ast[declarator] else {
                        continue;
                    };
                    self.declare_pattern(*binding, target, (*kind).into());
                    self.visit_pattern_expressions(*binding, scope);
                    if let Some(init) = init {
                        for ident in binding_identifiers(ast, *binding) {
                            self.reference(ident, Accessibility::Write, scope);
                        }
                        self.visit(*init, scope);
                    }
                }
            }
            Node::FunctionDeclaration { name, params, body } => {
                let target = self.hoist_target(scope);
                self.declare(target, *name, DeclarationKind::FunctionDeclaration);
                self.visit_function(id, *params, *body, scope, ScopeKind::Function);
            }
            Node::FunctionExpression { name, params, body } => {
                let outer = match name {
                    Some(name) => {
                        let named = self.push_scope(ScopeKind::FunctionName, id, Some(scope));
                        self.declare(named, *name, DeclarationKind::FunctionExpressionName);
                        named
                    }
                    None => scope,
                };
                self.visit_function(id, *params, *body, outer, ScopeKind::Function);
            }
            Node::ArrowExpression { params, body } => {
                self.visit_function(id, *params, *body, scope, ScopeKind::ArrowFunction);
            }
            Node::Method { name, params, body, .. } => {
                self.visit(*name, scope);
                self.visit_function(id, *params, *body, scope, ScopeKind::Function);
            }
            Node::ClassDeclaration {
                name,
                super_class,
                elements,
            } => {
                self.declare(scope, *name, DeclarationKind::ClassDeclaration);
                if let Some(super_class) = super_class {
                    self.visit(*super_class, scope);
                }
                for &element in elements {
                    self.visit(element, scope);
                }
            }
            Node::ClassExpression {
                name,
                super_class,
                elements,
            } => {
                let inner = match name {
                    Some(name) => {
                        let named = self.push_scope(ScopeKind::ClassName, id, Some(scope));
                        self.declare(named, *name, DeclarationKind::ClassExpressionName);
                        named
                    }
                    None => scope,
                };
                if let Some(super_class) = super_class {
                    self.visit(*super_class, inner);
                }
                for &element in elements {
                    self.visit(element, inner);
                }
            }
            Node::ForStatement { init, .. } => {
                let lexical = init.is_some_and(|init| {
                    matches!(
                        ast[init],
                        Node::VariableDeclaration {
                            kind: VariableDeclarationKind::Let | VariableDeclarationKind::Const,
                            ..
                        }
                    )
                });
                let inner = if lexical {
                    self.push_scope(ScopeKind::Block, id, Some(scope))
                } else {
                    scope
                };
                for child in ast.children(id) {
                    self.visit(child, inner);
                }
            }
            Node::IdentifierExpression { .. } => {
                self.reference(id, Accessibility::Read, scope);
            }
            Node::AssignmentExpression {
                binding,
                expression,
            } => {
                self.visit_target(*binding, Accessibility::Write, scope);
                self.visit(*expression, scope);
            }
            Node::CompoundAssignmentExpression {
                binding,
                expression,
                ..
            } => {
                self.visit_target(*binding, Accessibility::ReadWrite, scope);
                self.visit(*expression, scope);
            }
            Node::UpdateExpression { operand, .. } => {
                self.visit_target(*operand, Accessibility::ReadWrite, scope);
            }
            // Declared by their owners.
            Node::BindingIdentifier { .. } | Node::AssignmentTargetIdentifier { .. } => {}
            _ => {
                for child in ast.children(id) {
                    self.visit(child, scope);
                }
            }
        }
    }

    fn visit_target(&mut self, target: NodeId, accessibility: Accessibility, scope: ScopeRef) {
        if matches!(self.ast[target], Node::AssignmentTargetIdentifier { .. }) {
            self.reference(target, accessibility, scope);
        } else {
            self.visit(target, scope);
        }
    }

    fn visit_function(
        &mut self,
        owner: NodeId,
        params: NodeId,
        body: NodeId,
        parent: ScopeRef,
        kind: ScopeKind,
    ) {
        let function = self.push_scope(kind, owner, Some(parent));
        if kind == ScopeKind::Function {
            Self::new_variable(&mut self.scopes, &mut self.variables, function, "arguments");
        }
        self.declare_pattern(params, function, DeclarationKind::Parameter);
        self.visit_pattern_expressions(params, function);

        let ast = self.ast;
        match &ast[body] {
            Node::FunctionBody { statements } => {
                for &statement in statements {
                    self.visit(statement, function);
                }
            }
            _ => self.visit(body, function),
        }
    }

    fn declare_pattern(&mut self, pattern: NodeId, scope: ScopeRef, kind: DeclarationKind) {
        for ident in binding_identifiers(self.ast, pattern) {
            self.declare(scope, ident, kind);
        }
    }

    /// Default values and computed keys inside a binding pattern.
    fn visit_pattern_expressions(&mut self, pattern: NodeId, scope: ScopeRef) {
        let ast = self.ast;
        match &ast[pattern] {
            Node::BindingWithDefault { binding, init } => {
                self.visit_pattern_expressions(*binding, scope);
                self.visit(*init, scope);
            }
            Node::BindingPropertyIdentifier { init, .. } => {
                if let Some(init) = init {
                    self.visit(*init, scope);
                }
            }
            Node::BindingPropertyProperty { name, binding } => {
                self.visit(*name, scope);
                self.visit_pattern_expressions(*binding, scope);
            }
            Node::FormalParameters { .. } | Node::ArrayBinding { .. } | Node::ObjectBinding { .. } => {
                for child in ast.children(pattern) {
                    self.visit_pattern_expressions(child, scope);
                }
            }
            _ => {}
        }
    }
}

/// Every `BindingIdentifier` introduced by a binding pattern, in source
/// order.
pub fn binding_identifiers(ast: &Ast, pattern: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_binding_identifiers(ast, pattern, &mut out);
    out
}

fn collect_binding_identifiers(ast: &Ast, id: NodeId, out: &mut Vec<NodeId>) {
    match &ast[id] {
        Node::BindingIdentifier { .. } => out.push(id),
        Node::BindingWithDefault { binding, .. }
        | Node::BindingPropertyIdentifier { binding, .. }
        | Node::BindingPropertyProperty { binding, .. } => {
            collect_binding_identifiers(ast, *binding, out)
        }
        Node::FormalParameters { items, rest } => {
            for &item in items {
                collect_binding_identifiers(ast, item, out);
            }
            if let Some(rest) = rest {
                collect_binding_identifiers(ast, *rest, out);
            }
        }
        Node::ArrayBinding { elements, rest } => {
            for element in elements.iter().flatten() {
                collect_binding_identifiers(ast, *element, out);
            }
            if let Some(rest) = rest {
                collect_binding_identifiers(ast, *rest, out);
            }
        }
        Node::ObjectBinding { properties } => {
            for &property in properties {
                collect_binding_identifiers(ast, property, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsmorph_syntax::parse_script_new;

    fn analyze(source: &str) -> (Ast, ScopeGraph) {
        let (ast, root) = parse_script_new(source).unwrap();
        let graph = ScopeAnalyzer::new(&ast).analyze(root);
        (ast, graph)
    }

    fn find<'g>(graph: &'g ScopeGraph, name: &str) -> Vec<&'g Variable> {
        graph.variables().map(|(_, v)| v).filter(|v| v.name == name).collect()
    }

    #[test]
    fn test_top_level_declarations_live_in_script_scope() {
        let (_, graph) = analyze("var a = 1; let b; function c() {}");
        let script = graph.scope(graph.script()).unwrap();
        let names: Vec<&str> = script.variable_names().collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(graph.scope(graph.global()).unwrap().variables.is_empty());
    }

    #[test]
    fn test_undeclared_names_are_implicit_globals() {
        let (_, graph) = analyze("x = window.y;");
        let global = graph.scope(graph.global()).unwrap();
        let names: Vec<&str> = global.variable_names().collect();
        assert_eq!(names, ["x", "window"]);
        let x = find(&graph, "x")[0];
        assert!(x.declarations.is_empty());
        assert_eq!(x.references[0].accessibility, Accessibility::Write);
    }

    #[test]
    fn test_var_hoists_out_of_blocks() {
        let (_, graph) = analyze("function f() { { var a; let b; } }");
        let a = find(&graph, "a")[0];
        let b = find(&graph, "b")[0];
        assert_eq!(graph.scope(a.scope).unwrap().kind, ScopeKind::Function);
        assert_eq!(graph.scope(b.scope).unwrap().kind, ScopeKind::Block);
    }

    #[test]
    fn test_hoisted_use_before_declaration_resolves() {
        let (_, graph) = analyze("function f() { g(); function g() {} }");
        let g = find(&graph, "g");
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].references.len(), 1);
        assert_eq!(g[0].declarations[0].kind, DeclarationKind::FunctionDeclaration);
    }

    #[test]
    fn test_reference_accessibility() {
        let (_, graph) = analyze("var a = 1; a; a = 2; a += 3; a++;");
        let a = find(&graph, "a")[0];
        let kinds: Vec<Accessibility> = a.references.iter().map(|r| r.accessibility).collect();
        assert_eq!(
            kinds,
            [
                Accessibility::Write,
                Accessibility::Read,
                Accessibility::Write,
                Accessibility::ReadWrite,
                Accessibility::ReadWrite,
            ]
        );
    }

    #[test]
    fn test_functions_have_implicit_arguments() {
        let (_, graph) = analyze("function f(a) { arguments[0] = 1; } var g = (b) => arguments;");
        let arguments = find(&graph, "arguments");
        assert_eq!(arguments.len(), 2);
        let local = arguments
            .iter()
            .find(|v| graph.scope(v.scope).unwrap().kind == ScopeKind::Function)
            .unwrap();
        assert_eq!(local.references.len(), 1);
        let global = arguments
            .iter()
            .find(|v| graph.scope(v.scope).unwrap().kind == ScopeKind::Global)
            .unwrap();
        assert_eq!(global.references.len(), 1);
    }

    #[test]
    fn test_parameters_and_defaults() {
        let (_, graph) = analyze("function f(a, { b, c: [d] }, e = a, ...f) {}");
        for name in ["a", "b", "d", "e"] {
            let var = find(&graph, name)
                .into_iter()
                .find(|v| !v.declarations.is_empty())
                .unwrap();
            assert_eq!(var.declarations[0].kind, DeclarationKind::Parameter, "{name}");
        }
        let a = find(&graph, "a")[0];
        assert_eq!(a.references.len(), 1);
    }

    #[test]
    fn test_named_function_expression_scope() {
        let (_, graph) = analyze("var f = function g() { return g; };");
        let g = find(&graph, "g")[0];
        assert_eq!(graph.scope(g.scope).unwrap().kind, ScopeKind::FunctionName);
        assert_eq!(g.references.len(), 1);
    }

    #[test]
    fn test_for_let_gets_its_own_scope() {
        let (_, graph) = analyze("for (let i = 0; i < 3; i++) {}");
        let i = find(&graph, "i")[0];
        assert_eq!(graph.scope(i.scope).unwrap().kind, ScopeKind::Block);
        assert_eq!(i.references.len(), 3);
    }

    #[test]
    fn test_shadowing() {
        let (_, graph) = analyze("var a; function f() { var a; a; } a;");
        let vars = find(&graph, "a");
        assert_eq!(vars.len(), 2);
        assert!(vars.iter().all(|v| v.references.len() == 1));
    }
}
