//! Enter/leave tree walking and parent maps.

use rustc_hash::FxHashMap;

use crate::ast::{Ast, NodeId};

pub type ParentMap = FxHashMap<NodeId, NodeId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitControl {
    Continue,
    /// Do not descend into the children of the entered node. `leave` is
    /// still called for it.
    Skip,
}

pub trait Visitor {
    fn enter(&mut self, _ast: &Ast, _id: NodeId, _parent: Option<NodeId>) -> VisitControl {
        VisitControl::Continue
    }

    fn leave(&mut self, _ast: &Ast, _id: NodeId, _parent: Option<NodeId>) {}
}

/// Depth-first walk from `root`, children in source order.
pub fn walk<V: Visitor + ?Sized>(ast: &Ast, root: NodeId, visitor: &mut V) {
    walk_node(ast, root, None, visitor);
}

fn walk_node<V: Visitor + ?Sized>(
    ast: &Ast,
    id: NodeId,
    parent: Option<NodeId>,
    visitor: &mut V,
) {
    if visitor.enter(ast, id, parent) == VisitControl::Continue {
        for child in ast.children(id) {
            walk_node(ast, child, Some(id), visitor);
        }
    }
    visitor.leave(ast, id, parent);
}

pub fn children(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    ast.children(id)
}

/// Every node under `root`, `root` included, in pre-order.
pub fn descendants(ast: &Ast, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        out.push(id);
        let kids = ast.children(id);
        stack.extend(kids.into_iter().rev());
    }
    out
}

pub fn build_parent_map(ast: &Ast, root: NodeId) -> ParentMap {
    let mut parents = ParentMap::default();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for child in ast.children(id) {
            parents.insert(child, id);
            stack.push(child);
        }
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::parser::parse_script_new;

    struct Recorder {
        events: Vec<String>,
        skip: NodeKind,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, ast: &Ast, id: NodeId, _parent: Option<NodeId>) -> VisitControl {
            self.events.push(format!("+{}", ast.kind(id)));
            if ast.kind(id) == self.skip {
                VisitControl::Skip
            } else {
                VisitControl::Continue
            }
        }

        fn leave(&mut self, ast: &Ast, id: NodeId, _parent: Option<NodeId>) {
            self.events.push(format!("-{}", ast.kind(id)));
        }
    }

    #[test]
    fn test_walk_order_and_skip() {
        let (ast, root) = parse_script_new("f(a);").unwrap();
        let mut recorder = Recorder {
            events: Vec::new(),
            skip: NodeKind::CallExpression,
        };
        walk(&ast, root, &mut recorder);
        assert_eq!(
            recorder.events,
            vec![
                "+Script",
                "+ExpressionStatement",
                "+CallExpression",
                "-CallExpression",
                "-ExpressionStatement",
                "-Script",
            ]
        );
    }

    #[test]
    fn test_descendants_preorder() {
        let (ast, root) = parse_script_new("a + b;").unwrap();
        let kinds: Vec<NodeKind> = descendants(&ast, root)
            .into_iter()
            .map(|id| ast.kind(id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Script,
                NodeKind::ExpressionStatement,
                NodeKind::BinaryExpression,
                NodeKind::IdentifierExpression,
                NodeKind::IdentifierExpression,
            ]
        );
    }

    #[test]
    fn test_parent_map() {
        let (ast, root) = parse_script_new("x;").unwrap();
        let parents = build_parent_map(&ast, root);
        let statement = ast.children(root)[0];
        let ident = ast.children(statement)[0];
        assert_eq!(parents.get(&ident), Some(&statement));
        assert_eq!(parents.get(&statement), Some(&root));
        assert!(!parents.contains_key(&root));
    }
}
