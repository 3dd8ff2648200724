//! Arena-backed syntax tree.
//!
//! Every node lives in one [`Ast`] arena and is addressed by a [`NodeId`].
//! Rewrites never free nodes; a node that is cut out of the tree simply
//! stops being reachable from the root.

mod fields;
mod kind;
mod node;
pub mod operators;

use std::fmt;
use std::ops::{Index, IndexMut};

use id_arena::{Arena, Id};
use serde_json::{Map, Number, Value};

pub use fields::{Field, SlotMut};
pub use kind::{NodeKind, UnknownNodeKind};
pub use node::Node;
pub use operators::{
    BinaryOperator, CompoundAssignmentOperator, UnaryOperator, UpdateOperator,
    VariableDeclarationKind,
};

pub type NodeId = Id<Node>;

#[derive(Default)]
pub struct Ast {
    nodes: Arena<Node>,
}

impl fmt::Debug for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast").field("nodes", &self.nodes.len()).finish()
    }
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.alloc(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes ever allocated, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self[id].kind()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self[id].child_ids()
    }

    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        self[id].identifier_name()
    }

    /// Renames an identifier-like node in place. Returns `false` when the
    /// node carries no identifier name.
    pub fn set_identifier_name(&mut self, id: NodeId, new_name: &str) -> bool {
        match &mut self[id] {
            Node::IdentifierExpression { name }
            | Node::AssignmentTargetIdentifier { name }
            | Node::BindingIdentifier { name } => {
                new_name.clone_into(name);
                true
            }
            _ => false,
        }
    }

    /// Literal expressions, plus a unary operator applied directly to a
    /// numeric literal (`-1`, `!0`).
    pub fn is_literal(&self, id: NodeId) -> bool {
        match &self[id] {
            node if node.is_literal_leaf() => true,
            Node::UnaryExpression { operand, .. } => {
                matches!(self[*operand], Node::LiteralNumericExpression { .. })
            }
            _ => false,
        }
    }

    /// Copies the subtree rooted at `id` into fresh nodes.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut node = self[id].clone();
        for slot in node.slots_mut() {
            match slot {
                SlotMut::Required(child) => *child = self.deep_clone(*child),
                SlotMut::Optional(child) => {
                    if let Some(child) = child {
                        *child = self.deep_clone(*child);
                    }
                }
                SlotMut::List(children) => {
                    for child in children.iter_mut() {
                        *child = self.deep_clone(*child);
                    }
                }
                SlotMut::SparseList(children) => {
                    for child in children.iter_mut().flatten() {
                        *child = self.deep_clone(*child);
                    }
                }
            }
        }
        self.alloc(node)
    }

    /// Renders a subtree as JSON, one object per node with a `type` key.
    pub fn to_value(&self, id: NodeId) -> Value {
        let node = &self[id];
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(node.kind().name().to_string()));
        for (name, field) in node.fields() {
            let value = match field {
                Field::Node(child) => self.to_value(child),
                Field::OptNode(child) => self.opt_value(child),
                Field::List(children) => {
                    Value::Array(children.iter().map(|c| self.to_value(*c)).collect())
                }
                Field::SparseList(children) => {
                    Value::Array(children.iter().map(|c| self.opt_value(*c)).collect())
                }
                Field::Str(s) => Value::String(s.to_string()),
                Field::Num(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
                Field::Bool(b) => Value::Bool(b),
            };
            map.insert(name.to_string(), value);
        }
        Value::Object(map)
    }

    fn opt_value(&self, id: Option<NodeId>) -> Value {
        id.map_or(Value::Null, |id| self.to_value(id))
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(ast: &mut Ast) -> NodeId {
        let object = ast.alloc(Node::IdentifierExpression { name: "a".into() });
        let expression = ast.alloc(Node::LiteralStringExpression { value: "b".into() });
        ast.alloc(Node::ComputedMemberExpression { object, expression })
    }

    #[test]
    fn test_deep_clone_allocates_fresh_nodes() {
        let mut ast = Ast::new();
        let original = member(&mut ast);
        let copy = ast.deep_clone(original);

        assert_ne!(original, copy);
        assert_eq!(ast.to_value(original), ast.to_value(copy));
        assert_eq!(ast.len(), 6);
        for (a, b) in ast.children(original).into_iter().zip(ast.children(copy)) {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_to_value_shape() {
        let mut ast = Ast::new();
        let id = member(&mut ast);
        let value = ast.to_value(id);

        assert_eq!(value["type"], "ComputedMemberExpression");
        assert_eq!(value["object"]["name"], "a");
        assert_eq!(value["expression"]["value"], "b");
    }

    #[test]
    fn test_is_literal() {
        let mut ast = Ast::new();
        let one = ast.alloc(Node::LiteralNumericExpression { value: 1.0 });
        let neg = ast.alloc(Node::UnaryExpression {
            operator: UnaryOperator::Minus,
            operand: one,
        });
        let ident = ast.alloc(Node::IdentifierExpression { name: "x".into() });
        let not_ident = ast.alloc(Node::UnaryExpression {
            operator: UnaryOperator::Not,
            operand: ident,
        });

        assert!(ast.is_literal(one));
        assert!(ast.is_literal(neg));
        assert!(!ast.is_literal(ident));
        assert!(!ast.is_literal(not_ident));
    }

    #[test]
    fn test_set_identifier_name() {
        let mut ast = Ast::new();
        let id = ast.alloc(Node::BindingIdentifier { name: "a".into() });
        let lit = ast.alloc(Node::LiteralNullExpression);

        assert!(ast.set_identifier_name(id, "b"));
        assert_eq!(ast.identifier_name(id), Some("b"));
        assert!(!ast.set_identifier_name(lit, "b"));
    }
}
