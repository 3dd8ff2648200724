//! Uniform field reflection over [`Node`].
//!
//! `fields` is the read side used by traversal, the selector engine and the
//! JSON rendering; `slots_mut` is the write side used when rewriting
//! children. Both list fields in source order.

use super::node::Node;
use super::NodeId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Node(NodeId),
    OptNode(Option<NodeId>),
    List(&'a [NodeId]),
    SparseList(&'a [Option<NodeId>]),
    Str(&'a str),
    Num(f64),
    Bool(bool),
}

#[derive(Debug)]
pub enum SlotMut<'a> {
    Required(&'a mut NodeId),
    Optional(&'a mut Option<NodeId>),
    List(&'a mut Vec<NodeId>),
    SparseList(&'a mut Vec<Option<NodeId>>),
}

impl Node {
    pub fn fields(&self) -> Vec<(&'static str, Field<'_>)> {
        use Field as F;
        match self {
            Node::Script { statements }
            | Node::Block { statements }
            | Node::FunctionBody { statements } => vec![("statements", F::List(statements))],
            Node::FormalParameters { items, rest } => {
                vec![("items", F::List(items)), ("rest", F::OptNode(*rest))]
            }
            Node::VariableDeclarationStatement { declaration } => {
                vec![("declaration", F::Node(*declaration))]
            }
            Node::VariableDeclaration { kind, declarators } => vec![
                ("kind", F::Str(kind.as_str())),
                ("declarators", F::List(declarators)),
            ],
            Node::VariableDeclarator { binding, init } => {
                vec![("binding", F::Node(*binding)), ("init", F::OptNode(*init))]
            }
            Node::ExpressionStatement { expression } | Node::ThrowStatement { expression } => {
                vec![("expression", F::Node(*expression))]
            }
            Node::ReturnStatement { expression } => vec![("expression", F::OptNode(*expression))],
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => vec![
                ("test", F::Node(*test)),
                ("consequent", F::Node(*consequent)),
                ("alternate", F::OptNode(*alternate)),
            ],
            Node::WhileStatement { test, body } => {
                vec![("test", F::Node(*test)), ("body", F::Node(*body))]
            }
            Node::ForStatement {
                init,
                test,
                update,
                body,
            } => vec![
                ("init", F::OptNode(*init)),
                ("test", F::OptNode(*test)),
                ("update", F::OptNode(*update)),
                ("body", F::Node(*body)),
            ],
            Node::BlockStatement { block } => vec![("block", F::Node(*block))],
            Node::EmptyStatement
            | Node::DebuggerStatement
            | Node::BreakStatement
            | Node::ContinueStatement
            | Node::LiteralNullExpression
            | Node::ThisExpression => Vec::new(),
            Node::FunctionDeclaration { name, params, body } => vec![
                ("name", F::Node(*name)),
                ("params", F::Node(*params)),
                ("body", F::Node(*body)),
            ],
            Node::ClassDeclaration {
                name,
                super_class,
                elements,
            } => vec![
                ("name", F::Node(*name)),
                ("super", F::OptNode(*super_class)),
                ("elements", F::List(elements)),
            ],
            Node::Method {
                is_static,
                name,
                params,
                body,
            } => vec![
                ("isStatic", F::Bool(*is_static)),
                ("name", F::Node(*name)),
                ("params", F::Node(*params)),
                ("body", F::Node(*body)),
            ],
            Node::DataProperty { name, expression } => {
                vec![("name", F::Node(*name)), ("expression", F::Node(*expression))]
            }
            Node::ShorthandProperty { name } => vec![("name", F::Node(*name))],
            Node::StaticPropertyName { value } | Node::LiteralStringExpression { value } => {
                vec![("value", F::Str(value))]
            }
            Node::ComputedPropertyName { expression } | Node::SpreadElement { expression } => {
                vec![("expression", F::Node(*expression))]
            }
            Node::FunctionExpression { name, params, body } => vec![
                ("name", F::OptNode(*name)),
                ("params", F::Node(*params)),
                ("body", F::Node(*body)),
            ],
            Node::ArrowExpression { params, body } => {
                vec![("params", F::Node(*params)), ("body", F::Node(*body))]
            }
            Node::ClassExpression {
                name,
                super_class,
                elements,
            } => vec![
                ("name", F::OptNode(*name)),
                ("super", F::OptNode(*super_class)),
                ("elements", F::List(elements)),
            ],
            Node::IdentifierExpression { name }
            | Node::AssignmentTargetIdentifier { name }
            | Node::BindingIdentifier { name } => vec![("name", F::Str(name))],
            Node::LiteralNumericExpression { value } => vec![("value", F::Num(*value))],
            Node::LiteralBooleanExpression { value } => vec![("value", F::Bool(*value))],
            Node::ArrayExpression { elements } => vec![("elements", F::SparseList(elements))],
            Node::ObjectExpression { properties } | Node::ObjectBinding { properties } => {
                vec![("properties", F::List(properties))]
            }
            Node::BinaryExpression {
                operator,
                left,
                right,
            } => vec![
                ("operator", F::Str(operator.as_str())),
                ("left", F::Node(*left)),
                ("right", F::Node(*right)),
            ],
            Node::UnaryExpression { operator, operand } => vec![
                ("operator", F::Str(operator.as_str())),
                ("operand", F::Node(*operand)),
            ],
            Node::UpdateExpression {
                is_prefix,
                operator,
                operand,
            } => vec![
                ("isPrefix", F::Bool(*is_prefix)),
                ("operator", F::Str(operator.as_str())),
                ("operand", F::Node(*operand)),
            ],
            Node::AssignmentExpression {
                binding,
                expression,
            } => vec![
                ("binding", F::Node(*binding)),
                ("expression", F::Node(*expression)),
            ],
            Node::CompoundAssignmentExpression {
                operator,
                binding,
                expression,
            } => vec![
                ("binding", F::Node(*binding)),
                ("operator", F::Str(operator.as_str())),
                ("expression", F::Node(*expression)),
            ],
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![
                ("test", F::Node(*test)),
                ("consequent", F::Node(*consequent)),
                ("alternate", F::Node(*alternate)),
            ],
            Node::CallExpression { callee, arguments } | Node::NewExpression { callee, arguments } => {
                vec![("callee", F::Node(*callee)), ("arguments", F::List(arguments))]
            }
            Node::StaticMemberExpression { object, property }
            | Node::StaticMemberAssignmentTarget { object, property } => {
                vec![("object", F::Node(*object)), ("property", F::Str(property))]
            }
            Node::ComputedMemberExpression { object, expression }
            | Node::ComputedMemberAssignmentTarget { object, expression } => vec![
                ("object", F::Node(*object)),
                ("expression", F::Node(*expression)),
            ],
            Node::BindingWithDefault { binding, init } => {
                vec![("binding", F::Node(*binding)), ("init", F::Node(*init))]
            }
            Node::ArrayBinding { elements, rest } => vec![
                ("elements", F::SparseList(elements)),
                ("rest", F::OptNode(*rest)),
            ],
            Node::BindingPropertyIdentifier { binding, init } => {
                vec![("binding", F::Node(*binding)), ("init", F::OptNode(*init))]
            }
            Node::BindingPropertyProperty { name, binding } => {
                vec![("name", F::Node(*name)), ("binding", F::Node(*binding))]
            }
        }
    }

    /// Mutable child slots in the same order as the node fields of
    /// [`Node::fields`]. Scalar fields are not exposed.
    pub fn slots_mut(&mut self) -> Vec<SlotMut<'_>> {
        use SlotMut as S;
        match self {
            Node::Script { statements }
            | Node::Block { statements }
            | Node::FunctionBody { statements } => vec![S::List(statements)],
            Node::FormalParameters { items, rest } => vec![S::List(items), S::Optional(rest)],
            Node::VariableDeclarationStatement { declaration } => vec![S::Required(declaration)],
            Node::VariableDeclaration { declarators, .. } => vec![S::List(declarators)],
            Node::VariableDeclarator { binding, init } => {
                vec![S::Required(binding), S::Optional(init)]
            }
            Node::ExpressionStatement { expression }
            | Node::ThrowStatement { expression }
            | Node::ComputedPropertyName { expression }
            | Node::SpreadElement { expression } => vec![S::Required(expression)],
            Node::ReturnStatement { expression } => vec![S::Optional(expression)],
            Node::IfStatement {
                test,
                consequent,
                alternate,
            } => vec![
                S::Required(test),
                S::Required(consequent),
                S::Optional(alternate),
            ],
            Node::WhileStatement { test, body } => vec![S::Required(test), S::Required(body)],
            Node::ForStatement {
                init,
                test,
                update,
                body,
            } => vec![
                S::Optional(init),
                S::Optional(test),
                S::Optional(update),
                S::Required(body),
            ],
            Node::BlockStatement { block } => vec![S::Required(block)],
            Node::EmptyStatement
            | Node::DebuggerStatement
            | Node::BreakStatement
            | Node::ContinueStatement
            | Node::StaticPropertyName { .. }
            | Node::IdentifierExpression { .. }
            | Node::LiteralStringExpression { .. }
            | Node::LiteralNumericExpression { .. }
            | Node::LiteralBooleanExpression { .. }
            | Node::LiteralNullExpression
            | Node::ThisExpression
            | Node::AssignmentTargetIdentifier { .. }
            | Node::BindingIdentifier { .. } => Vec::new(),
            Node::FunctionDeclaration { name, params, body }
            | Node::Method {
                name, params, body, ..
            } => vec![S::Required(name), S::Required(params), S::Required(body)],
            Node::ClassDeclaration {
                name,
                super_class,
                elements,
            } => vec![S::Required(name), S::Optional(super_class), S::List(elements)],
            Node::DataProperty { name, expression } => {
                vec![S::Required(name), S::Required(expression)]
            }
            Node::ShorthandProperty { name } => vec![S::Required(name)],
            Node::FunctionExpression { name, params, body } => {
                vec![S::Optional(name), S::Required(params), S::Required(body)]
            }
            Node::ArrowExpression { params, body } => vec![S::Required(params), S::Required(body)],
            Node::ClassExpression {
                name,
                super_class,
                elements,
            } => vec![S::Optional(name), S::Optional(super_class), S::List(elements)],
            Node::ArrayExpression { elements } => vec![S::SparseList(elements)],
            Node::ObjectExpression { properties } | Node::ObjectBinding { properties } => {
                vec![S::List(properties)]
            }
            Node::BinaryExpression { left, right, .. } => vec![S::Required(left), S::Required(right)],
            Node::UnaryExpression { operand, .. } | Node::UpdateExpression { operand, .. } => {
                vec![S::Required(operand)]
            }
            Node::AssignmentExpression {
                binding,
                expression,
            }
            | Node::CompoundAssignmentExpression {
                binding,
                expression,
                ..
            } => vec![S::Required(binding), S::Required(expression)],
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![
                S::Required(test),
                S::Required(consequent),
                S::Required(alternate),
            ],
            Node::CallExpression { callee, arguments } | Node::NewExpression { callee, arguments } => {
                vec![S::Required(callee), S::List(arguments)]
            }
            Node::StaticMemberExpression { object, .. }
            | Node::StaticMemberAssignmentTarget { object, .. } => vec![S::Required(object)],
            Node::ComputedMemberExpression { object, expression }
            | Node::ComputedMemberAssignmentTarget { object, expression } => {
                vec![S::Required(object), S::Required(expression)]
            }
            Node::BindingWithDefault { binding, init } => {
                vec![S::Required(binding), S::Required(init)]
            }
            Node::ArrayBinding { elements, rest } => vec![S::SparseList(elements), S::Optional(rest)],
            Node::BindingPropertyIdentifier { binding, init } => {
                vec![S::Required(binding), S::Optional(init)]
            }
            Node::BindingPropertyProperty { name, binding } => {
                vec![S::Required(name), S::Required(binding)]
            }
        }
    }

    /// Child handles in source order.
    pub fn child_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for (_, field) in self.fields() {
            match field {
                Field::Node(id) => out.push(id),
                Field::OptNode(Some(id)) => out.push(id),
                Field::List(ids) => out.extend_from_slice(ids),
                Field::SparseList(ids) => out.extend(ids.iter().flatten().copied()),
                _ => {}
            }
        }
        out
    }
}
