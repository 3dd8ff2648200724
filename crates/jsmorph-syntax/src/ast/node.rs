use super::operators::{
    BinaryOperator, CompoundAssignmentOperator, UnaryOperator, UpdateOperator,
    VariableDeclarationKind,
};
use super::NodeId;

/// One syntactic construct. Children are arena handles; a node never owns
/// another node directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Containers
    Script {
        statements: Vec<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    FunctionBody {
        statements: Vec<NodeId>,
    },
    FormalParameters {
        items: Vec<NodeId>,
        rest: Option<NodeId>,
    },

    // Statements
    VariableDeclarationStatement {
        declaration: NodeId,
    },
    VariableDeclaration {
        kind: VariableDeclarationKind,
        declarators: Vec<NodeId>,
    },
    VariableDeclarator {
        binding: NodeId,
        init: Option<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    ReturnStatement {
        expression: Option<NodeId>,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    BlockStatement {
        block: NodeId,
    },
    EmptyStatement,
    DebuggerStatement,
    ThrowStatement {
        expression: NodeId,
    },
    BreakStatement,
    ContinueStatement,
    FunctionDeclaration {
        name: NodeId,
        params: NodeId,
        body: NodeId,
    },
    ClassDeclaration {
        name: NodeId,
        super_class: Option<NodeId>,
        elements: Vec<NodeId>,
    },

    // Class and object members
    Method {
        is_static: bool,
        name: NodeId,
        params: NodeId,
        body: NodeId,
    },
    DataProperty {
        name: NodeId,
        expression: NodeId,
    },
    ShorthandProperty {
        name: NodeId,
    },
    StaticPropertyName {
        value: String,
    },
    ComputedPropertyName {
        expression: NodeId,
    },

    // Expressions
    FunctionExpression {
        name: Option<NodeId>,
        params: NodeId,
        body: NodeId,
    },
    ArrowExpression {
        params: NodeId,
        body: NodeId,
    },
    ClassExpression {
        name: Option<NodeId>,
        super_class: Option<NodeId>,
        elements: Vec<NodeId>,
    },
    IdentifierExpression {
        name: String,
    },
    LiteralStringExpression {
        value: String,
    },
    LiteralNumericExpression {
        value: f64,
    },
    LiteralBooleanExpression {
        value: bool,
    },
    LiteralNullExpression,
    ThisExpression,
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    SpreadElement {
        expression: NodeId,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    UnaryExpression {
        operator: UnaryOperator,
        operand: NodeId,
    },
    UpdateExpression {
        is_prefix: bool,
        operator: UpdateOperator,
        operand: NodeId,
    },
    AssignmentExpression {
        binding: NodeId,
        expression: NodeId,
    },
    CompoundAssignmentExpression {
        operator: CompoundAssignmentOperator,
        binding: NodeId,
        expression: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    StaticMemberExpression {
        object: NodeId,
        property: String,
    },
    ComputedMemberExpression {
        object: NodeId,
        expression: NodeId,
    },

    // Assignment targets
    AssignmentTargetIdentifier {
        name: String,
    },
    StaticMemberAssignmentTarget {
        object: NodeId,
        property: String,
    },
    ComputedMemberAssignmentTarget {
        object: NodeId,
        expression: NodeId,
    },

    // Bindings
    BindingIdentifier {
        name: String,
    },
    BindingWithDefault {
        binding: NodeId,
        init: NodeId,
    },
    ArrayBinding {
        elements: Vec<Option<NodeId>>,
        rest: Option<NodeId>,
    },
    ObjectBinding {
        properties: Vec<NodeId>,
    },
    BindingPropertyIdentifier {
        binding: NodeId,
        init: Option<NodeId>,
    },
    BindingPropertyProperty {
        name: NodeId,
        binding: NodeId,
    },
}

impl Node {
    /// Statements that may appear in a statement list. A bare
    /// `VariableDeclaration` is not one; it lives inside a
    /// `VariableDeclarationStatement` or a `for` head.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            Node::VariableDeclarationStatement { .. }
                | Node::ExpressionStatement { .. }
                | Node::ReturnStatement { .. }
                | Node::IfStatement { .. }
                | Node::WhileStatement { .. }
                | Node::ForStatement { .. }
                | Node::BlockStatement { .. }
                | Node::EmptyStatement
                | Node::DebuggerStatement
                | Node::ThrowStatement { .. }
                | Node::BreakStatement
                | Node::ContinueStatement
                | Node::FunctionDeclaration { .. }
                | Node::ClassDeclaration { .. }
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::FunctionExpression { .. }
                | Node::ArrowExpression { .. }
                | Node::ClassExpression { .. }
                | Node::IdentifierExpression { .. }
                | Node::LiteralStringExpression { .. }
                | Node::LiteralNumericExpression { .. }
                | Node::LiteralBooleanExpression { .. }
                | Node::LiteralNullExpression
                | Node::ThisExpression
                | Node::ArrayExpression { .. }
                | Node::ObjectExpression { .. }
                | Node::BinaryExpression { .. }
                | Node::UnaryExpression { .. }
                | Node::UpdateExpression { .. }
                | Node::AssignmentExpression { .. }
                | Node::CompoundAssignmentExpression { .. }
                | Node::ConditionalExpression { .. }
                | Node::CallExpression { .. }
                | Node::NewExpression { .. }
                | Node::StaticMemberExpression { .. }
                | Node::ComputedMemberExpression { .. }
        )
    }

    pub fn is_literal_leaf(&self) -> bool {
        matches!(
            self,
            Node::LiteralStringExpression { .. }
                | Node::LiteralNumericExpression { .. }
                | Node::LiteralBooleanExpression { .. }
                | Node::LiteralNullExpression
        )
    }

    pub fn is_member_expression(&self) -> bool {
        matches!(
            self,
            Node::StaticMemberExpression { .. } | Node::ComputedMemberExpression { .. }
        )
    }

    pub fn is_member_assignment(&self) -> bool {
        matches!(
            self,
            Node::StaticMemberAssignmentTarget { .. } | Node::ComputedMemberAssignmentTarget { .. }
        )
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            Node::FunctionDeclaration { .. }
                | Node::FunctionExpression { .. }
                | Node::ArrowExpression { .. }
                | Node::Method { .. }
        )
    }

    pub fn has_statement_list(&self) -> bool {
        matches!(
            self,
            Node::Script { .. } | Node::Block { .. } | Node::FunctionBody { .. }
        )
    }

    pub fn statements(&self) -> Option<&[NodeId]> {
        match self {
            Node::Script { statements }
            | Node::Block { statements }
            | Node::FunctionBody { statements } => Some(statements),
            _ => None,
        }
    }

    /// The name carried by an identifier-like node.
    pub fn identifier_name(&self) -> Option<&str> {
        match self {
            Node::IdentifierExpression { name }
            | Node::AssignmentTargetIdentifier { name }
            | Node::BindingIdentifier { name } => Some(name),
            _ => None,
        }
    }
}
