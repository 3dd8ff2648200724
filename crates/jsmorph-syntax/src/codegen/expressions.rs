use super::{is_identifier_name, CodeGenerator};
use crate::ast::operators::precedence;
use crate::ast::{BinaryOperator, Node, NodeId, UnaryOperator, UpdateOperator};

impl CodeGenerator<'_> {
    /// Prints an expression, parenthesized when it binds looser than
    /// `min_precedence`.
    pub(super) fn generate_expression(&mut self, id: NodeId, min_precedence: u8) {
        let wrap = self.expression_precedence(id) < min_precedence;
        if wrap {
            self.write("(");
        }
        self.generate_node(id);
        if wrap {
            self.write(")");
        }
    }

    fn expression_precedence(&self, id: NodeId) -> u8 {
        match &self.ast[id] {
            Node::BinaryExpression { operator, .. } => operator.precedence(),
            Node::AssignmentExpression { .. }
            | Node::CompoundAssignmentExpression { .. }
            | Node::ArrowExpression { .. } => precedence::ASSIGNMENT,
            Node::ConditionalExpression { .. } => precedence::CONDITIONAL,
            Node::UnaryExpression { .. } => precedence::UNARY,
            Node::UpdateExpression { is_prefix: true, .. } => precedence::UNARY,
            Node::UpdateExpression { .. } => precedence::POSTFIX,
            Node::LiteralNumericExpression { value } if value.is_sign_negative() => {
                precedence::UNARY
            }
            Node::CallExpression { .. }
            | Node::NewExpression { .. }
            | Node::StaticMemberExpression { .. }
            | Node::ComputedMemberExpression { .. }
            | Node::StaticMemberAssignmentTarget { .. }
            | Node::ComputedMemberAssignmentTarget { .. } => precedence::CALL,
            _ => precedence::PRIMARY,
        }
    }

    /// The node printed first when `id` is printed, following left operands
    /// down the tree.
    fn leftmost(&self, id: NodeId) -> NodeId {
        match &self.ast[id] {
            Node::BinaryExpression { left, .. } => self.leftmost(*left),
            Node::AssignmentExpression { binding, .. }
            | Node::CompoundAssignmentExpression { binding, .. } => self.leftmost(*binding),
            Node::ConditionalExpression { test, .. } => self.leftmost(*test),
            Node::CallExpression { callee, .. } => self.leftmost(*callee),
            Node::StaticMemberExpression { object, .. }
            | Node::ComputedMemberExpression { object, .. }
            | Node::StaticMemberAssignmentTarget { object, .. }
            | Node::ComputedMemberAssignmentTarget { object, .. } => self.leftmost(*object),
            Node::UpdateExpression {
                is_prefix: false,
                operand,
                ..
            } => self.leftmost(*operand),
            _ => id,
        }
    }

    /// Expression statements may not start with `function`, `class` or `{`.
    pub(super) fn starts_ambiguously(&self, id: NodeId) -> bool {
        matches!(
            self.ast[self.leftmost(id)],
            Node::FunctionExpression { .. }
                | Node::ClassExpression { .. }
                | Node::ObjectExpression { .. }
        )
    }

    fn contains_call(&self, id: NodeId) -> bool {
        match &self.ast[id] {
            Node::CallExpression { .. } => true,
            Node::StaticMemberExpression { object, .. }
            | Node::ComputedMemberExpression { object, .. } => self.contains_call(*object),
            _ => false,
        }
    }

    fn generate_list(&mut self, ids: &[NodeId]) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_expression(*id, precedence::ASSIGNMENT);
        }
    }

    /// Holes print as empty slots. A trailing hole needs an extra comma
    /// unless something else follows the list.
    fn generate_sparse_list(&mut self, ids: &[Option<NodeId>], closed: bool) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let Some(id) = id {
                self.generate_expression(*id, precedence::ASSIGNMENT);
            }
        }
        if closed && ids.last().is_some_and(Option::is_none) {
            self.write(",");
        }
    }

    fn generate_object_member(&mut self, object: NodeId) {
        let numeric = matches!(self.ast[object], Node::LiteralNumericExpression { .. });
        if numeric {
            self.write("(");
            self.generate_node(object);
            self.write(")");
        } else {
            self.generate_expression(object, precedence::CALL);
        }
    }

    fn generate_static_property(&mut self, property: &str) {
        if is_identifier_name(property) {
            self.write(".");
            self.write(property);
        } else {
            self.write("[");
            self.write(&quote(property));
            self.write("]");
        }
    }

    /// Prints any node in expression position without outer parentheses.
    pub(super) fn generate_node(&mut self, id: NodeId) {
        let ast = self.ast;
        match &ast[id] {
            Node::IdentifierExpression { name }
            | Node::AssignmentTargetIdentifier { name }
            | Node::BindingIdentifier { name } => self.write(name),
            Node::LiteralStringExpression { value } => self.write(&quote(value)),
            Node::LiteralNumericExpression { value } => self.write(&format_number(*value)),
            Node::LiteralBooleanExpression { value } => {
                self.write(if *value { "true" } else { "false" })
            }
            Node::LiteralNullExpression => self.write("null"),
            Node::ThisExpression => self.write("this"),
            Node::ArrayExpression { elements } => {
                self.write("[");
                self.generate_sparse_list(elements, true);
                self.write("]");
            }
            Node::ObjectExpression { properties } => {
                if properties.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{ ");
                    self.generate_list(properties);
                    self.write(" }");
                }
            }
            Node::SpreadElement { expression } => {
                self.write("...");
                self.generate_expression(*expression, precedence::ASSIGNMENT);
            }
            Node::DataProperty { name, expression } => {
                self.generate_node(*name);
                self.write(": ");
                self.generate_expression(*expression, precedence::ASSIGNMENT);
            }
            Node::ShorthandProperty { name } => self.generate_node(*name),
            Node::StaticPropertyName { value } => {
                if is_identifier_name(value) || is_canonical_number(value) {
                    self.write(value);
                } else {
                    self.write(&quote(value));
                }
            }
            Node::ComputedPropertyName { expression } => {
                self.write("[");
                self.generate_expression(*expression, precedence::ASSIGNMENT);
                self.write("]");
            }
            Node::Method {
                is_static,
                name,
                params,
                body,
            } => {
                if *is_static {
                    self.write("static ");
                }
                self.generate_node(*name);
                self.generate_node(*params);
                self.write(" ");
                self.generate_node(*body);
            }
            Node::FunctionExpression { name, params, body } => {
                self.write("function ");
                if let Some(name) = name {
                    self.generate_node(*name);
                }
                self.generate_node(*params);
                self.write(" ");
                self.generate_node(*body);
            }
            Node::ArrowExpression { params, body } => {
                self.generate_node(*params);
                self.write(" => ");
                if matches!(ast[*body], Node::FunctionBody { .. }) {
                    self.generate_node(*body);
                } else if matches!(ast[self.leftmost(*body)], Node::ObjectExpression { .. }) {
                    self.write("(");
                    self.generate_expression(*body, precedence::SEQUENCE);
                    self.write(")");
                } else {
                    self.generate_expression(*body, precedence::ASSIGNMENT);
                }
            }
            Node::ClassExpression {
                name,
                super_class,
                elements,
            } => self.generate_class(*name, *super_class, elements),
            Node::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let prec = operator.precedence();
                self.generate_expression(*left, prec);
                if *operator == BinaryOperator::Comma {
                    self.write(", ");
                } else {
                    self.write(" ");
                    self.write(operator.as_str());
                    self.write(" ");
                }
                self.generate_expression(*right, prec + 1);
            }
            Node::UnaryExpression { operator, operand } => {
                self.write(operator.as_str());
                if operator.is_keyword() || self.needs_sign_space(*operator, *operand) {
                    self.write(" ");
                }
                self.generate_expression(*operand, precedence::UNARY);
            }
            Node::UpdateExpression {
                is_prefix,
                operator,
                operand,
            } => {
                if *is_prefix {
                    self.write(operator.as_str());
                    self.generate_expression(*operand, precedence::UNARY);
                } else {
                    self.generate_expression(*operand, precedence::CALL);
                    self.write(operator.as_str());
                }
            }
            Node::AssignmentExpression {
                binding,
                expression,
            } => {
                self.generate_expression(*binding, precedence::CALL);
                self.write(" = ");
                self.generate_expression(*expression, precedence::ASSIGNMENT);
            }
            Node::CompoundAssignmentExpression {
                operator,
                binding,
                expression,
            } => {
                self.generate_expression(*binding, precedence::CALL);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.generate_expression(*expression, precedence::ASSIGNMENT);
            }
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                self.generate_expression(*test, precedence::LOGICAL_OR);
                self.write(" ? ");
                self.generate_expression(*consequent, precedence::ASSIGNMENT);
                self.write(" : ");
                self.generate_expression(*alternate, precedence::ASSIGNMENT);
            }
            Node::CallExpression { callee, arguments } => {
                self.generate_expression(*callee, precedence::CALL);
                self.write("(");
                self.generate_list(arguments);
                self.write(")");
            }
            Node::NewExpression { callee, arguments } => {
                self.write("new ");
                if self.contains_call(*callee) {
                    self.write("(");
                    self.generate_node(*callee);
                    self.write(")");
                } else {
                    self.generate_expression(*callee, precedence::CALL);
                }
                self.write("(");
                self.generate_list(arguments);
                self.write(")");
            }
            Node::StaticMemberExpression { object, property }
            | Node::StaticMemberAssignmentTarget { object, property } => {
                self.generate_object_member(*object);
                self.generate_static_property(property);
            }
            Node::ComputedMemberExpression { object, expression }
            | Node::ComputedMemberAssignmentTarget { object, expression } => {
                self.generate_object_member(*object);
                self.write("[");
                self.generate_expression(*expression, precedence::SEQUENCE);
                self.write("]");
            }
            Node::BindingWithDefault { binding, init }
            | Node::BindingPropertyIdentifier {
                binding,
                init: Some(init),
            } => {
                self.generate_node(*binding);
                self.write(" = ");
                self.generate_expression(*init, precedence::ASSIGNMENT);
            }
            Node::BindingPropertyIdentifier {
                binding,
                init: None,
            } => self.generate_node(*binding),
            Node::BindingPropertyProperty { name, binding } => {
                self.generate_node(*name);
                self.write(": ");
                self.generate_node(*binding);
            }
            Node::ArrayBinding { elements, rest } => {
                self.write("[");
                self.generate_sparse_list(elements, rest.is_none());
                if let Some(rest) = rest {
                    if !elements.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                    self.generate_node(*rest);
                }
                self.write("]");
            }
            Node::ObjectBinding { properties } => {
                if properties.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{ ");
                    self.generate_list(properties);
                    self.write(" }");
                }
            }
            Node::FormalParameters { items, rest } => {
                self.write("(");
                self.generate_list(items);
                if let Some(rest) = rest {
                    if !items.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                    self.generate_node(*rest);
                }
                self.write(")");
            }
            Node::VariableDeclarator { binding, init } => {
                self.generate_node(*binding);
                if let Some(init) = init {
                    self.write(" = ");
                    self.generate_expression(*init, precedence::ASSIGNMENT);
                }
            }
            Node::VariableDeclaration { .. } => self.generate_variable_declaration(id),
            Node::Script { .. } | Node::Block { .. } | Node::FunctionBody { .. } => {
                self.generate_block(id)
            }
            _ => {
                // Statement in expression position: print it inline.
                let start = self.output.len();
                self.generate_statement(id);
                let trimmed = self.output[start..].trim().to_string();
                self.output.truncate(start);
                self.write(&trimmed);
            }
        }
    }

    fn needs_sign_space(&self, operator: UnaryOperator, operand: NodeId) -> bool {
        match (operator, &self.ast[operand]) {
            (UnaryOperator::Minus, Node::UnaryExpression { operator: inner, .. }) => {
                *inner == UnaryOperator::Minus
            }
            (UnaryOperator::Plus, Node::UnaryExpression { operator: inner, .. }) => {
                *inner == UnaryOperator::Plus
            }
            (
                UnaryOperator::Minus,
                Node::UpdateExpression {
                    is_prefix: true,
                    operator: UpdateOperator::Decrement,
                    ..
                },
            ) => true,
            (
                UnaryOperator::Plus,
                Node::UpdateExpression {
                    is_prefix: true,
                    operator: UpdateOperator::Increment,
                    ..
                },
            ) => true,
            (UnaryOperator::Minus, Node::LiteralNumericExpression { value }) => {
                value.is_sign_negative()
            }
            _ => false,
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{}", value)
    }
}

fn is_canonical_number(value: &str) -> bool {
    value
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && !n.is_sign_negative() && format_number(n) == value)
}

/// Double-quoted string literal with escapes.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
