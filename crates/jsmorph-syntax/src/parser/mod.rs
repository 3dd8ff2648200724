//! Recursive-descent parser for the supported ECMAScript subset.
//!
//! Produces nodes directly into a caller-supplied [`Ast`] so that parsed
//! fragments can be spliced into an existing tree.

pub mod lexer;

use thiserror::Error;
use tracing::trace;

use crate::ast::{
    Ast, BinaryOperator, CompoundAssignmentOperator, Node, NodeId, UnaryOperator, UpdateOperator,
    VariableDeclarationKind,
};
use lexer::{tokenize, Tok, Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        offset: usize,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("invalid token at offset {offset}")]
    InvalidToken { offset: usize },

    #[error("invalid assignment target at offset {offset}")]
    InvalidAssignmentTarget { offset: usize },
}

type PResult<T> = Result<T, ParseError>;

/// Parses `source` as a script into `ast`, returning the `Script` node.
pub fn parse_script(ast: &mut Ast, source: &str) -> PResult<NodeId> {
    let mut parser = Parser::new(ast, source)?;
    let root = parser.parse_script()?;
    trace!(tokens = parser.tokens.len(), "parsed script");
    Ok(root)
}

pub fn parse_script_new(source: &str) -> PResult<(Ast, NodeId)> {
    let mut ast = Ast::new();
    let root = parse_script(&mut ast, source)?;
    Ok((ast, root))
}

/// Parses `source` as a single expression (commas included).
pub fn parse_expression(ast: &mut Ast, source: &str) -> PResult<NodeId> {
    let mut parser = Parser::new(ast, source)?;
    let expr = parser.parse_expression()?;
    if !parser.at_end() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    ast: &'a mut Ast,
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(ast: &'a mut Ast, source: &'a str) -> PResult<Self> {
        Ok(Self {
            ast,
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    // ----- token helpers -----

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|t| &t.tok)
    }

    fn at(&self, tok: &Tok) -> bool {
        self.peek() == Some(tok)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn newline_before(&self) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| t.newline_before)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.start)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|t| t.tok.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.at(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok, expected: &str) -> PResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::Unexpected {
                found: self.source[token.start..token.end].to_string(),
                expected: expected.to_string(),
                offset: token.start,
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn identifier(&mut self, expected: &str) -> PResult<String> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Identifier or keyword, as allowed after `.` and in property keys.
    fn identifier_name(&mut self) -> Option<String> {
        let name = match self.peek()? {
            Tok::Ident(name) => name.clone(),
            tok => tok.keyword_text()?.to_string(),
        };
        self.pos += 1;
        Some(name)
    }

    /// Automatic semicolon insertion: a statement ends at `;`, before `}`,
    /// at end of input, or at a line break.
    fn consume_semicolon(&mut self) -> PResult<()> {
        if self.eat(&Tok::Semicolon)
            || self.at(&Tok::RBrace)
            || self.at_end()
            || self.newline_before()
        {
            Ok(())
        } else {
            Err(self.unexpected("';'"))
        }
    }

    // ----- statements -----

    fn parse_script(&mut self) -> PResult<NodeId> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(self.ast.alloc(Node::Script { statements }))
    }

    fn parse_statement_list(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(&Tok::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.eat(&Tok::RBrace) {
            if self.at_end() {
                return Err(self.unexpected("'}'"));
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> PResult<NodeId> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected("statement"));
        };
        match tok {
            Tok::LBrace => {
                let statements = self.parse_statement_list()?;
                let block = self.ast.alloc(Node::Block { statements });
                Ok(self.ast.alloc(Node::BlockStatement { block }))
            }
            Tok::Var | Tok::Let | Tok::Const => {
                let declaration = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(self
                    .ast
                    .alloc(Node::VariableDeclarationStatement { declaration }))
            }
            Tok::Function => self.parse_function_declaration(),
            Tok::Class => {
                self.pos += 1;
                let name = self.identifier("class name")?;
                let name = self.ast.alloc(Node::BindingIdentifier { name });
                let (super_class, elements) = self.parse_class_tail()?;
                Ok(self.ast.alloc(Node::ClassDeclaration {
                    name,
                    super_class,
                    elements,
                }))
            }
            Tok::If => {
                self.pos += 1;
                self.expect(&Tok::LParen, "'('")?;
                let test = self.parse_expression()?;
                self.expect(&Tok::RParen, "')'")?;
                let consequent = self.parse_statement()?;
                let alternate = if self.eat(&Tok::Else) {
                    Some(self.parse_statement()?)
                } else {
                    None
                };
                Ok(self.ast.alloc(Node::IfStatement {
                    test,
                    consequent,
                    alternate,
                }))
            }
            Tok::While => {
                self.pos += 1;
                self.expect(&Tok::LParen, "'('")?;
                let test = self.parse_expression()?;
                self.expect(&Tok::RParen, "')'")?;
                let body = self.parse_statement()?;
                Ok(self.ast.alloc(Node::WhileStatement { test, body }))
            }
            Tok::For => self.parse_for_statement(),
            Tok::Return => {
                self.pos += 1;
                let expression = if self.at(&Tok::Semicolon)
                    || self.at(&Tok::RBrace)
                    || self.at_end()
                    || self.newline_before()
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                Ok(self.ast.alloc(Node::ReturnStatement { expression }))
            }
            Tok::Throw => {
                self.pos += 1;
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(self.ast.alloc(Node::ThrowStatement { expression }))
            }
            Tok::Break => {
                self.pos += 1;
                self.consume_semicolon()?;
                Ok(self.ast.alloc(Node::BreakStatement))
            }
            Tok::Continue => {
                self.pos += 1;
                self.consume_semicolon()?;
                Ok(self.ast.alloc(Node::ContinueStatement))
            }
            Tok::Debugger => {
                self.pos += 1;
                self.consume_semicolon()?;
                Ok(self.ast.alloc(Node::DebuggerStatement))
            }
            Tok::Semicolon => {
                self.pos += 1;
                Ok(self.ast.alloc(Node::EmptyStatement))
            }
            _ => {
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(self.ast.alloc(Node::ExpressionStatement { expression }))
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> PResult<NodeId> {
        let kind = match self.advance() {
            Some(Tok::Var) => VariableDeclarationKind::Var,
            Some(Tok::Let) => VariableDeclarationKind::Let,
            Some(Tok::Const) => VariableDeclarationKind::Const,
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.unexpected("variable declaration"));
            }
        };
        let mut declarators = Vec::new();
        loop {
            let binding = self.parse_binding_target()?;
            let init = if self.eat(&Tok::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(self.ast.alloc(Node::VariableDeclarator { binding, init }));
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        Ok(self
            .ast
            .alloc(Node::VariableDeclaration { kind, declarators }))
    }

    fn parse_for_statement(&mut self) -> PResult<NodeId> {
        self.pos += 1;
        self.expect(&Tok::LParen, "'('")?;
        let init = match self.peek() {
            Some(Tok::Semicolon) => None,
            Some(Tok::Var | Tok::Let | Tok::Const) => Some(self.parse_variable_declaration()?),
            _ => Some(self.parse_expression()?),
        };
        self.expect(&Tok::Semicolon, "';'")?;
        let test = if self.at(&Tok::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&Tok::Semicolon, "';'")?;
        let update = if self.at(&Tok::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&Tok::RParen, "')'")?;
        let body = self.parse_statement()?;
        Ok(self.ast.alloc(Node::ForStatement {
            init,
            test,
            update,
            body,
        }))
    }

    fn parse_function_declaration(&mut self) -> PResult<NodeId> {
        self.pos += 1;
        let name = self.identifier("function name")?;
        let name = self.ast.alloc(Node::BindingIdentifier { name });
        let params = self.parse_formal_parameters()?;
        let body = self.parse_function_body()?;
        Ok(self
            .ast
            .alloc(Node::FunctionDeclaration { name, params, body }))
    }

    fn parse_function_body(&mut self) -> PResult<NodeId> {
        let statements = self.parse_statement_list()?;
        Ok(self.ast.alloc(Node::FunctionBody { statements }))
    }

    fn parse_formal_parameters(&mut self) -> PResult<NodeId> {
        self.expect(&Tok::LParen, "'('")?;
        let mut items = Vec::new();
        let mut rest = None;
        while !self.eat(&Tok::RParen) {
            if self.eat(&Tok::Ellipsis) {
                rest = Some(self.parse_binding_target()?);
                self.expect(&Tok::RParen, "')' after rest parameter")?;
                break;
            }
            items.push(self.parse_binding_element()?);
            if !self.at(&Tok::RParen) {
                self.expect(&Tok::Comma, "',' or ')'")?;
            }
        }
        Ok(self.ast.alloc(Node::FormalParameters { items, rest }))
    }

    fn parse_class_tail(&mut self) -> PResult<(Option<NodeId>, Vec<NodeId>)> {
        let super_class = if self.eat(&Tok::Extends) {
            Some(self.parse_lhs_expression()?)
        } else {
            None
        };
        self.expect(&Tok::LBrace, "'{'")?;
        let mut elements = Vec::new();
        while !self.eat(&Tok::RBrace) {
            if self.eat(&Tok::Semicolon) {
                continue;
            }
            let is_static = matches!(self.peek(), Some(Tok::Ident(s)) if s == "static")
                && self.peek_at(1) != Some(&Tok::LParen);
            if is_static {
                self.pos += 1;
            }
            let name = self.parse_property_name()?.0;
            let params = self.parse_formal_parameters()?;
            let body = self.parse_function_body()?;
            elements.push(self.ast.alloc(Node::Method {
                is_static,
                name,
                params,
                body,
            }));
        }
        Ok((super_class, elements))
    }

    // ----- bindings -----

    fn parse_binding_target(&mut self) -> PResult<NodeId> {
        match self.peek() {
            Some(Tok::LBracket) => self.parse_array_binding(),
            Some(Tok::LBrace) => self.parse_object_binding(),
            _ => {
                let name = self.identifier("binding identifier")?;
                Ok(self.ast.alloc(Node::BindingIdentifier { name }))
            }
        }
    }

    fn parse_binding_element(&mut self) -> PResult<NodeId> {
        let binding = self.parse_binding_target()?;
        if self.eat(&Tok::Assign) {
            let init = self.parse_assignment()?;
            Ok(self.ast.alloc(Node::BindingWithDefault { binding, init }))
        } else {
            Ok(binding)
        }
    }

    fn parse_array_binding(&mut self) -> PResult<NodeId> {
        self.expect(&Tok::LBracket, "'['")?;
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.eat(&Tok::RBracket) {
            if self.eat(&Tok::Comma) {
                elements.push(None);
                continue;
            }
            if self.eat(&Tok::Ellipsis) {
                rest = Some(self.parse_binding_target()?);
                self.expect(&Tok::RBracket, "']' after rest element")?;
                break;
            }
            elements.push(Some(self.parse_binding_element()?));
            if !self.at(&Tok::RBracket) {
                self.expect(&Tok::Comma, "',' or ']'")?;
            }
        }
        Ok(self.ast.alloc(Node::ArrayBinding { elements, rest }))
    }

    fn parse_object_binding(&mut self) -> PResult<NodeId> {
        self.expect(&Tok::LBrace, "'{'")?;
        let mut properties = Vec::new();
        while !self.eat(&Tok::RBrace) {
            let shorthand = matches!(self.peek(), Some(Tok::Ident(_)))
                && self.peek_at(1) != Some(&Tok::Colon);
            let property = if shorthand {
                let name = self.identifier("binding identifier")?;
                let binding = self.ast.alloc(Node::BindingIdentifier { name });
                let init = if self.eat(&Tok::Assign) {
                    Some(self.parse_assignment()?)
                } else {
                    None
                };
                Node::BindingPropertyIdentifier { binding, init }
            } else {
                let name = self.parse_property_name()?.0;
                self.expect(&Tok::Colon, "':'")?;
                let binding = self.parse_binding_element()?;
                Node::BindingPropertyProperty { name, binding }
            };
            properties.push(self.ast.alloc(property));
            if !self.at(&Tok::RBrace) {
                self.expect(&Tok::Comma, "',' or '}'")?;
            }
        }
        Ok(self.ast.alloc(Node::ObjectBinding { properties }))
    }

    // ----- expressions -----

    fn parse_expression(&mut self) -> PResult<NodeId> {
        let mut left = self.parse_assignment()?;
        while self.eat(&Tok::Comma) {
            let right = self.parse_assignment()?;
            left = self.ast.alloc(Node::BinaryExpression {
                operator: BinaryOperator::Comma,
                left,
                right,
            });
        }
        Ok(left)
    }

    fn parse_assignment(&mut self) -> PResult<NodeId> {
        if self.at_arrow() {
            return self.parse_arrow();
        }

        let start = self.offset();
        let left = self.parse_conditional()?;

        if self.eat(&Tok::Assign) {
            let binding = self.to_assignment_target(left, start)?;
            let expression = self.parse_assignment()?;
            return Ok(self.ast.alloc(Node::AssignmentExpression {
                binding,
                expression,
            }));
        }

        if let Some(operator) = self.peek().and_then(compound_operator) {
            self.pos += 1;
            let binding = self.to_assignment_target(left, start)?;
            let expression = self.parse_assignment()?;
            return Ok(self.ast.alloc(Node::CompoundAssignmentExpression {
                operator,
                binding,
                expression,
            }));
        }

        Ok(left)
    }

    /// Rewrites an already parsed expression into the matching assignment
    /// target, in place.
    fn to_assignment_target(&mut self, id: NodeId, offset: usize) -> PResult<NodeId> {
        let target = match &self.ast[id] {
            Node::IdentifierExpression { name } => Node::AssignmentTargetIdentifier {
                name: name.clone(),
            },
            Node::StaticMemberExpression { object, property } => {
                Node::StaticMemberAssignmentTarget {
                    object: *object,
                    property: property.clone(),
                }
            }
            Node::ComputedMemberExpression { object, expression } => {
                Node::ComputedMemberAssignmentTarget {
                    object: *object,
                    expression: *expression,
                }
            }
            _ => return Err(ParseError::InvalidAssignmentTarget { offset }),
        };
        self.ast[id] = target;
        Ok(id)
    }

    fn at_arrow(&self) -> bool {
        match self.peek() {
            Some(Tok::Ident(_)) => self.arrow_follows(self.pos + 1),
            Some(Tok::LParen) => {
                let mut depth = 0usize;
                for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
                    match token.tok {
                        Tok::LParen | Tok::LBracket | Tok::LBrace => depth += 1,
                        Tok::RParen | Tok::RBracket | Tok::RBrace => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return self.arrow_follows(i + 1);
                            }
                        }
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn arrow_follows(&self, index: usize) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|t| t.tok == Tok::Arrow && !t.newline_before)
    }

    fn parse_arrow(&mut self) -> PResult<NodeId> {
        let params = if self.at(&Tok::LParen) {
            self.parse_formal_parameters()?
        } else {
            let name = self.identifier("parameter")?;
            let binding = self.ast.alloc(Node::BindingIdentifier { name });
            self.ast.alloc(Node::FormalParameters {
                items: vec![binding],
                rest: None,
            })
        };
        self.expect(&Tok::Arrow, "'=>'")?;
        let body = if self.at(&Tok::LBrace) {
            self.parse_function_body()?
        } else {
            self.parse_assignment()?
        };
        Ok(self.ast.alloc(Node::ArrowExpression { params, body }))
    }

    fn parse_conditional(&mut self) -> PResult<NodeId> {
        let test = self.parse_binary(BinaryOperator::LogicalOr.precedence())?;
        if !self.eat(&Tok::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(&Tok::Colon, "':'")?;
        let alternate = self.parse_assignment()?;
        Ok(self.ast.alloc(Node::ConditionalExpression {
            test,
            consequent,
            alternate,
        }))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<NodeId> {
        let mut left = self.parse_unary()?;
        while let Some(operator) = self.peek().and_then(binary_operator) {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let right = self.parse_binary(precedence + 1)?;
            left = self.ast.alloc(Node::BinaryExpression {
                operator,
                left,
                right,
            });
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        if let Some(operator) = self.peek().and_then(unary_operator) {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(self
                .ast
                .alloc(Node::UnaryExpression { operator, operand }));
        }

        if let Some(operator) = self.peek().and_then(update_operator) {
            self.pos += 1;
            let start = self.offset();
            let operand = self.parse_unary()?;
            let operand = self.to_assignment_target(operand, start)?;
            return Ok(self.ast.alloc(Node::UpdateExpression {
                is_prefix: true,
                operator,
                operand,
            }));
        }

        let start = self.offset();
        let expr = self.parse_lhs_expression()?;
        if !self.newline_before() {
            if let Some(operator) = self.peek().and_then(update_operator) {
                self.pos += 1;
                let operand = self.to_assignment_target(expr, start)?;
                return Ok(self.ast.alloc(Node::UpdateExpression {
                    is_prefix: false,
                    operator,
                    operand,
                }));
            }
        }
        Ok(expr)
    }

    fn parse_lhs_expression(&mut self) -> PResult<NodeId> {
        let mut expr = if self.at(&Tok::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            if let Some(member) = self.parse_member_suffix(expr)? {
                expr = member;
            } else if self.at(&Tok::LParen) {
                let arguments = self.parse_arguments()?;
                expr = self.ast.alloc(Node::CallExpression {
                    callee: expr,
                    arguments,
                });
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_new(&mut self) -> PResult<NodeId> {
        self.expect(&Tok::New, "'new'")?;
        let mut callee = if self.at(&Tok::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        while let Some(member) = self.parse_member_suffix(callee)? {
            callee = member;
        }
        let arguments = if self.at(&Tok::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.ast.alloc(Node::NewExpression { callee, arguments }))
    }

    fn parse_member_suffix(&mut self, object: NodeId) -> PResult<Option<NodeId>> {
        if self.eat(&Tok::Dot) {
            let Some(property) = self.identifier_name() else {
                return Err(self.unexpected("property name"));
            };
            return Ok(Some(
                self.ast
                    .alloc(Node::StaticMemberExpression { object, property }),
            ));
        }
        if self.eat(&Tok::LBracket) {
            let expression = self.parse_expression()?;
            self.expect(&Tok::RBracket, "']'")?;
            return Ok(Some(
                self.ast
                    .alloc(Node::ComputedMemberExpression { object, expression }),
            ));
        }
        Ok(None)
    }

    fn parse_arguments(&mut self) -> PResult<Vec<NodeId>> {
        self.expect(&Tok::LParen, "'('")?;
        let mut arguments = Vec::new();
        while !self.eat(&Tok::RParen) {
            arguments.push(self.parse_spread_or_assignment()?);
            if !self.at(&Tok::RParen) {
                self.expect(&Tok::Comma, "',' or ')'")?;
            }
        }
        Ok(arguments)
    }

    fn parse_spread_or_assignment(&mut self) -> PResult<NodeId> {
        if self.eat(&Tok::Ellipsis) {
            let expression = self.parse_assignment()?;
            Ok(self.ast.alloc(Node::SpreadElement { expression }))
        } else {
            self.parse_assignment()
        }
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected("expression"));
        };
        let node = match tok {
            Tok::Ident(name) => {
                self.pos += 1;
                Node::IdentifierExpression { name }
            }
            Tok::Number(value) => {
                self.pos += 1;
                Node::LiteralNumericExpression { value }
            }
            Tok::String(value) => {
                self.pos += 1;
                Node::LiteralStringExpression { value }
            }
            Tok::True | Tok::False => {
                self.pos += 1;
                Node::LiteralBooleanExpression {
                    value: tok == Tok::True,
                }
            }
            Tok::Null => {
                self.pos += 1;
                Node::LiteralNullExpression
            }
            Tok::This => {
                self.pos += 1;
                Node::ThisExpression
            }
            Tok::LParen => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.expect(&Tok::RParen, "')'")?;
                return Ok(expr);
            }
            Tok::LBracket => return self.parse_array_literal(),
            Tok::LBrace => return self.parse_object_literal(),
            Tok::Function => {
                self.pos += 1;
                let name = match self.peek() {
                    Some(Tok::Ident(_)) => {
                        let name = self.identifier("function name")?;
                        Some(self.ast.alloc(Node::BindingIdentifier { name }))
                    }
                    _ => None,
                };
                let params = self.parse_formal_parameters()?;
                let body = self.parse_function_body()?;
                Node::FunctionExpression { name, params, body }
            }
            Tok::Class => {
                self.pos += 1;
                let name = match self.peek() {
                    Some(Tok::Ident(_)) => {
                        let name = self.identifier("class name")?;
                        Some(self.ast.alloc(Node::BindingIdentifier { name }))
                    }
                    _ => None,
                };
                let (super_class, elements) = self.parse_class_tail()?;
                Node::ClassExpression {
                    name,
                    super_class,
                    elements,
                }
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(self.ast.alloc(node))
    }

    fn parse_array_literal(&mut self) -> PResult<NodeId> {
        self.expect(&Tok::LBracket, "'['")?;
        let mut elements = Vec::new();
        while !self.eat(&Tok::RBracket) {
            if self.eat(&Tok::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_spread_or_assignment()?));
            if !self.at(&Tok::RBracket) {
                self.expect(&Tok::Comma, "',' or ']'")?;
            }
        }
        Ok(self.ast.alloc(Node::ArrayExpression { elements }))
    }

    fn parse_object_literal(&mut self) -> PResult<NodeId> {
        self.expect(&Tok::LBrace, "'{'")?;
        let mut properties = Vec::new();
        while !self.eat(&Tok::RBrace) {
            let (name, shorthand) = self.parse_property_name()?;
            let property = if self.eat(&Tok::Colon) {
                let expression = self.parse_assignment()?;
                Node::DataProperty { name, expression }
            } else if self.at(&Tok::LParen) {
                let params = self.parse_formal_parameters()?;
                let body = self.parse_function_body()?;
                Node::Method {
                    is_static: false,
                    name,
                    params,
                    body,
                }
            } else if let Some(ident) = shorthand {
                let name = self.ast.alloc(Node::IdentifierExpression { name: ident });
                Node::ShorthandProperty { name }
            } else {
                return Err(self.unexpected("':'"));
            };
            properties.push(self.ast.alloc(property));
            if !self.at(&Tok::RBrace) {
                self.expect(&Tok::Comma, "',' or '}'")?;
            }
        }
        Ok(self.ast.alloc(Node::ObjectExpression { properties }))
    }

    /// Parses a property key. The second value carries the identifier when
    /// the key could also serve as a shorthand property.
    fn parse_property_name(&mut self) -> PResult<(NodeId, Option<String>)> {
        if self.eat(&Tok::LBracket) {
            let expression = self.parse_assignment()?;
            self.expect(&Tok::RBracket, "']'")?;
            return Ok((
                self.ast.alloc(Node::ComputedPropertyName { expression }),
                None,
            ));
        }
        let (value, shorthand) = match self.peek().cloned() {
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                (name.clone(), Some(name))
            }
            Some(Tok::String(value)) => {
                self.pos += 1;
                (value, None)
            }
            Some(Tok::Number(value)) => {
                self.pos += 1;
                (value.to_string(), None)
            }
            _ => match self.identifier_name() {
                Some(keyword) => (keyword, None),
                None => return Err(self.unexpected("property name")),
            },
        };
        Ok((self.ast.alloc(Node::StaticPropertyName { value }), shorthand))
    }
}

fn binary_operator(tok: &Tok) -> Option<BinaryOperator> {
    let op = match tok {
        Tok::PipePipe => BinaryOperator::LogicalOr,
        Tok::AmpAmp => BinaryOperator::LogicalAnd,
        Tok::Pipe => BinaryOperator::BitOr,
        Tok::Caret => BinaryOperator::BitXor,
        Tok::Amp => BinaryOperator::BitAnd,
        Tok::EqEq => BinaryOperator::Equal,
        Tok::NotEq => BinaryOperator::NotEqual,
        Tok::EqEqEq => BinaryOperator::StrictEqual,
        Tok::NotEqEq => BinaryOperator::StrictNotEqual,
        Tok::Lt => BinaryOperator::LessThan,
        Tok::LtEq => BinaryOperator::LessThanEqual,
        Tok::Gt => BinaryOperator::GreaterThan,
        Tok::GtEq => BinaryOperator::GreaterThanEqual,
        Tok::In => BinaryOperator::In,
        Tok::Instanceof => BinaryOperator::InstanceOf,
        Tok::Shl => BinaryOperator::Shl,
        Tok::Shr => BinaryOperator::Shr,
        Tok::UShr => BinaryOperator::UShr,
        Tok::Plus => BinaryOperator::Add,
        Tok::Minus => BinaryOperator::Sub,
        Tok::Star => BinaryOperator::Mul,
        Tok::Slash => BinaryOperator::Div,
        Tok::Percent => BinaryOperator::Rem,
        _ => return None,
    };
    Some(op)
}

fn unary_operator(tok: &Tok) -> Option<UnaryOperator> {
    let op = match tok {
        Tok::Minus => UnaryOperator::Minus,
        Tok::Plus => UnaryOperator::Plus,
        Tok::Bang => UnaryOperator::Not,
        Tok::Tilde => UnaryOperator::BitNot,
        Tok::Typeof => UnaryOperator::Typeof,
        Tok::Void => UnaryOperator::Void,
        Tok::Delete => UnaryOperator::Delete,
        _ => return None,
    };
    Some(op)
}

fn update_operator(tok: &Tok) -> Option<UpdateOperator> {
    match tok {
        Tok::PlusPlus => Some(UpdateOperator::Increment),
        Tok::MinusMinus => Some(UpdateOperator::Decrement),
        _ => None,
    }
}

fn compound_operator(tok: &Tok) -> Option<CompoundAssignmentOperator> {
    let op = match tok {
        Tok::PlusAssign => CompoundAssignmentOperator::Add,
        Tok::MinusAssign => CompoundAssignmentOperator::Sub,
        Tok::StarAssign => CompoundAssignmentOperator::Mul,
        Tok::SlashAssign => CompoundAssignmentOperator::Div,
        Tok::PercentAssign => CompoundAssignmentOperator::Rem,
        Tok::ShlAssign => CompoundAssignmentOperator::Shl,
        Tok::ShrAssign => CompoundAssignmentOperator::Shr,
        Tok::UShrAssign => CompoundAssignmentOperator::UShr,
        Tok::AmpAssign => CompoundAssignmentOperator::BitAnd,
        Tok::PipeAssign => CompoundAssignmentOperator::BitOr,
        Tok::CaretAssign => CompoundAssignmentOperator::BitXor,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Ast, NodeId) {
        parse_script_new(source).unwrap()
    }

    fn first_expression(ast: &Ast, root: NodeId) -> NodeId {
        let Node::Script { statements } = &ast[root] else {
            panic!("expected script");
        };
        match &ast[statements[0]] {
            Node::ExpressionStatement { expression } => *expression,
            other => panic!("expected expression statement, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_asi_on_newline() {
        let (ast, root) = parse("a = 1\nb = 2");
        assert_eq!(ast[root].statements().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        assert!(matches!(
            parse_script_new("a = 1 b = 2"),
            Err(ParseError::Unexpected { offset: 6, .. })
        ));
    }

    #[test]
    fn test_assignment_target_conversion() {
        let (ast, root) = parse("a.b = c;");
        let expr = first_expression(&ast, root);
        let Node::AssignmentExpression { binding, .. } = &ast[expr] else {
            panic!("expected assignment");
        };
        assert_eq!(ast.kind(*binding).name(), "StaticMemberAssignmentTarget");
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(matches!(
            parse_script_new("1 = 2;"),
            Err(ParseError::InvalidAssignmentTarget { offset: 0 })
        ));
    }

    #[test]
    fn test_precedence() {
        let (ast, root) = parse("a + b * c;");
        let expr = first_expression(&ast, root);
        let Node::BinaryExpression {
            operator, right, ..
        } = &ast[expr]
        else {
            panic!("expected binary");
        };
        assert_eq!(*operator, BinaryOperator::Add);
        assert!(matches!(
            ast[*right],
            Node::BinaryExpression {
                operator: BinaryOperator::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_arrow_detection() {
        let (ast, root) = parse("(a, b) => a + b;\nx => x;\n(a + b);");
        let Node::Script { statements } = &ast[root] else {
            panic!("expected script");
        };
        let kinds: Vec<&str> = statements
            .iter()
            .map(|s| match &ast[*s] {
                Node::ExpressionStatement { expression } => ast.kind(*expression).name(),
                _ => "",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["ArrowExpression", "ArrowExpression", "BinaryExpression"]
        );
    }

    #[test]
    fn test_keyword_property_names() {
        let (ast, root) = parse("a.new.delete; x = { class: 1, if: 2 };");
        assert_eq!(ast[root].statements().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_string_statement_is_expression() {
        let (ast, root) = parse("'use strict'");
        let expr = first_expression(&ast, root);
        assert_eq!(
            ast[expr],
            Node::LiteralStringExpression {
                value: "use strict".into()
            }
        );
    }

    #[test]
    fn test_parse_expression_rejects_trailing_tokens() {
        let mut ast = Ast::new();
        assert!(parse_expression(&mut ast, "a + b").is_ok());
        assert!(parse_expression(&mut ast, "a b").is_err());
    }

    #[test]
    fn test_unexpected_eof() {
        assert!(matches!(
            parse_script_new("function f() {"),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }
}
