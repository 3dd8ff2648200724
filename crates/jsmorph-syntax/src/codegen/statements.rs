use super::CodeGenerator;
use crate::ast::operators::precedence;
use crate::ast::{Node, NodeId};

impl CodeGenerator<'_> {
    pub(super) fn generate_statement(&mut self, id: NodeId) {
        let ast = self.ast;
        match &ast[id] {
            Node::VariableDeclarationStatement { declaration } => {
                self.write_indent();
                self.generate_variable_declaration(*declaration);
                self.writeln(";");
            }
            Node::ExpressionStatement { expression } => {
                self.write_indent();
                let wrap = self.starts_ambiguously(*expression);
                if wrap {
                    self.write("(");
                }
                self.generate_expression(*expression, precedence::SEQUENCE);
                if wrap {
                    self.write(")");
                }
                self.writeln(";");
            }
            Node::ReturnStatement { expression } => {
                self.write_indent();
                self.write("return");
                if let Some(expression) = expression {
                    self.write(" ");
                    self.generate_expression(*expression, precedence::SEQUENCE);
                }
                self.writeln(";");
            }
            Node::ThrowStatement { expression } => {
                self.write_indent();
                self.write("throw ");
                self.generate_expression(*expression, precedence::SEQUENCE);
                self.writeln(";");
            }
            Node::IfStatement { .. } => {
                self.write_indent();
                if !self.generate_if_inline(id) {
                    self.writeln("");
                }
            }
            Node::WhileStatement { test, body } => {
                self.write_indent();
                self.write("while (");
                self.generate_expression(*test, precedence::SEQUENCE);
                self.write(")");
                if !self.generate_clause(*body) {
                    self.writeln("");
                }
            }
            Node::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.write_indent();
                self.write("for (");
                if let Some(init) = init {
                    if matches!(ast[*init], Node::VariableDeclaration { .. }) {
                        self.generate_variable_declaration(*init);
                    } else {
                        self.generate_expression(*init, precedence::SEQUENCE);
                    }
                }
                self.write(";");
                if let Some(test) = test {
                    self.write(" ");
                    self.generate_expression(*test, precedence::SEQUENCE);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.generate_expression(*update, precedence::SEQUENCE);
                }
                self.write(")");
                if !self.generate_clause(*body) {
                    self.writeln("");
                }
            }
            Node::BlockStatement { block } => {
                self.write_indent();
                self.generate_block(*block);
                self.writeln("");
            }
            Node::EmptyStatement => {
                self.write_indent();
                self.writeln(";");
            }
            Node::DebuggerStatement => {
                self.write_indent();
                self.writeln("debugger;");
            }
            Node::BreakStatement => {
                self.write_indent();
                self.writeln("break;");
            }
            Node::ContinueStatement => {
                self.write_indent();
                self.writeln("continue;");
            }
            Node::FunctionDeclaration { name, params, body } => {
                self.write_indent();
                self.write("function ");
                self.generate_node(*name);
                self.generate_node(*params);
                self.write(" ");
                self.generate_node(*body);
                self.writeln("");
            }
            Node::ClassDeclaration {
                name,
                super_class,
                elements,
            } => {
                self.write_indent();
                self.generate_class(Some(*name), *super_class, elements);
                self.writeln("");
            }
            _ => {
                // Not a statement; print it on a line of its own.
                self.write_indent();
                self.generate_node(id);
                self.writeln("");
            }
        }
    }

    pub(super) fn generate_variable_declaration(&mut self, id: NodeId) {
        let ast = self.ast;
        let Node::VariableDeclaration { kind, declarators } = &ast[id] else {
            self.generate_node(id);
            return;
        };
        self.write(kind.as_str());
        self.write(" ");
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.generate_node(*declarator);
        }
    }

    /// Prints `if (...) ...` without leading indentation. Returns whether the
    /// output already ends with a newline.
    fn generate_if_inline(&mut self, id: NodeId) -> bool {
        let ast = self.ast;
        let Node::IfStatement {
            test,
            consequent,
            alternate,
        } = &ast[id]
        else {
            return false;
        };
        self.write("if (");
        self.generate_expression(*test, precedence::SEQUENCE);
        self.write(")");
        let mut ended_with_newline = self.generate_clause(*consequent);
        if let Some(alternate) = alternate {
            if ended_with_newline {
                self.write_indent();
            } else {
                self.write(" ");
            }
            self.write("else");
            ended_with_newline = if matches!(ast[*alternate], Node::IfStatement { .. }) {
                self.write(" ");
                self.generate_if_inline(*alternate)
            } else {
                self.generate_clause(*alternate)
            };
        }
        ended_with_newline
    }

    /// Prints the body of a compound statement after its header. Blocks stay
    /// on the header line; anything else goes on an indented line of its
    /// own. Returns whether the output already ends with a newline.
    fn generate_clause(&mut self, body: NodeId) -> bool {
        let ast = self.ast;
        if let Node::BlockStatement { block } = &ast[body] {
            self.write(" ");
            self.generate_block(*block);
            false
        } else {
            self.writeln("");
            self.indent();
            self.generate_statement(body);
            self.dedent();
            true
        }
    }

    /// Prints a braced statement list starting at the current column and
    /// ending right after the closing brace.
    pub(super) fn generate_block(&mut self, id: NodeId) {
        let ast = self.ast;
        let statements = ast[id].statements().unwrap_or_default();
        if statements.is_empty() {
            self.write("{}");
            return;
        }
        self.writeln("{");
        self.indent();
        for statement in statements {
            self.generate_statement(*statement);
        }
        self.dedent();
        self.write_indent();
        self.write("}");
    }

    pub(super) fn generate_class(
        &mut self,
        name: Option<NodeId>,
        super_class: Option<NodeId>,
        elements: &[NodeId],
    ) {
        self.write("class");
        if let Some(name) = name {
            self.write(" ");
            self.generate_node(name);
        }
        if let Some(super_class) = super_class {
            self.write(" extends ");
            self.generate_expression(super_class, precedence::CALL);
        }
        if elements.is_empty() {
            self.write(" {}");
            return;
        }
        self.writeln(" {");
        self.indent();
        for element in elements {
            self.write_indent();
            self.generate_node(*element);
            self.writeln("");
        }
        self.dedent();
        self.write_indent();
        self.write("}");
    }
}
