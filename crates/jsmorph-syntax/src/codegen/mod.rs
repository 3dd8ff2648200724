//! Source printer.
//!
//! Output is formatted with two-space indentation and one statement per
//! line. Parentheses are emitted only where precedence or statement-start
//! ambiguity requires them, so printing and reparsing yields the same tree.

mod expressions;
mod statements;

use crate::ast::{Ast, Node, NodeId};

pub struct CodeGenerator<'a> {
    ast: &'a Ast,
    output: String,
    indent_level: usize,
    indent_str: &'static str,
}

/// Prints the subtree rooted at `id`.
pub fn generate(ast: &Ast, id: NodeId) -> String {
    CodeGenerator::new(ast).generate(id)
}

impl<'a> CodeGenerator<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            output: String::new(),
            indent_level: 0,
            indent_str: "  ",
        }
    }

    pub fn with_indent_str(mut self, indent_str: &'static str) -> Self {
        self.indent_str = indent_str;
        self
    }

    pub fn generate(mut self, id: NodeId) -> String {
        let node = &self.ast[id];
        if let Node::Script { statements } = node {
            for statement in statements {
                self.generate_statement(*statement);
            }
        } else if node.is_statement() {
            self.generate_statement(id);
        } else {
            self.generate_node(id);
        }
        self.output
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn writeln(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }
}

/// Whether `name` can be written as a bare identifier name (keywords
/// included, as in property position).
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script_new;
    use insta::assert_snapshot;

    fn print(source: &str) -> String {
        let (ast, root) = parse_script_new(source).unwrap();
        generate(&ast, root)
    }

    #[test]
    fn test_statements_layout() {
        assert_snapshot!(print("function f(a,b){if(a){return b}else return a+b;}").trim_end(), @r"
        function f(a, b) {
          if (a) {
            return b;
          } else
            return a + b;
        }
        ");
    }

    #[test]
    fn test_parenthesizes_by_precedence() {
        assert_snapshot!(print("(a + b) * c; a + (b * c); (a, b), c; x = (y, z);").trim_end(), @r"
        (a + b) * c;
        a + b * c;
        a, b, c;
        x = (y, z);
        ");
    }

    #[test]
    fn test_statement_start_parens() {
        assert_snapshot!(print("(function(){})(); ({a: 1}).a; (class {});").trim_end(), @r"
        (function () {}());
        ({ a: 1 }.a);
        (class {});
        ");
    }

    #[test]
    fn test_members_and_literals() {
        assert_snapshot!(print("(1).toString(); a['b-c']; x = { 'a': 1, 'b c': 2, 3: d, [e]: f, g };").trim_end(), @r#"
        (1).toString();
        a["b-c"];
        x = { a: 1, "b c": 2, 3: d, [e]: f, g };
        "#);
    }

    #[test]
    fn test_unary_spacing() {
        assert_snapshot!(print("-(-a); +(+a); -(--a); typeof a; !a;").trim_end(), @r"
        - -a;
        + +a;
        - --a;
        typeof a;
        !a;
        ");
    }

    #[test]
    fn test_arrow_object_body() {
        assert_snapshot!(print("f = x => ({ a: x }); g = (a, b) => { return a; };").trim_end(), @r"
        f = (x) => ({ a: x });
        g = (a, b) => {
          return a;
        };
        ");
    }

    #[test]
    fn test_new_with_call_callee() {
        assert_snapshot!(print("new (f())(); new a.b(c); new A;").trim_end(), @r"
        new (f())();
        new a.b(c);
        new A();
        ");
    }

    #[test]
    fn test_is_identifier_name() {
        assert!(is_identifier_name("foo"));
        assert!(is_identifier_name("$_a1"));
        assert!(is_identifier_name("new"));
        assert!(!is_identifier_name("1a"));
        assert!(!is_identifier_name("a-b"));
        assert!(!is_identifier_name(""));
    }
}
