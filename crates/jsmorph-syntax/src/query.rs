//! CSS-like node selectors.
//!
//! ```text
//! selector   := complex ("," complex)*
//! complex    := compound ((" " | ">") compound)*
//! compound   := (Type | "*")? predicate*
//! predicate  := "[" path (("=" | "!=") value)? "]"
//! path       := name ("." name)*
//! ```
//!
//! `path` walks node fields by name; the pseudo-field `type` yields the node
//! kind and `length` yields the size of a list.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::ast::{Ast, Field, NodeId, NodeKind};
use crate::traverse::{build_parent_map, descendants, ParentMap};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid selector '{selector}' at offset {offset}: {message}")]
    Syntax {
        selector: String,
        offset: usize,
        message: String,
    },

    #[error("unknown node type '{name}' in selector")]
    UnknownType { name: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    path: Vec<String>,
    /// `None` tests presence; `Some((negated, value))` tests equality.
    test: Option<(bool, Literal)>,
}

#[derive(Debug, Clone, PartialEq)]
struct Compound {
    kind: Option<NodeKind>,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        SelectorParser {
            source,
            pos: 0,
        }
        .parse()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `id` matches. `parents` must cover every ancestor the
    /// selector may need to look at.
    pub fn matches(&self, ast: &Ast, id: NodeId, parents: &ParentMap) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(ast, id, complex.compounds.len() - 1, parents))
    }
}

impl FromStr for Selector {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Complex {
    fn matches_at(&self, ast: &Ast, id: NodeId, index: usize, parents: &ParentMap) -> bool {
        if !self.compounds[index].matches(ast, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => parents
                .get(&id)
                .is_some_and(|parent| self.matches_at(ast, *parent, index - 1, parents)),
            Combinator::Descendant => {
                let mut current = parents.get(&id);
                while let Some(ancestor) = current {
                    if self.matches_at(ast, *ancestor, index - 1, parents) {
                        return true;
                    }
                    current = parents.get(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, ast: &Ast, id: NodeId) -> bool {
        if self.kind.is_some_and(|kind| ast.kind(id) != kind) {
            return false;
        }
        self.predicates.iter().all(|p| p.matches(ast, id))
    }
}

#[derive(Debug, Clone, Copy)]
enum Resolved<'a> {
    Node(NodeId),
    Str(&'a str),
    Num(f64),
    Bool(bool),
    Null,
    List,
}

impl Predicate {
    fn matches(&self, ast: &Ast, id: NodeId) -> bool {
        let resolved = resolve(ast, id, &self.path);
        match &self.test {
            None => !matches!(resolved, None | Some(Resolved::Null)),
            Some((negated, literal)) => {
                let equal = resolved.is_some_and(|value| literal_equals(value, literal));
                equal != *negated
            }
        }
    }
}

fn resolve<'a>(ast: &'a Ast, id: NodeId, path: &[String]) -> Option<Resolved<'a>> {
    let mut current = Resolved::Node(id);
    let mut list: Option<Field<'a>> = None;

    for segment in path {
        if let Some(field) = list.take() {
            current = index_list(field, segment)?;
            continue;
        }
        let Resolved::Node(node_id) = current else {
            return None;
        };
        if segment == "type" {
            current = Resolved::Str(ast.kind(node_id).name());
            continue;
        }
        let field = ast[node_id]
            .fields()
            .into_iter()
            .find(|(name, _)| *name == segment.as_str())?
            .1;
        current = match field {
            Field::Node(child) => Resolved::Node(child),
            Field::OptNode(child) => child.map_or(Resolved::Null, Resolved::Node),
            Field::List(_) | Field::SparseList(_) => {
                list = Some(field);
                Resolved::List
            }
            Field::Str(s) => Resolved::Str(s),
            Field::Num(n) => Resolved::Num(n),
            Field::Bool(b) => Resolved::Bool(b),
        };
    }
    Some(current)
}

fn index_list<'a>(field: Field<'a>, segment: &str) -> Option<Resolved<'a>> {
    if segment == "length" {
        let len = match field {
            Field::List(ids) => ids.len(),
            Field::SparseList(ids) => ids.len(),
            _ => return None,
        };
        return Some(Resolved::Num(len as f64));
    }
    let index: usize = segment.parse().ok()?;
    match field {
        Field::List(ids) => ids.get(index).map(|id| Resolved::Node(*id)),
        Field::SparseList(ids) => ids
            .get(index)
            .map(|id| id.map_or(Resolved::Null, Resolved::Node)),
        _ => None,
    }
}

fn literal_equals(value: Resolved<'_>, literal: &Literal) -> bool {
    match (value, literal) {
        (Resolved::Str(s), Literal::Str(expected)) => s == expected,
        (Resolved::Num(n), Literal::Num(expected)) => n == *expected,
        (Resolved::Bool(b), Literal::Bool(expected)) => b == *expected,
        (Resolved::Null, Literal::Null) => true,
        _ => false,
    }
}

struct SelectorParser<'a> {
    source: &'a str,
    pos: usize,
}

impl SelectorParser<'_> {
    fn parse(mut self) -> Result<Selector, QueryError> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.eat(',') {
            alternatives.push(self.parse_complex()?);
        }
        self.skip_whitespace();
        if self.pos < self.source.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(Selector {
            source: self.source.trim().to_string(),
            alternatives,
        })
    }

    fn error(&self, message: &str) -> QueryError {
        QueryError::Syntax {
            selector: self.source.to_string(),
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        self.bump_while(char::is_whitespace);
        self.pos > start
    }

    fn parse_complex(&mut self) -> Result<Complex, QueryError> {
        self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return Err(self.error("expected combinator")),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, QueryError> {
        let kind = match self.peek() {
            Some('*') => {
                self.pos += 1;
                None
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.name();
                Some(
                    name.parse::<NodeKind>()
                        .map_err(|_| QueryError::UnknownType { name })?,
                )
            }
            Some('[') => None,
            _ => return Err(self.error("expected node type, '*' or '['")),
        };
        let mut predicates = Vec::new();
        while self.peek() == Some('[') {
            self.pos += 1;
            predicates.push(self.parse_predicate()?);
        }
        Ok(Compound { kind, predicates })
    }

    fn name(&mut self) -> String {
        let start = self.pos;
        self.bump_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
        self.source[start..self.pos].to_string()
    }

    fn parse_predicate(&mut self) -> Result<Predicate, QueryError> {
        self.skip_whitespace();
        let mut path = vec![self.name()];
        while self.peek() == Some('.') {
            self.pos += 1;
            path.push(self.name());
        }
        if path.iter().any(String::is_empty) {
            return Err(self.error("expected field path"));
        }
        self.skip_whitespace();
        let test = match self.bump() {
            Some(']') => return Ok(Predicate { path, test: None }),
            Some('=') => false,
            Some('!') if self.peek() == Some('=') => {
                self.pos += 1;
                true
            }
            _ => return Err(self.error("expected '=', '!=' or ']'")),
        };
        self.skip_whitespace();
        let value = self.parse_literal()?;
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(Predicate {
            path,
            test: Some((test, value)),
        })
    }

    fn parse_literal(&mut self) -> Result<Literal, QueryError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(Literal::Str(value)),
                        Some('\\') => match self.bump() {
                            Some(escaped) => value.push(escaped),
                            None => break,
                        },
                        Some(c) => value.push(c),
                        None => break,
                    }
                }
                Err(self.error("unterminated string"))
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '.' => {
                let start = self.pos;
                self.bump_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
                self.source[start..self.pos]
                    .parse::<f64>()
                    .map(Literal::Num)
                    .map_err(|_| self.error("invalid number"))
            }
            _ => {
                let word = self.name();
                match word.as_str() {
                    "" => Err(self.error("expected value")),
                    "true" => Ok(Literal::Bool(true)),
                    "false" => Ok(Literal::Bool(false)),
                    "null" => Ok(Literal::Null),
                    _ => Ok(Literal::Str(word)),
                }
            }
        }
    }
}

/// Matches under each root, roots included, in document order without
/// duplicates.
pub fn query(ast: &Ast, roots: &[NodeId], selector: &Selector) -> Vec<NodeId> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for root in roots {
        let parents = build_parent_map(ast, *root);
        for id in descendants(ast, *root) {
            if selector.matches(ast, id, &parents) && seen.insert(id) {
                out.push(id);
            }
        }
    }
    out
}

pub fn query_str(ast: &Ast, roots: &[NodeId], selector: &str) -> Result<Vec<NodeId>, QueryError> {
    Ok(query(ast, roots, &Selector::parse(selector)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script_new;

    fn kinds(source: &str, selector: &str) -> Vec<String> {
        let (ast, root) = parse_script_new(source).unwrap();
        query_str(&ast, &[root], selector)
            .unwrap()
            .into_iter()
            .map(|id| crate::codegen::generate(&ast, id).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_type_and_attribute() {
        assert_eq!(
            kinds("a.b; c['d']; e[f];", "ComputedMemberExpression[expression.type=LiteralStringExpression]"),
            vec![r#"c["d"]"#]
        );
    }

    #[test]
    fn test_numeric_and_operator_values() {
        assert_eq!(
            kinds("!0; !1; -0;", r#"UnaryExpression[operator="!"][operand.value=0]"#),
            vec!["!0"]
        );
    }

    #[test]
    fn test_descendant_and_child() {
        let source = "function f() { return g(x); } h(y);";
        assert_eq!(
            kinds(source, "FunctionDeclaration IdentifierExpression"),
            vec!["g", "x"]
        );
        assert_eq!(
            kinds(source, "CallExpression > IdentifierExpression[name=y]"),
            vec!["y"]
        );
        assert_eq!(kinds(source, "ReturnStatement > IdentifierExpression"), Vec::<String>::new());
    }

    #[test]
    fn test_alternatives_are_in_document_order() {
        assert_eq!(
            kinds("a; 1; b;", "LiteralNumericExpression, IdentifierExpression"),
            vec!["a", "1", "b"]
        );
    }

    #[test]
    fn test_presence_and_length() {
        assert_eq!(kinds("return; return 1;", "ReturnStatement[expression]"), vec!["return 1;"]);
        assert_eq!(kinds("f(); g(1, 2);", "CallExpression[arguments.length=2]"), vec!["g(1, 2)"]);
    }

    #[test]
    fn test_not_equal() {
        assert_eq!(
            kinds("x = 1; y = 2;", "AssignmentTargetIdentifier[name!=x]"),
            vec!["y"]
        );
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(matches!(
            Selector::parse("Nope"),
            Err(QueryError::UnknownType { .. })
        ));
        assert!(matches!(
            Selector::parse("IdentifierExpression[name"),
            Err(QueryError::Syntax { .. })
        ));
        assert!(Selector::parse("").is_err());
    }

    #[test]
    fn test_roots_are_included() {
        let (ast, root) = parse_script_new("a;").unwrap();
        let statement = ast.children(root)[0];
        let found = query_str(&ast, &[statement, statement], "ExpressionStatement").unwrap();
        assert_eq!(found, vec![statement]);
    }
}
