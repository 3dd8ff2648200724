//! Syntax layer for jsmorph: the node arena, a parser and printer for an
//! ECMAScript subset, tree traversal and CSS-like node selectors.

pub mod ast;
pub mod codegen;
pub mod compare;
pub mod parser;
pub mod query;
pub mod traverse;

pub use ast::{Ast, Node, NodeId, NodeKind};
pub use codegen::{generate, CodeGenerator};
pub use compare::{is_similar, structurally_equal};
pub use parser::{parse_expression, parse_script, parse_script_new, ParseError};
pub use query::{query, query_str, QueryError, Selector};
pub use traverse::{build_parent_map, walk, ParentMap, VisitControl, Visitor};
