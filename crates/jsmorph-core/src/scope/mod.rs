//! Lexical scopes, variables and the lookup index sessions cache.

mod analyzer;
mod index;

pub use analyzer::{
    binding_identifiers, Accessibility, Declaration, DeclarationKind, Reference, Scope,
    ScopeAnalyzer, ScopeGraph, ScopeKind, ScopeRef, Variable, VariableRef,
};
pub use index::{ScopeId, ScopeIndex, VariableId};
