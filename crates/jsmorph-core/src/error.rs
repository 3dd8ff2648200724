use jsmorph_syntax::{NodeKind, ParseError, QueryError};
use thiserror::Error;

/// Errors raised by sessions, scope lookups and passes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("selector error: {0}")]
    Query(#[from] QueryError),

    #[error("could not resolve a variable for {kind} node")]
    UnresolvedIdentifier { kind: NodeKind },

    #[error("{kind} node resolves to {count} variables")]
    AmbiguousVariable { kind: NodeKind, count: usize },

    #[error("handle from scope generation {found} used at generation {current}")]
    StaleHandle { found: u64, current: u64 },

    #[error("handle does not belong to the current scope index")]
    UnknownHandle,

    #[error("session has unapplied edits; call apply() first")]
    DirtySession,

    #[error("insertion target must be a statement, got {kind}")]
    InsertTargetNotStatement { kind: NodeKind },

    #[error("insertion payload must be a statement, got {kind}")]
    InsertPayloadNotStatement { kind: NodeKind },

    #[error("replacement for an expression must be an expression, got {kind}")]
    ExpressionExpected { kind: NodeKind },

    #[error("replacement source '{text}' contains no statement")]
    EmptyReplacement { text: String },

    #[error("selector '{selector}' matched {found} nodes, expected exactly one")]
    ExpectedOne { selector: String, found: usize },

    #[error("allow-list entry '{entry}' is not a call expression")]
    InvalidAllowList { entry: String },

    #[error("no fixed point reached after {passes} passes")]
    FixedPointNotReached { passes: usize },

    #[error("replacer failed: {0}")]
    Replacer(#[source] anyhow::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML configuration: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("invalid JSON configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl Error {
    /// Wraps an arbitrary failure raised inside a replacer callback.
    pub fn replacer(error: impl Into<anyhow::Error>) -> Self {
        Error::Replacer(error.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
