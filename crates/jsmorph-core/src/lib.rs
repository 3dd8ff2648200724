//! Mutation sessions over JavaScript syntax trees.
//!
//! A [`Session`] wraps a parsed script and lets callers select nodes, queue
//! replacements, deletions and insertions, and materialize them in one pass.
//! On top of the session sit scope-aware renaming, a purity assessor for
//! functions and a set of refactoring passes.

pub mod analysis;
pub mod config;
pub mod error;
pub mod id_generator;
pub mod passes;
pub mod scope;
pub mod session;

pub use analysis::{PurityAssessment, PurityOptions, PurityVerdict};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use id_generator::{IdGenerator, MemorableIdGenerator, SequentialIdGenerator};
pub use passes::RefactorPass;
pub use scope::{ScopeId, ScopeIndex, VariableId};
pub use session::{ApplyReport, InsertPosition, Replacement, Replacer, Session, Targets};
