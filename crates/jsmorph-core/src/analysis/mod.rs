//! Read-only analyses over a session's tree.
//!
//! Analyses never edit the tree; callers act on their results through
//! the session's queue.

pub mod purity;

pub use purity::{
    assess_purity, find_pure_function_candidates, ImpurityQualities, PurityAssessment,
    PurityOptions, PurityVerdict,
};
