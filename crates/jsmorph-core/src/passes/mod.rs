//! Whole-tree refactoring passes built on top of [`Session`].

mod dead_variables;
mod debugger;
mod inline_literals;
mod normalize;
mod simplify;
mod unshorten;

pub use dead_variables::DeadVariableEliminationPass;
pub use debugger::InsertDebuggerPass;
pub use inline_literals::InlineLiteralsPass;
pub use normalize::NormalizeIdentifiersPass;
pub use simplify::{
    CompressCommaPass, CompressConditionalPass, ConvertComputedToStaticPass, ExpandBooleanPass,
};
pub use unshorten::UnshortenPass;

use tracing::debug;

use crate::error::Result;
use crate::session::Session;

/// A rewrite that runs against a whole session.
pub trait RefactorPass {
    fn name(&self) -> &'static str;

    /// Runs the pass and returns how many changes it made.
    fn run(&mut self, session: &mut Session) -> Result<usize>;
}

impl Session {
    /// Runs `pass` and logs how many changes it made.
    pub fn run_pass(&mut self, pass: &mut dyn RefactorPass) -> Result<usize> {
        let changes = pass.run(self)?;
        debug!(pass = pass.name(), changes, "pass finished");
        Ok(changes)
    }

    /// Runs each pass in order. Returns the total number of changes.
    pub fn run_passes(&mut self, passes: &mut [Box<dyn RefactorPass>]) -> Result<usize> {
        let mut total = 0;
        for pass in passes.iter_mut() {
            total += self.run_pass(pass.as_mut())?;
        }
        Ok(total)
    }
}
