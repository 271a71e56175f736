//! Pipeline phase trait.

use mimic_core::Result;
use serde::Serialize;

use super::SynthesisContext;

/// Information about a pipeline phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// A phase in the synthesis pipeline.
///
/// Built-in phases, in order:
/// - `ValidatePhase` - runs lints over the requested contracts
/// - `FlattenPhase` - collects members across inherited contracts
/// - `ResolvePhase` - binds every slot to a source member, hook or strategy
/// - `EmitPhase` - compiles the bindings into the adapter type
///
/// Custom phases run after the built-in ones.
pub trait Phase: Send + Sync {
    /// The name of this phase (used in diagnostics and plugin hooks).
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Run this phase on the synthesis context.
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis cannot continue. Members that merely
    /// fail to bind are recorded as diagnostics instead.
    fn run(&self, ctx: &mut SynthesisContext<'_>) -> Result<()>;

    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
