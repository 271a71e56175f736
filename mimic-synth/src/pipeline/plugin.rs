//! Pipeline plugin trait for extensibility.

use mimic_core::Result;

use super::SynthesisContext;

/// A plugin that hooks into the synthesis pipeline.
///
/// Plugins receive callbacks before and after each phase runs. They see every
/// synthesis the engine performs, cache hits excluded.
///
/// # Example
///
/// ```ignore
/// struct UnresolvedAudit;
///
/// impl Plugin for UnresolvedAudit {
///     fn name(&self) -> &'static str { "unresolved-audit" }
///
///     fn on_after_phase(&self, phase: &str, ctx: &mut SynthesisContext<'_>) -> Result<()> {
///         if phase == "resolve" && ctx.has_warnings() {
///             eprintln!("{} has unresolved members", ctx.request.key);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called before a phase runs.
    ///
    /// # Errors
    ///
    /// Return an error to abort synthesis.
    #[allow(unused_variables)]
    fn on_before_phase(&self, phase: &str, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after a phase completes successfully.
    ///
    /// # Errors
    ///
    /// Return an error to abort synthesis.
    #[allow(unused_variables)]
    fn on_after_phase(&self, phase: &str, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        Ok(())
    }
}
