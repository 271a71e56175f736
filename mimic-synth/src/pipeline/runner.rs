//! Pipeline orchestrator.

use mimic_core::Result;
use tracing::debug;

use super::{
    Phase, PhaseInfo, Plugin, SynthesisContext, SynthesisRequest,
    phases::{EmitPhase, FlattenPhase, LintInfo, ResolvePhase, ValidatePhase},
};

/// The synthesis pipeline orchestrator.
///
/// Runs the built-in phases (validate, flatten, resolve, emit) followed by any
/// user phases, calling plugin hooks before and after each phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .plugin(MyPlugin::new())
///     .phase(MyCustomPhase);
///
/// let mut ctx = pipeline.run(request)?;
/// let adapter = ctx.take_adapter()?;
/// ```
pub struct Pipeline {
    validate: ValidatePhase,
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            validate: ValidatePhase::new(),
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Replace the built-in validate phase, e.g. to add lints.
    pub fn validate(mut self, phase: ValidatePhase) -> Self {
        self.validate = phase;
        self
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub(crate) fn add_plugin(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Move `other`'s plugins in front of this pipeline's own.
    pub(crate) fn take_plugins_from(&mut self, other: Pipeline) {
        let mut plugins = other.plugins;
        plugins.append(&mut self.plugins);
        self.plugins = plugins;
    }

    /// Every phase in run order, built-in ones first.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        let builtin = [
            self.validate.info(),
            FlattenPhase.info(),
            ResolvePhase.info(),
            EmitPhase.info(),
        ];
        builtin
            .into_iter()
            .chain(self.phases.iter().map(|p| p.info()))
            .collect()
    }

    /// The lints the validate phase runs.
    pub fn lint_info(&self) -> Vec<LintInfo> {
        self.validate.lint_info()
    }

    /// Run every phase for one synthesis request.
    ///
    /// # Errors
    ///
    /// Returns the first fatal phase or plugin error.
    pub fn run<'a>(&self, request: SynthesisRequest<'a>) -> Result<SynthesisContext<'a>> {
        let mut ctx = SynthesisContext::new(request);

        let builtin: [&dyn Phase; 4] = [&self.validate, &FlattenPhase, &ResolvePhase, &EmitPhase];
        for phase in builtin {
            self.run_phase(phase, &mut ctx)?;
        }

        for phase in &self.phases {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    fn run_phase(&self, phase: &dyn Phase, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        debug!(phase = phase_name, key = %ctx.request.key, "running phase");
        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
