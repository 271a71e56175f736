//! Validate phase - runs lints over the requested contracts.

mod lint;
pub mod lints;

pub use lint::{Lint, LintInfo};
pub use lints::{AdaptTargetLint, StaticOwnerLint, UnknownHookLint};
use mimic_core::{Error, Result};
use tracing::warn;

use crate::pipeline::{Phase, SynthesisContext};

/// Phase that validates the requested contracts using configurable lints.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Create a validate phase with the default lints.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(StaticOwnerLint),
                Box::new(UnknownHookLint),
                Box::new(AdaptTargetLint),
            ],
        }
    }

    /// Create a validate phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }

    pub fn lint_names(&self) -> Vec<&'static str> {
        self.lints.iter().map(|l| l.name()).collect()
    }

    pub fn lint_info(&self) -> Vec<LintInfo> {
        self.lints.iter().map(|l| l.info()).collect()
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check contract directives and collect diagnostics"
    }

    fn run(&self, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        for lint in &self.lints {
            lint.check(&ctx.request, &mut ctx.diagnostics);
        }

        // Warnings are allowed
        for warning in ctx.diagnostics.iter().filter(|d| d.severity.is_warning()) {
            warn!(adapter = %ctx.request.adapter_name(), "{}", warning);
        }
        if ctx.has_errors() {
            let messages: Vec<String> = ctx.errors().map(|d| d.message.clone()).collect();
            return Err(Error::generation(
                ctx.request.adapter_name(),
                format!(
                    "validation failed with {} error(s): {}",
                    messages.len(),
                    messages.join("; ")
                ),
            ));
        }

        Ok(())
    }
}
