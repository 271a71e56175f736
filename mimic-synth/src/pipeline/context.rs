//! Synthesis context passed through pipeline phases.

use std::sync::Arc;

use mimic_core::{Error, Result, TypeInfo};
use mimic_ir::SynthesisKey;

use super::diagnostic::{Diagnostic, Severity};
use crate::{
    AdapterType, HookRegistry, TypeRegistry,
    resolve::{FlatMember, ResolvedSlot},
    strategy::Strategy,
};

/// What is being synthesized and everything it may bind against.
#[derive(Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub key: &'a SynthesisKey,
    pub source: &'a Arc<TypeInfo>,
    pub registry: &'a TypeRegistry,
    pub hooks: &'a HookRegistry,
    /// Strategies in registration order; the first that claims a member wins.
    pub strategies: &'a [Arc<dyn Strategy>],
}

impl SynthesisRequest<'_> {
    pub fn adapter_name(&self) -> String {
        self.key.canonical_name()
    }
}

/// State of one synthesis, accumulated phase by phase.
pub struct SynthesisContext<'a> {
    pub request: SynthesisRequest<'a>,
    /// Flattened contract members (populated by FlattenPhase).
    pub members: Vec<FlatMember>,
    /// Every contract satisfied, inherited ones included (populated by FlattenPhase).
    pub implemented: Vec<String>,
    /// One binding per slot (populated by ResolvePhase).
    pub resolved: Vec<ResolvedSlot>,
    /// The compiled adapter (populated by EmitPhase).
    pub adapter: Option<AdapterType>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> SynthesisContext<'a> {
    pub fn new(request: SynthesisRequest<'a>) -> Self {
        Self {
            request,
            members: Vec::new(),
            implemented: Vec::new(),
            resolved: Vec::new(),
            adapter: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// Take the compiled adapter out of the context.
    ///
    /// # Errors
    ///
    /// Returns `AdapterGeneration` if EmitPhase has not run.
    pub fn take_adapter(&mut self) -> Result<AdapterType> {
        self.adapter.take().ok_or_else(|| {
            Error::generation(self.request.adapter_name(), "emit phase did not run")
        })
    }
}
