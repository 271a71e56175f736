//! Lint trait for contract validation.

use serde::Serialize;

use crate::pipeline::{Diagnostic, SynthesisRequest};

/// Information about a lint.
#[derive(Debug, Clone, Serialize)]
pub struct LintInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// A check over the contracts of a synthesis request.
pub trait Lint: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Check the request and add any diagnostics.
    fn check(&self, request: &SynthesisRequest<'_>, diagnostics: &mut Vec<Diagnostic>);

    fn info(&self) -> LintInfo {
        LintInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
