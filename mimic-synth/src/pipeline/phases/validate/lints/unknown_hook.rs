//! Lint for hooks that are not registered.

use super::super::Lint;
use crate::pipeline::{Diagnostic, SynthesisRequest, phases::contract_closure};

/// Lint that warns about extension directives naming unregistered hooks.
///
/// Such members still synthesize, but invoking them fails with
/// `NotImplemented`.
pub struct UnknownHookLint;

impl Lint for UnknownHookLint {
    fn name(&self) -> &'static str {
        "unknown-hook"
    }

    fn description(&self) -> &'static str {
        "Check extension directives name registered hooks"
    }

    fn check(&self, request: &SynthesisRequest<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for contract in contract_closure(request.registry, &request.key.contracts) {
            for member in &contract.members {
                for hook in member.hooks().filter(|h| !request.hooks.contains(h)) {
                    diagnostics.push(
                        Diagnostic::warning(
                            "validate",
                            format!(
                                "hook '{}' is not registered; '{}' will not be implemented",
                                hook, member.name
                            ),
                        )
                        .at(format!("{}.{}", contract.name, member.name)),
                    );
                }
            }
        }
    }
}
