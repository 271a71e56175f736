//! Resolve phase - binds every slot of the flattened members.

use std::collections::HashSet;

use mimic_core::Result;
use mimic_ir::BindingTarget;
use tracing::warn;

use crate::{
    pipeline::{Diagnostic, Phase, SynthesisContext},
    resolve::Resolver,
};

/// Phase that decides a binding for every slot.
///
/// Slots that cannot be bound are kept, with a warning; their invokers fail
/// with `NotImplemented`.
pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Bind slots to source members, hooks and strategies"
    }

    fn run(&self, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        let resolver = Resolver::new(ctx.request);
        let adapter = ctx.request.adapter_name();
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, flat) in ctx.members.iter().enumerate() {
            // A slot belongs to the first member that declares it.
            for slot in flat.slots().into_iter().filter(|s| seen.insert(s.clone())) {
                let slot = resolver.resolve(index, flat, slot)?;
                if let BindingTarget::Unresolved { reason } = &slot.plan.target {
                    warn!(adapter = %adapter, slot = %slot.plan.slot, reason = %reason, "slot left unresolved");
                    diagnostics.push(
                        Diagnostic::warning(self.name(), reason.clone()).at(flat.location()),
                    );
                }
                resolved.push(slot);
            }
        }

        ctx.resolved = resolved;
        for diagnostic in diagnostics {
            ctx.add_diagnostic(diagnostic);
        }
        Ok(())
    }
}
