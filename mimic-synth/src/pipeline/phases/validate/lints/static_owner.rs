//! Lint for static binding owners.

use super::super::Lint;
use crate::pipeline::{Diagnostic, SynthesisRequest, phases::contract_closure};

/// Lint that errors when a static binding has no owner type to bind on.
///
/// The owner is the directive's explicit owner or, failing that, the type
/// the contract adapts. It must be registered, or be the source type itself.
pub struct StaticOwnerLint;

impl Lint for StaticOwnerLint {
    fn name(&self) -> &'static str {
        "static-owner"
    }

    fn description(&self) -> &'static str {
        "Check static bindings name a known owner type"
    }

    fn check(&self, request: &SynthesisRequest<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for contract in contract_closure(request.registry, &request.key.contracts) {
            for member in &contract.members {
                let Some(binding) = member.binding.as_ref().filter(|b| b.is_static()) else {
                    continue;
                };
                let location = format!("{}.{}", contract.name, member.name);

                match binding.owner.as_deref().or(contract.adapts.as_deref()) {
                    None => diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "'{}' binds statically but names no owner, and '{}' has no 'adapts' type",
                                location, contract.name
                            ),
                        )
                        .at(location),
                    ),
                    Some(owner)
                        if owner != request.source.name
                            && request.registry.type_info(owner).is_none() =>
                    {
                        diagnostics.push(
                            Diagnostic::error(
                                "validate",
                                format!("static owner '{}' not found", owner),
                            )
                            .at(location),
                        )
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mimic_core::TypeInfo;
    use mimic_ir::SynthesisKey;
    use mimic_manifest::Manifest;

    use super::*;
    use crate::{HookRegistry, TypeRegistry};

    fn check(manifest: &str) -> Vec<Diagnostic> {
        let manifest: Manifest = manifest.parse().expect("Failed to parse test manifest");
        let mut registry = TypeRegistry::new();
        registry.load(manifest);
        registry.register_type(TypeInfo::builder("demo::Helpers").build());

        let hooks = HookRegistry::new();
        let key = SynthesisKey::new("demo::Thing", ["IThing"]);
        let source = TypeInfo::builder("demo::Thing").build();
        let request = SynthesisRequest {
            key: &key,
            source: &source,
            registry: &registry,
            hooks: &hooks,
            strategies: &[],
        };

        let mut diagnostics = Vec::new();
        StaticOwnerLint.check(&request, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_known_owners() {
        let diagnostics = check(
            r#"
            [contracts.IThing]
            adapts = "demo::Thing"

            [[contracts.IThing.members]]
            name = "Create"
            kind = "method"
            returns = "object"
            bind = { binding = "static" }

            [[contracts.IThing.members]]
            name = "Walk"
            kind = "method"
            returns = "i32"
            bind = { binding = "static", owner = "demo::Helpers" }
        "#,
        );

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_owner() {
        let diagnostics = check(
            r#"
            [contracts.IThing]

            [[contracts.IThing.members]]
            name = "Create"
            kind = "method"
            returns = "object"
            bind = { binding = "static" }

            [[contracts.IThing.members]]
            name = "Walk"
            kind = "method"
            returns = "i32"
            bind = { binding = "static", owner = "demo::Nowhere" }
        "#,
        );

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.severity.is_error()));
        assert!(diagnostics[0].message.contains("names no owner"));
        assert_eq!(diagnostics[1].message, "static owner 'demo::Nowhere' not found");
        assert_eq!(diagnostics[1].location.as_deref(), Some("IThing.Walk"));
    }
}
