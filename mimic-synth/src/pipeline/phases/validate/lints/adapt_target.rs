//! Lint for `adapt_as` targets.

use mimic_core::TypeRef;
use mimic_manifest::ContractMember;

use super::super::Lint;
use crate::{
    TypeRegistry,
    pipeline::{Diagnostic, SynthesisRequest, phases::contract_closure},
};

/// Lint that errors when a member's `adapt_as` names no registered contract,
/// or is applied to a member whose result cannot be adapted.
pub struct AdaptTargetLint;

impl Lint for AdaptTargetLint {
    fn name(&self) -> &'static str {
        "adapt-target"
    }

    fn description(&self) -> &'static str {
        "Check adapt_as directives name registered contracts"
    }

    fn check(&self, request: &SynthesisRequest<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for contract in contract_closure(request.registry, &request.key.contracts) {
            for member in &contract.members {
                let Some(target) = member.adapt_as.as_deref() else {
                    continue;
                };
                let location = format!("{}.{}", contract.name, member.name);

                if !request.registry.is_contract(target) {
                    diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!("adapt_as target '{}' is not a registered contract", target),
                        )
                        .at(location),
                    );
                } else if !returns_object(request.registry, member) {
                    diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "'{}' returns {} which cannot be adapted to '{}'",
                                location,
                                member.value_type(),
                                target
                            ),
                        )
                        .at(location),
                    );
                }
            }
        }
    }
}

/// The member's declared result is an object, or an array of objects.
fn returns_object(registry: &TypeRegistry, member: &ContractMember) -> bool {
    let ty = member.value_type();
    let ty = ty.element().unwrap_or(ty);
    match ty.name() {
        Some(name) => !registry.is_enum(name),
        None => *ty == TypeRef::Object,
    }
}

#[cfg(test)]
mod tests {
    use mimic_core::TypeInfo;
    use mimic_ir::SynthesisKey;
    use mimic_manifest::Manifest;

    use super::*;
    use crate::HookRegistry;

    fn check(manifest: &str) -> Vec<Diagnostic> {
        let manifest: Manifest = manifest.parse().expect("Failed to parse test manifest");
        let mut registry = TypeRegistry::new();
        registry.load(manifest);

        let hooks = HookRegistry::new();
        let key = SynthesisKey::new("demo::Parent", ["IParent"]);
        let source = TypeInfo::builder("demo::Parent").build();
        let request = SynthesisRequest {
            key: &key,
            source: &source,
            registry: &registry,
            hooks: &hooks,
            strategies: &[],
        };

        let mut diagnostics = Vec::new();
        AdaptTargetLint.check(&request, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_valid_target() {
        let diagnostics = check(
            r#"
            [contracts.IChild]

            [contracts.IParent]

            [[contracts.IParent.members]]
            name = "Children"
            kind = "property"
            type = "object[]"
            adapt_as = "IChild"
        "#,
        );

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_scalar_result() {
        let diagnostics = check(
            r#"
            [contracts.IChild]

            [contracts.IParent]

            [[contracts.IParent.members]]
            name = "Count"
            kind = "property"
            type = "i32"
            adapt_as = "IChild"
        "#,
        );

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_error());
        assert!(diagnostics[0].message.contains("cannot be adapted"));
    }
}
