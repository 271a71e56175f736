//! Flatten phase - collects members across inherited contracts.

use std::collections::HashSet;

use mimic_core::{Error, Result};
use mimic_ir::{SlotKey, SlotKind};
use mimic_manifest::{BindingDirective, ContractDescriptor, ContractMember, TargetKind};
use serde::Serialize;

use crate::{
    TypeRegistry,
    pipeline::{Phase, SynthesisContext},
    resolve::FlatMember,
};

/// Phase that flattens the requested contracts and their ancestors into one
/// member list.
///
/// Contracts are visited depth first: a contract's own members come before
/// those of the contracts it extends. The first member to declare a slot owns
/// it; a member is dropped only when every slot it declares is already owned.
pub struct FlattenPhase;

impl Phase for FlattenPhase {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn description(&self) -> &'static str {
        "Collect members across the contract inheritance graph"
    }

    fn run(&self, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        let closure = Closure::walk(ctx.request.registry, &ctx.request.key.contracts);
        if let Some(missing) = closure.missing.first() {
            return Err(Error::generation(
                ctx.request.adapter_name(),
                format!("contract '{}' is not registered", missing),
            ));
        }

        ctx.implemented = closure.contracts.iter().map(|c| c.name.clone()).collect();
        ctx.members = flatten(&closure.contracts);
        Ok(())
    }
}

/// Contracts reachable from a root set, in visiting order.
struct Closure<'r> {
    contracts: Vec<&'r ContractDescriptor>,
    missing: Vec<String>,
}

impl<'r> Closure<'r> {
    fn walk(registry: &'r TypeRegistry, roots: &[String]) -> Self {
        let mut closure = Self {
            contracts: Vec::new(),
            missing: Vec::new(),
        };
        let mut visited = HashSet::new();
        for root in roots {
            closure.visit(registry, root, &mut visited);
        }
        closure
    }

    fn visit(&mut self, registry: &'r TypeRegistry, name: &str, visited: &mut HashSet<String>) {
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some(contract) = registry.contract(name) else {
            self.missing.push(name.to_string());
            return;
        };

        self.contracts.push(contract);
        for parent in &contract.extends {
            self.visit(registry, parent, visited);
        }
    }
}

/// Registered contracts reachable from `roots`; unknown names are skipped.
pub(crate) fn contract_closure<'r>(
    registry: &'r TypeRegistry,
    roots: &[String],
) -> Vec<&'r ContractDescriptor> {
    Closure::walk(registry, roots).contracts
}

fn flatten(contracts: &[&ContractDescriptor]) -> Vec<FlatMember> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();

    for contract in contracts {
        for member in &contract.members {
            let flat = FlatMember {
                contract: contract.name.clone(),
                adapts: contract.adapts.clone(),
                member: member.clone(),
            };
            let mut fresh = false;
            for slot in flat.slots() {
                fresh |= seen.insert(slot);
            }
            if fresh {
                members.push(flat);
            }
        }
    }

    members
}

/// One slot of a contract set, as declared (before any source is known).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotOutline {
    pub slot: SlotKey,
    /// The contract that declared the member.
    pub contract: String,
    pub signature: String,
    /// The member's binding or extension directive, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<String>,
}

/// Outline the slots an adapter for `contracts` will have.
///
/// # Errors
///
/// Returns `Argument` if a contract (or one it extends) is not registered.
pub fn outline(registry: &TypeRegistry, contracts: &[&str]) -> Result<Vec<SlotOutline>> {
    let roots: Vec<String> = contracts.iter().map(|c| c.to_string()).collect();
    let closure = Closure::walk(registry, &roots);
    if let Some(missing) = closure.missing.first() {
        return Err(Error::argument(
            "contracts",
            format!("contract '{}' is not registered", missing),
        ));
    }

    let mut seen = HashSet::new();
    Ok(flatten(&closure.contracts)
        .iter()
        .flat_map(|flat| flat.slots().into_iter().map(move |slot| (flat, slot)))
        .filter(|(_, slot)| seen.insert(slot.clone()))
        .map(|(flat, slot)| SlotOutline {
            signature: signature(&flat.member, &slot),
            contract: flat.contract.clone(),
            directive: directive(&flat.member),
            hooks: flat.member.hooks().map(str::to_string).collect(),
            slot,
        })
        .collect())
}

fn signature(member: &ContractMember, slot: &SlotKey) -> String {
    let params = member
        .params()
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ");
    let value = member.value_type();
    let generics = if member.generics().is_empty() {
        String::new()
    } else {
        format!("<{}>", member.generics().join(", "))
    };

    match slot.kind {
        SlotKind::Get => format!("{}: {}", member.name, value),
        SlotKind::Set => format!("{} = {}", member.name, value),
        SlotKind::Call => format!("{}{}({}) -> {}", member.name, generics, params, value),
        SlotKind::IndexGet => format!("[{}] -> {}", params, value),
        SlotKind::IndexSet => format!("[{}] = {}", params, value),
    }
}

fn directive(member: &ContractMember) -> Option<String> {
    if let Some(hook) = &member.extension {
        return Some(format!("extension {}", hook));
    }
    let mut text = member.binding.as_ref().map(describe_binding)?;
    if let Some(contract) = &member.adapt_as {
        text.push_str(&format!(" as {}", contract));
    }
    Some(text)
}

fn describe_binding(binding: &BindingDirective) -> String {
    let mut text = if binding.is_static() {
        "static".to_string()
    } else {
        "instance".to_string()
    };
    if let Some(owner) = &binding.owner {
        text.push_str(&format!(" on {}", owner));
    }
    if let Some(target) = &binding.target {
        text.push_str(&format!(" -> {}", target));
    }
    match binding.kind {
        Some(TargetKind::Property) => text.push_str(" (property)"),
        Some(TargetKind::Method) => text.push_str(" (method)"),
        None => {}
    }
    text
}
