//! Name-based access to duck-typed objects.

use std::sync::Arc;

use mimic_core::{DynamicMembers, Error, IndexCall, Invocation, Result, TypeInfo, Value};
use mimic_ir::SlotKind;
use mimic_manifest::{ContractMember, MemberKind};

use super::{Strategy, StrategyRequest};
use crate::{CallEnv, Invoker, convert};

/// Implements properties and indexers of sources flagged dynamic through
/// their [`DynamicMembers`] implementation.
///
/// Failed gets produce `Null` and failed sets are ignored. Results are
/// converted toward the contract's declared type at call time.
pub struct DynamicMembersStrategy;

fn members(env: &CallEnv) -> Result<&dyn DynamicMembers> {
    env.source().as_dynamic().ok_or_else(|| {
        Error::invalid_operation(format!(
            "'{}' is flagged dynamic but does not expose dynamic members",
            env.source().type_info().name
        ))
    })
}

impl Strategy for DynamicMembersStrategy {
    fn name(&self) -> &'static str {
        "dynamic-members"
    }

    fn can_implement(&self, member: &ContractMember, source: &TypeInfo) -> bool {
        source.dynamic && !matches!(member.kind, MemberKind::Method { .. })
    }

    fn implement(&self, request: &StrategyRequest<'_>) -> Result<Invoker> {
        let member = request.member;
        let name = member.name.clone();
        let ty = member.value_type().clone();
        let names: Vec<String> = member.params().iter().map(|p| p.name.clone()).collect();

        let invoker: Invoker = match request.slot.kind {
            SlotKind::Get => Arc::new(move |env: &CallEnv, _: &Invocation| {
                let value = members(env)?.try_get_member(&name).unwrap_or_default();
                convert::dynamic(env, value, &ty)
            }),
            SlotKind::Set => Arc::new(move |env: &CallEnv, inv: &Invocation| {
                let value = inv.arg(0)?.clone();
                members(env)?.try_set_member(&name, value);
                Ok(Value::Null)
            }),
            SlotKind::IndexGet => Arc::new(move |env: &CallEnv, inv: &Invocation| {
                let call = IndexCall {
                    args: inv.args.clone(),
                    names: names.clone(),
                };
                let value = members(env)?.try_get_index(&call).unwrap_or_default();
                convert::dynamic(env, value, &ty)
            }),
            SlotKind::IndexSet => Arc::new(move |env: &CallEnv, inv: &Invocation| {
                let Some((value, indices)) = inv.args.split_last() else {
                    return Err(Error::argument("value", "indexer assignment needs a value"));
                };
                let call = IndexCall {
                    args: indices.to_vec(),
                    names: names.clone(),
                };
                members(env)?.try_set_index(&call, value.clone());
                Ok(Value::Null)
            }),
            SlotKind::Call => {
                return Err(Error::generation(
                    request.adapter,
                    format!("dynamic members cannot implement method '{}'", member.name),
                ));
            }
        };

        Ok(invoker)
    }
}

#[cfg(test)]
mod tests {
    use mimic_core::TypeRef;
    use mimic_manifest::{Access, Param};

    use super::*;

    #[test]
    fn test_claims_properties_and_indexers_of_dynamic_sources() {
        let dynamic = TypeInfo::builder("demo::Bag").dynamic().build();
        let fixed = TypeInfo::builder("demo::Fixed").build();

        let property = ContractMember::property("Name", TypeRef::String, Access::GetSet);
        let indexer = ContractMember::indexer(
            vec![Param::new("key", TypeRef::String)],
            TypeRef::Object,
            Access::Get,
        );
        let method = ContractMember::method("Run", Vec::new(), TypeRef::Void);

        assert!(DynamicMembersStrategy.can_implement(&property, &dynamic));
        assert!(DynamicMembersStrategy.can_implement(&indexer, &dynamic));
        assert!(!DynamicMembersStrategy.can_implement(&method, &dynamic));
        assert!(!DynamicMembersStrategy.can_implement(&property, &fixed));
    }
}
