//! Invokers for slots bound to source members.

use std::sync::Arc;

use mimic_core::{Error, Invocation, Result, TypeRef, Value};
use mimic_ir::{Coercion, HookPlacement, MemberPlan};

use crate::{
    CallEnv, Hook, HookCall,
    pipeline::SynthesisRequest,
    resolve::{FlatMember, SourceCall},
};

struct BoundArg {
    coercion: Coercion,
    hook: Option<(Arc<dyn Hook>, HookPlacement)>,
}

/// Generic parameters on both sides of a call.
struct Generics {
    /// The contract method's parameters, bound by the caller's type arguments.
    contract: Vec<String>,
    /// Whether each contract parameter appears in the declared return type.
    in_return: Vec<bool>,
    /// The source method's parameters, in the same positions.
    source: Vec<String>,
}

/// A source member call with its argument and return coercions.
pub(super) struct BoundCall {
    adapter: String,
    member: String,
    call: SourceCall,
    args: Vec<BoundArg>,
    returns: Coercion,
    return_hook: Option<Arc<dyn Hook>>,
    generics: Generics,
    discard: bool,
}

impl BoundCall {
    pub(super) fn new(
        request: &SynthesisRequest<'_>,
        adapter: &str,
        flat: &FlatMember,
        plan: &MemberPlan,
        call: SourceCall,
        source_generics: &[String],
    ) -> Result<Self> {
        let hook = |name: &str| {
            request.hooks.get(name).cloned().ok_or_else(|| {
                Error::generation(adapter, format!("hook '{}' is not registered", name))
            })
        };

        let args = plan
            .args
            .iter()
            .map(|arg| {
                Ok(BoundArg {
                    coercion: arg.coercion.clone(),
                    hook: match &arg.hook {
                        Some(placed) => Some((hook(&placed.name)?, placed.placement)),
                        None => None,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let return_hook = plan.return_hook.as_deref().map(hook).transpose()?;

        let member = &flat.member;
        let contract_generics = member.generics().to_vec();
        let in_return = contract_generics
            .iter()
            .map(|g| member.value_type().mentions_generic(g))
            .collect();

        Ok(Self {
            adapter: adapter.to_string(),
            member: member.name.clone(),
            call,
            args,
            returns: plan.returns.clone(),
            return_hook,
            generics: Generics {
                contract: contract_generics,
                in_return,
                source: source_generics.to_vec(),
            },
            discard: false,
        })
    }

    /// Drop the source's result and return `Null`.
    pub(super) fn discarding(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }

    pub(super) fn invoke(&self, env: &CallEnv, inv: &Invocation) -> Result<Value> {
        if inv.args.len() != self.args.len() {
            return Err(Error::argument(
                "args",
                format!(
                    "'{}' expects {} argument(s), got {}",
                    self.member,
                    self.args.len(),
                    inv.args.len()
                ),
            ));
        }

        let (caller, source_type_args) = self.type_bindings(env, &inv.type_args)?;
        let source_bindings: Vec<(String, TypeRef)> = self
            .generics
            .source
            .iter()
            .cloned()
            .zip(source_type_args.iter().cloned())
            .collect();

        let mut args = Vec::with_capacity(inv.args.len());
        for (value, arg) in inv.args.iter().zip(&self.args) {
            let mut value = value.clone();
            if let Some((hook, HookPlacement::Before)) = &arg.hook {
                value = self.run_hook(hook.as_ref(), env, value, &inv.args)?;
            }
            value = env.convert(value, &arg.coercion, &source_bindings)?;
            if let Some((hook, HookPlacement::After)) = &arg.hook {
                value = self.run_hook(hook.as_ref(), env, value, &inv.args)?;
            }
            args.push(value);
        }

        let mut result = self.call.invoke(env.source(), args, source_type_args)?;
        if self.discard {
            return Ok(Value::Null);
        }
        if let Some(hook) = &self.return_hook {
            result = self.run_hook(hook.as_ref(), env, result, &inv.args)?;
        }
        env.convert(result, &self.returns, &caller)
    }

    fn run_hook(&self, hook: &dyn Hook, env: &CallEnv, value: Value, args: &[Value]) -> Result<Value> {
        hook.call(HookCall {
            member: &self.member,
            source: env.source(),
            services: env.services(),
            value,
            args,
        })
    }

    /// Bind the caller's type arguments to the contract's generic parameters
    /// and derive the source method's type arguments from them.
    ///
    /// A type argument naming a contract stands for that contract's adapted
    /// type when the parameter appears in the return type: the source works
    /// with concrete objects and the result is adapted back.
    fn type_bindings(
        &self,
        env: &CallEnv,
        type_args: &[TypeRef],
    ) -> Result<(Vec<(String, TypeRef)>, Vec<TypeRef>)> {
        let contract = &self.generics.contract;
        if contract.is_empty() {
            if type_args.is_empty() {
                return Ok((Vec::new(), Vec::new()));
            }
            return Err(Error::argument(
                "type_args",
                format!("'{}' is not generic", self.member),
            ));
        }
        if type_args.len() != contract.len() {
            return Err(Error::argument(
                "type_args",
                format!(
                    "'{}' expects {} type argument(s), got {}",
                    self.member,
                    contract.len(),
                    type_args.len()
                ),
            ));
        }

        let caller = contract.iter().cloned().zip(type_args.iter().cloned()).collect();
        let source = type_args
            .iter()
            .zip(&self.generics.in_return)
            .map(|(ty, in_return)| {
                if *in_return {
                    self.source_type_arg(env, ty)
                } else {
                    Ok(ty.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((caller, source))
    }

    fn source_type_arg(&self, env: &CallEnv, ty: &TypeRef) -> Result<TypeRef> {
        if let TypeRef::Array(element) = ty {
            return Ok(TypeRef::array(self.source_type_arg(env, element)?));
        }
        match env.registry().contract_of(ty) {
            Some(contract) => contract
                .adapts
                .as_ref()
                .map(TypeRef::named)
                .ok_or_else(|| {
                    Error::generation(
                        &self.adapter,
                        format!(
                            "ambiguous generic adapter target: contract '{}' declares no 'adapts' type",
                            contract.name
                        ),
                    )
                }),
            None => Ok(ty.clone()),
        }
    }
}
