//! Emit phase - compiles bindings into the adapter type.

mod bound;
mod describe;

use std::sync::Arc;

use indexmap::IndexMap;
use mimic_core::{Error, Invocation, Result, Value};
use mimic_ir::{MemberPlan, SlotKind};
use tracing::debug;

use self::bound::BoundCall;
use crate::{
    AdapterType, CallEnv, Hook, HookCall, Invoker, Slot,
    pipeline::{Phase, SynthesisContext, SynthesisRequest},
    resolve::{Binding, FlatMember, ResolvedSlot},
    strategy::StrategyRequest,
};

/// Phase that builds one invoker per resolved slot and assembles the
/// [`AdapterType`].
pub struct EmitPhase;

impl Phase for EmitPhase {
    fn name(&self) -> &'static str {
        "emit"
    }

    fn description(&self) -> &'static str {
        "Compile slot bindings into an adapter type"
    }

    fn run(&self, ctx: &mut SynthesisContext<'_>) -> Result<()> {
        let request = ctx.request;
        let adapter = request.adapter_name();
        let mut slots = IndexMap::with_capacity(ctx.resolved.len());

        for resolved in &ctx.resolved {
            let flat = ctx.members.get(resolved.member).ok_or_else(|| {
                Error::generation(&adapter, format!("slot '{}' has no member", resolved.plan.slot))
            })?;
            let invoker = compile(&request, &adapter, flat, resolved)?;
            slots.insert(
                resolved.plan.slot.clone(),
                Slot {
                    plan: resolved.plan.clone(),
                    invoker,
                },
            );
        }

        debug!(adapter = %adapter, slots = slots.len(), "emitted adapter");
        let info = describe::describe(&adapter, &ctx.members, &slots);
        ctx.adapter = Some(AdapterType::new(
            request.key.clone(),
            Arc::clone(request.source),
            ctx.implemented.clone(),
            slots,
            info,
            ctx.diagnostics.clone(),
        ));
        Ok(())
    }
}

/// The slot produces nothing the caller sees.
fn discards(flat: &FlatMember, plan: &MemberPlan) -> bool {
    matches!(plan.slot.kind, SlotKind::Set | SlotKind::IndexSet) || flat.member.value_type().is_void()
}

fn compile(
    request: &SynthesisRequest<'_>,
    adapter: &str,
    flat: &FlatMember,
    resolved: &ResolvedSlot,
) -> Result<Invoker> {
    let plan = &resolved.plan;
    match &resolved.binding {
        Binding::Unresolved => {
            let adapter = adapter.to_string();
            let member = flat.member.name.clone();
            Ok(Arc::new(move |_: &CallEnv, _: &Invocation| {
                Err(Error::not_implemented(&adapter, &member))
            }))
        }
        Binding::Strategy(strategy) => strategy.implement(&StrategyRequest {
            adapter,
            member: &flat.member,
            slot: &plan.slot,
            source: request.source,
            registry: request.registry,
        }),
        Binding::Hook(hook) => Ok(execute(
            Arc::clone(hook),
            flat.member.name.clone(),
            plan,
            discards(flat, plan),
        )),
        Binding::Source { call, generics } => {
            let bound = BoundCall::new(request, adapter, flat, plan, call.clone(), generics)?
                .discarding(discards(flat, plan));
            Ok(Arc::new(move |env: &CallEnv, inv: &Invocation| bound.invoke(env, inv)))
        }
    }
}

/// Invoker for a member executed entirely by a hook.
fn execute(hook: Arc<dyn Hook>, member: String, plan: &MemberPlan, discard: bool) -> Invoker {
    let returns = plan.returns.clone();
    Arc::new(move |env: &CallEnv, inv: &Invocation| {
        let value = hook.call(HookCall {
            member: &member,
            source: env.source(),
            services: env.services(),
            value: Value::Null,
            args: &inv.args,
        })?;
        if discard {
            return Ok(Value::Null);
        }
        env.convert(value, &returns, &[])
    })
}
