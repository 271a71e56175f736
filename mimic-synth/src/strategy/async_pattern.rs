//! Bridges `Begin*`/`End*` callback pairs to promise-returning members.

use std::sync::Arc;

use mimic_core::{
    Callback, Error, Invocation, MethodInfo, Promise, Result, TypeInfo, TypeRef, Value,
    strip_async_suffix, to_pascal_case,
};
use mimic_manifest::ContractMember;
use parking_lot::Mutex;
use tracing::trace;

use super::{Strategy, StrategyRequest};
use crate::{CallEnv, Invoker, Planner};

/// Most arguments a bridged member may take, besides callback and state.
const MAX_ARGS: usize = 3;

/// Implements `OperationAsync(args) -> future<T>` over a source exposing
/// `BeginOperation(args, callback, state)` and `EndOperation(handle) -> T`.
///
/// The returned promise settles when the source invokes the callback; `End`
/// runs exactly once, from inside the callback.
pub struct AsyncPatternStrategy;

/// `FetchAsync` and `fetchAsync` both name the `Fetch` operation.
fn operation(member: &str) -> Option<String> {
    strip_async_suffix(member).map(to_pascal_case)
}

fn begin_of<'a>(source: &'a TypeInfo, op: &str, arity: usize) -> Option<&'a MethodInfo> {
    let name = format!("Begin{}", op);
    source
        .methods
        .iter()
        .find(|m| m.name == name && !m.is_static && m.arity() == arity + 2)
}

fn end_of<'a>(source: &'a TypeInfo, op: &str) -> Option<&'a MethodInfo> {
    let name = format!("End{}", op);
    source
        .methods
        .iter()
        .find(|m| m.name == name && !m.is_static && m.arity() == 1)
}

impl Strategy for AsyncPatternStrategy {
    fn name(&self) -> &'static str {
        "async-pattern"
    }

    fn can_implement(&self, member: &ContractMember, source: &TypeInfo) -> bool {
        if !matches!(member.value_type(), TypeRef::Future(_)) {
            return false;
        }
        let Some(op) = operation(&member.name) else {
            return false;
        };
        let arity = member.arity();
        let begin = if arity > MAX_ARGS {
            // Claimed anyway so synthesis reports the argument limit.
            let name = format!("Begin{}", op);
            source.methods_named(&name).any(|m| !m.is_static)
        } else {
            begin_of(source, &op, arity).is_some()
        };
        begin && end_of(source, &op).is_some()
    }

    fn implement(&self, request: &StrategyRequest<'_>) -> Result<Invoker> {
        let member = request.member;
        let arity = member.arity();
        let fail = |reason: String| Error::generation(request.adapter, reason);

        if arity > MAX_ARGS {
            return Err(fail(format!(
                "'{}' takes {} arguments; asynchronous members support at most {}",
                member.name, arity, MAX_ARGS
            )));
        }

        let op = operation(&member.name)
            .ok_or_else(|| fail(format!("'{}' is not an asynchronous member", member.name)))?;
        let begin = begin_of(request.source, &op, arity).ok_or_else(|| {
            fail(format!(
                "'{}' has no 'Begin{}' taking {} argument(s) plus a callback and state",
                request.source.name, op, arity
            ))
        })?;
        let end = end_of(request.source, &op)
            .ok_or_else(|| fail(format!("'{}' has no 'End{}'", request.source.name, op)))?;
        let TypeRef::Future(output) = member.value_type() else {
            return Err(fail(format!("'{}' does not return a future", member.name)));
        };

        let planner = Planner::new(request.registry);
        let args = member
            .params()
            .iter()
            .zip(begin.call_params())
            .map(|(param, source)| {
                planner.plan_argument(&source.ty, &param.ty).ok_or_else(|| {
                    fail(format!(
                        "argument '{}' of '{}' cannot be passed as {}",
                        param.name, member.name, source.ty
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let returns = planner.plan_return(output, &end.returns).ok_or_else(|| {
            fail(format!(
                "return types do not match and cannot be adapted: '{}' resolves to {} but 'End{}' returns {}",
                member.name, output, op, end.returns
            ))
        })?;

        let begin = begin.invoke.clone();
        let end = end.invoke.clone();
        let name = member.name.clone();

        Ok(Arc::new(move |env: &CallEnv, inv: &Invocation| {
            if inv.args.len() != args.len() {
                return Err(Error::argument(
                    "args",
                    format!("'{}' expects {} argument(s), got {}", name, args.len(), inv.args.len()),
                ));
            }

            let mut call_args = inv
                .args
                .iter()
                .zip(&args)
                .map(|(value, coercion)| env.convert(value.clone(), coercion, &[]))
                .collect::<Result<Vec<_>>>()?;

            let (completer, promise) = Promise::pending();
            let completer = Mutex::new(Some(completer));
            let callback_env = env.clone();
            let end = end.clone();
            let returns = returns.clone();
            let callback = Callback::new(move |handle: Value| {
                // The source may call back more than once; only the first completes.
                let Some(completer) = completer.lock().take() else {
                    return;
                };
                let result = end(Some(&**callback_env.source()), &Invocation::new(vec![handle]))
                    .and_then(|value| callback_env.convert(value, &returns, &[]));
                completer.complete(result);
            });

            call_args.push(Value::Callback(callback));
            call_args.push(Value::Null);
            trace!(member = %name, "starting asynchronous operation");
            begin(Some(&**env.source()), &Invocation::new(call_args))?;

            Ok(Value::Promise(promise))
        }))
    }
}
