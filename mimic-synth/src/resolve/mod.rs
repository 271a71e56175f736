//! Binding resolution for individual slots.
//!
//! Each slot of a flattened contract member is bound, in order, to:
//!
//! 1. the first registered strategy that claims the member
//! 2. the hook named by the member's `extension`
//! 3. the source member its binding directive names
//! 4. a source member with the same name and a compatible signature
//! 5. a public field, for property accessors
//!
//! and is left unresolved otherwise. Unresolved slots still synthesize and
//! fail with `NotImplemented` when called.

mod call;
mod candidate;

use std::sync::Arc;

use mimic_core::{Accessor, Error, Result, TypeInfo, TypeRef, accessor_name, split_accessor};
use mimic_ir::{
    ArgPlan, BindingTarget, CallShape, Coercion, HookPlacement, HookPlan, MemberPlan, SlotKey,
    SlotKind,
};
use mimic_manifest::{
    Access, BindingDirective, ContractMember, ExtensionDirective, MemberKind, Param, Placement,
    TargetKind,
};

pub(crate) use call::SourceCall;
use candidate::Candidate;

use crate::{Hook, Planner, pipeline::SynthesisRequest, strategy::Strategy};

/// A contract member together with the contract that declared it.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatMember {
    pub contract: String,
    /// The declaring contract's `adapts` type.
    pub adapts: Option<String>,
    pub member: ContractMember,
}

impl FlatMember {
    /// "Contract.Member", for diagnostics.
    pub fn location(&self) -> String {
        format!("{}.{}", self.contract, self.member.name)
    }

    /// The dispatch slots this member occupies.
    pub fn slots(&self) -> Vec<SlotKey> {
        let name = &self.member.name;
        match &self.member.kind {
            MemberKind::Property { access, .. } => accessor_slots(*access, || {
                (SlotKey::get(name.as_str()), SlotKey::set(name.as_str()))
            }),
            MemberKind::Method { params, .. } => vec![SlotKey::call(name.as_str(), params.len())],
            MemberKind::Indexer { params, access, .. } => accessor_slots(*access, || {
                (SlotKey::index_get(params.len()), SlotKey::index_set(params.len()))
            }),
        }
    }
}

fn accessor_slots(access: Access, keys: impl FnOnce() -> (SlotKey, SlotKey)) -> Vec<SlotKey> {
    let (get, set) = keys();
    let mut slots = Vec::with_capacity(2);
    if access.can_get() {
        slots.push(get);
    }
    if access.can_set() {
        slots.push(set);
    }
    slots
}

/// The binding decided for one slot.
pub struct ResolvedSlot {
    pub plan: MemberPlan,
    /// Index into the flattened members.
    pub member: usize,
    pub(crate) binding: Binding,
}

/// What a slot's invoker will call.
#[derive(Clone)]
pub(crate) enum Binding {
    Source {
        call: SourceCall,
        /// Generic parameters of the bound source method.
        generics: Vec<String>,
    },
    Strategy(Arc<dyn Strategy>),
    Hook(Arc<dyn Hook>),
    Unresolved,
}

struct Resolution {
    target: BindingTarget,
    args: Vec<ArgPlan>,
    returns: Coercion,
    return_hook: Option<String>,
    binding: Binding,
}

impl Resolution {
    fn unresolved(reason: impl Into<String>) -> Self {
        Self {
            target: BindingTarget::Unresolved {
                reason: reason.into(),
            },
            args: Vec::new(),
            returns: Coercion::None,
            return_hook: None,
            binding: Binding::Unresolved,
        }
    }

    /// Arguments pass through untouched; the strategy or hook handles them.
    fn passthrough(target: BindingTarget, sig: &SlotSig<'_>, returns: Coercion, binding: Binding) -> Self {
        Self {
            target,
            args: sig
                .params
                .iter()
                .map(|p| ArgPlan {
                    name: p.name.to_string(),
                    coercion: Coercion::None,
                    hook: None,
                })
                .collect(),
            returns,
            return_hook: None,
            binding,
        }
    }
}

/// The contract-facing signature of one slot.
struct SlotSig<'m> {
    params: Vec<SigParam<'m>>,
    returns: TypeRef,
}

struct SigParam<'m> {
    name: &'m str,
    ty: &'m TypeRef,
    extension: Option<&'m ExtensionDirective>,
}

impl<'m> SlotSig<'m> {
    fn new(member: &'m ContractMember, slot: &SlotKey) -> Self {
        let declared = |p: &'m Param| SigParam {
            name: &p.name,
            ty: &p.ty,
            extension: p.extension.as_ref(),
        };
        let assigned = SigParam {
            name: "value",
            ty: member.value_type(),
            extension: None,
        };

        match slot.kind {
            SlotKind::Get => Self {
                params: Vec::new(),
                returns: produced_type(member),
            },
            SlotKind::Set => Self {
                params: vec![assigned],
                returns: TypeRef::Void,
            },
            SlotKind::Call | SlotKind::IndexGet => Self {
                params: member.params().iter().map(declared).collect(),
                returns: produced_type(member),
            },
            SlotKind::IndexSet => Self {
                params: member
                    .params()
                    .iter()
                    .map(declared)
                    .chain(std::iter::once(assigned))
                    .collect(),
                returns: TypeRef::Void,
            },
        }
    }
}

/// The member's result type, with `adapt_as` applied.
pub(crate) fn produced_type(member: &ContractMember) -> TypeRef {
    let declared = member.value_type();
    match &member.adapt_as {
        Some(contract) if declared.element().is_some() => TypeRef::array(TypeRef::named(contract)),
        Some(contract) => TypeRef::named(contract),
        None => declared.clone(),
    }
}

fn placement(placement: Placement) -> HookPlacement {
    match placement {
        Placement::Before => HookPlacement::Before,
        Placement::After => HookPlacement::After,
    }
}

/// Binds slots for one synthesis request.
pub(crate) struct Resolver<'a> {
    request: SynthesisRequest<'a>,
    planner: Planner<'a>,
    adapter: String,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(request: SynthesisRequest<'a>) -> Self {
        Self {
            planner: Planner::new(request.registry),
            adapter: request.adapter_name(),
            request,
        }
    }

    /// Bind one slot of the flattened member at `index`.
    ///
    /// # Errors
    ///
    /// Fails synthesis when a binding is found but cannot be adapted: a
    /// static owner that does not exist, an incompatible return type or an
    /// extension method whose receiver does not accept the source.
    pub(crate) fn resolve(
        &self,
        index: usize,
        flat: &FlatMember,
        slot: SlotKey,
    ) -> Result<ResolvedSlot> {
        let resolution = self.resolution(flat, &slot)?;
        Ok(ResolvedSlot {
            plan: MemberPlan {
                slot,
                contract: flat.contract.clone(),
                target: resolution.target,
                args: resolution.args,
                returns: resolution.returns,
                return_hook: resolution.return_hook,
            },
            member: index,
            binding: resolution.binding,
        })
    }

    fn resolution(&self, flat: &FlatMember, slot: &SlotKey) -> Result<Resolution> {
        let member = &flat.member;
        let sig = SlotSig::new(member, slot);

        if let Some(strategy) = self
            .request
            .strategies
            .iter()
            .find(|s| s.can_implement(member, self.request.source))
        {
            return Ok(Resolution::passthrough(
                BindingTarget::Strategy {
                    name: strategy.name().to_string(),
                },
                &sig,
                Coercion::None,
                Binding::Strategy(Arc::clone(strategy)),
            ));
        }

        if let Some(hook) = member.hooks().find(|h| !self.request.hooks.contains(h)) {
            return Ok(Resolution::unresolved(format!(
                "hook '{}' is not registered",
                hook
            )));
        }

        if let Some(name) = &member.extension {
            return self.execution_hook(flat, name, &sig);
        }

        match &member.binding {
            Some(directive) if directive.is_static() => {
                self.static_binding(flat, slot, &sig, directive)
            }
            Some(directive) => self.instance_binding(flat, slot, &sig, directive),
            None => self.default_binding(flat, slot, &sig),
        }
    }

    fn hook(&self, name: &str) -> Option<&Arc<dyn Hook>> {
        self.request.hooks.get(name)
    }

    fn execution_hook(&self, flat: &FlatMember, name: &str, sig: &SlotSig<'_>) -> Result<Resolution> {
        let Some(hook) = self.hook(name) else {
            return Ok(Resolution::unresolved(format!("hook '{}' is not registered", name)));
        };

        let returns = match hook.output_type() {
            _ if sig.returns.is_void() => Coercion::None,
            Some(output) => self
                .planner
                .plan_return(&sig.returns, output)
                .ok_or_else(|| self.mismatch(flat, &sig.returns, output))?,
            None => Coercion::Dynamic {
                target: sig.returns.clone(),
            },
        };

        Ok(Resolution::passthrough(
            BindingTarget::Hook {
                name: name.to_string(),
            },
            sig,
            returns,
            Binding::Hook(Arc::clone(hook)),
        ))
    }

    fn default_binding(&self, flat: &FlatMember, slot: &SlotKey, sig: &SlotSig<'_>) -> Result<Resolution> {
        let source = self.request.source.as_ref();
        let name = flat.member.name.as_str();

        let instance = self.candidates(source, slot, name, None, CallShape::Instance);
        if let Some(resolution) = self.first_match(flat, sig, instance)? {
            return Ok(resolution);
        }

        if flat.adapts.as_deref() == Some(source.name.as_str()) {
            let statics = self.candidates(source, slot, name, None, CallShape::Static);
            if let Some(resolution) = self.first_match(flat, sig, statics)? {
                return Ok(resolution);
            }
        }

        if let Some(resolution) = self.first_match(flat, sig, fields(source, slot, name))? {
            return Ok(resolution);
        }

        Ok(Resolution::unresolved(format!(
            "'{}' has no member matching '{}'",
            source.name, slot
        )))
    }

    fn instance_binding(
        &self,
        flat: &FlatMember,
        slot: &SlotKey,
        sig: &SlotSig<'_>,
        directive: &BindingDirective,
    ) -> Result<Resolution> {
        let source = self.request.source.as_ref();
        let target = directive.target_or(&flat.member.name);

        let candidates = self.directed(source, slot, &flat.member, directive, CallShape::Instance);
        if let Some(resolution) = self.first_match(flat, sig, candidates)? {
            return Ok(resolution);
        }

        if !matches!(directive.kind, Some(TargetKind::Method)) {
            if let Some(resolution) = self.first_match(flat, sig, fields(source, slot, target))? {
                return Ok(resolution);
            }
        }

        Ok(Resolution::unresolved(format!(
            "'{}' has no member '{}' matching '{}'",
            source.name, target, slot
        )))
    }

    fn static_binding(
        &self,
        flat: &FlatMember,
        slot: &SlotKey,
        sig: &SlotSig<'_>,
        directive: &BindingDirective,
    ) -> Result<Resolution> {
        let source = self.request.source.as_ref();
        let owner_name = directive
            .owner
            .as_deref()
            .or(flat.adapts.as_deref())
            .ok_or_else(|| {
                Error::generation(
                    &self.adapter,
                    format!("static binding of '{}' names no owner type", flat.location()),
                )
            })?;
        let owner: &TypeInfo = if owner_name == source.name {
            source
        } else {
            self.request
                .registry
                .type_info(owner_name)
                .map(|info| info.as_ref())
                .ok_or_else(|| {
                    Error::generation(
                        &self.adapter,
                        format!("static owner '{}' not found", owner_name),
                    )
                })?
        };

        let statics = self.directed(owner, slot, &flat.member, directive, CallShape::Static);
        if let Some(resolution) = self.first_match(flat, sig, statics)? {
            return Ok(resolution);
        }

        if let Some((name, arity)) = extension_name(slot, directive, &flat.member) {
            if let Some(candidate) = self.extension(owner, &name, arity)? {
                if let Some(resolution) = self.bind(flat, sig, candidate)? {
                    return Ok(resolution);
                }
            }
        }

        Ok(Resolution::unresolved(format!(
            "'{}' has no static or extension member '{}' matching '{}'",
            owner.name,
            directive.target_or(&flat.member.name),
            slot
        )))
    }

    /// The first extension overload whose receiver accepts the source.
    fn extension(&self, owner: &TypeInfo, name: &str, arity: usize) -> Result<Option<Candidate>> {
        let source = self.request.source.as_ref();
        let mut overloads = owner
            .methods_named(name)
            .filter(|m| m.is_extension && m.arity() == arity)
            .peekable();

        if overloads.peek().is_none() {
            return Ok(None);
        }

        overloads
            .find(|m| {
                m.receiver().is_some_and(|recv| {
                    recv.ty == TypeRef::Object || recv.ty.name() == Some(source.name.as_str())
                })
            })
            .map(|m| Some(candidate::method(owner, m, CallShape::Extension)))
            .ok_or_else(|| {
                Error::invalid_operation(format!(
                    "extension method '{}.{}' does not accept '{}' as its receiver",
                    owner.name, name, source.name
                ))
            })
    }

    /// Candidates for a slot bound through a directive, honoring its target
    /// name and kind override.
    fn directed(
        &self,
        owner: &TypeInfo,
        slot: &SlotKey,
        member: &ContractMember,
        directive: &BindingDirective,
        shape: CallShape,
    ) -> Vec<Candidate> {
        let target = directive.target_or(&member.name);

        if slot.kind == SlotKind::Call && directive.kind == Some(TargetKind::Property) {
            let mapped = match split_accessor(&member.name) {
                Some((accessor, rest)) => Some((accessor, directive.target.as_deref().unwrap_or(rest))),
                None => match slot.arity {
                    0 => Some((Accessor::Get, target)),
                    1 => Some((Accessor::Set, target)),
                    _ => None,
                },
            };
            return mapped
                .and_then(|(accessor, property)| candidate::property(owner, property, accessor, shape))
                .into_iter()
                .collect();
        }

        self.candidates(owner, slot, target, directive.kind, shape)
    }

    fn candidates(
        &self,
        owner: &TypeInfo,
        slot: &SlotKey,
        name: &str,
        kind: Option<TargetKind>,
        shape: CallShape,
    ) -> Vec<Candidate> {
        match (slot.kind, kind) {
            (SlotKind::Get, Some(TargetKind::Method)) => {
                candidate::methods(owner, &accessor_name(Accessor::Get, name), 0, shape)
            }
            (SlotKind::Set, Some(TargetKind::Method)) => {
                candidate::methods(owner, &accessor_name(Accessor::Set, name), 1, shape)
            }
            (SlotKind::Get, _) => candidate::property(owner, name, Accessor::Get, shape)
                .into_iter()
                .collect(),
            (SlotKind::Set, _) => candidate::property(owner, name, Accessor::Set, shape)
                .into_iter()
                .collect(),
            (SlotKind::Call, _) => candidate::methods(owner, name, slot.arity, shape),
            (SlotKind::IndexGet, _) if shape == CallShape::Instance => {
                candidate::indexer(owner, slot.arity, Accessor::Get).into_iter().collect()
            }
            (SlotKind::IndexSet, _) if shape == CallShape::Instance => {
                candidate::indexer(owner, slot.arity, Accessor::Set).into_iter().collect()
            }
            (SlotKind::IndexGet | SlotKind::IndexSet, _) => Vec::new(),
        }
    }

    /// Bind to the first candidate whose arguments fit; overloads are tried
    /// in declaration order.
    fn first_match(
        &self,
        flat: &FlatMember,
        sig: &SlotSig<'_>,
        candidates: Vec<Candidate>,
    ) -> Result<Option<Resolution>> {
        for candidate in candidates {
            if let Some(resolution) = self.bind(flat, sig, candidate)? {
                return Ok(Some(resolution));
            }
        }
        Ok(None)
    }

    /// Plan the coercions between a slot and a candidate.
    ///
    /// Returns `None` if the arguments do not fit, and fails if they do but
    /// the result cannot be adapted.
    fn bind(&self, flat: &FlatMember, sig: &SlotSig<'_>, candidate: Candidate) -> Result<Option<Resolution>> {
        let member = &flat.member;
        if candidate.params.len() != sig.params.len()
            || candidate.generics.len() != member.generics().len()
        {
            return Ok(None);
        }

        let mut args = Vec::with_capacity(sig.params.len());
        for (param, source_ty) in sig.params.iter().zip(&candidate.params) {
            let coercion = match param.extension {
                Some(ext) if ext.placement == Placement::Before => {
                    match self.hook(&ext.hook).and_then(|h| h.output_type()) {
                        Some(output) => self.planner.plan_argument(source_ty, output),
                        None => Some(Coercion::Dynamic {
                            target: source_ty.clone(),
                        }),
                    }
                }
                _ => self.planner.plan_argument(source_ty, param.ty),
            };
            let Some(coercion) = coercion else {
                return Ok(None);
            };

            args.push(ArgPlan {
                name: param.name.to_string(),
                coercion,
                hook: param.extension.map(|ext| HookPlan {
                    name: ext.hook.clone(),
                    placement: placement(ext.placement),
                }),
            });
        }

        let return_hook = member.return_extension.clone();
        let produced = match return_hook.as_deref().and_then(|name| self.hook(name)) {
            Some(hook) => hook.output_type().cloned(),
            None => Some(candidate.returns.clone()),
        };
        let returns = match produced {
            _ if sig.returns.is_void() => Coercion::None,
            Some(from) => self
                .planner
                .plan_return(&sig.returns, &from)
                .ok_or_else(|| self.mismatch(flat, &sig.returns, &from))?,
            None => Coercion::Dynamic {
                target: sig.returns.clone(),
            },
        };

        Ok(Some(Resolution {
            target: candidate.target,
            args,
            returns,
            return_hook,
            binding: Binding::Source {
                call: candidate.call,
                generics: candidate.generics,
            },
        }))
    }

    fn mismatch(&self, flat: &FlatMember, contract: &TypeRef, source: &TypeRef) -> Error {
        Error::generation(
            &self.adapter,
            format!(
                "return types do not match and cannot be adapted: '{}' declares {} but the source produces {}",
                flat.location(),
                contract,
                source
            ),
        )
    }
}

fn fields(owner: &TypeInfo, slot: &SlotKey, name: &str) -> Vec<Candidate> {
    let accessor = match slot.kind {
        SlotKind::Get => Accessor::Get,
        SlotKind::Set => Accessor::Set,
        _ => return Vec::new(),
    };
    candidate::field(owner, name, accessor).into_iter().collect()
}

/// Name and arity of the extension method a static directive may fall back to.
fn extension_name(
    slot: &SlotKey,
    directive: &BindingDirective,
    member: &ContractMember,
) -> Option<(String, usize)> {
    let target = directive.target_or(&member.name);
    match (slot.kind, directive.kind) {
        (SlotKind::Call, _) => Some((target.to_string(), slot.arity)),
        (SlotKind::Get, Some(TargetKind::Method)) => Some((accessor_name(Accessor::Get, target), 0)),
        (SlotKind::Set, Some(TargetKind::Method)) => Some((accessor_name(Accessor::Set, target), 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use mimic_core::{IntWidth, Object, Value};
    use mimic_ir::SynthesisKey;
    use mimic_manifest::ContractDescriptor;

    use super::*;
    use crate::{FnHook, HookCall, HookRegistry, TypeRegistry};

    struct Parent;

    impl Object for Parent {
        fn type_info(&self) -> Arc<TypeInfo> {
            parent_type()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn parent_type() -> Arc<TypeInfo> {
        TypeInfo::builder("demo::Parent")
            .property("Child", TypeRef::named("demo::Child"), |_: &Parent| Ok(Value::Null))
            .property("Name", TypeRef::String, |_: &Parent| Ok("parent".into()))
            .method(
                "Add",
                &[("a", TypeRef::I64), ("b", TypeRef::I64)],
                TypeRef::I64,
                |_: &Parent, _| Ok(Value::Int(0)),
            )
            .method(
                "Add",
                &[("a", TypeRef::String), ("b", TypeRef::String)],
                TypeRef::String,
                |_: &Parent, _| Ok(Value::Null),
            )
            .build()
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register_contract(ContractDescriptor::new("IChild"));
        registry.register_type(
            TypeInfo::builder("demo::Helpers")
                .extension_method(
                    "Describe",
                    &[("child", TypeRef::named("demo::Child"))],
                    TypeRef::String,
                    |_| Ok(Value::Null),
                )
                .build(),
        );
        registry
    }

    fn resolve(member: ContractMember, hooks: &HookRegistry) -> Result<Vec<ResolvedSlot>> {
        let registry = registry();
        let source = parent_type();
        let key = SynthesisKey::new("demo::Parent", ["IParent"]);
        let resolver = Resolver::new(SynthesisRequest {
            key: &key,
            source: &source,
            registry: &registry,
            hooks,
            strategies: &[],
        });

        let flat = FlatMember {
            contract: "IParent".into(),
            adapts: Some("demo::Parent".into()),
            member,
        };
        flat.slots()
            .into_iter()
            .map(|slot| resolver.resolve(0, &flat, slot))
            .collect()
    }

    #[test]
    fn test_method_bound_to_property() {
        let member = ContractMember::method("GetChild", Vec::new(), TypeRef::named("IChild"))
            .with_binding(BindingDirective::default().as_property());
        let resolved = resolve(member, &HookRegistry::new()).unwrap();

        assert_eq!(resolved.len(), 1);
        let plan = &resolved[0].plan;
        assert_eq!(
            plan.target,
            BindingTarget::Property {
                owner: "demo::Parent".into(),
                name: "Child".into(),
                shape: CallShape::Instance,
            }
        );
        assert_eq!(
            plan.returns,
            Coercion::Adapt {
                contract: "IChild".into()
            }
        );
    }

    #[test]
    fn test_first_overload_wins() {
        let member = ContractMember::method(
            "Add",
            vec![Param::new("a", TypeRef::I32), Param::new("b", TypeRef::I32)],
            TypeRef::I64,
        );
        let resolved = resolve(member, &HookRegistry::new()).unwrap();

        let plan = &resolved[0].plan;
        assert!(matches!(plan.target, BindingTarget::Method { .. }));
        assert_eq!(
            plan.args[0].coercion,
            Coercion::Int {
                width: IntWidth::I64
            }
        );
        assert_eq!(plan.returns, Coercion::None);
    }

    #[test]
    fn test_return_mismatch_fails() {
        let member = ContractMember::property("Name", TypeRef::I32, Access::Get);
        let err = resolve(member, &HookRegistry::new()).err().unwrap();

        assert!(err.is_generation());
        assert!(err.to_string().contains("return types do not match"));
    }

    #[test]
    fn test_missing_member_unresolved() {
        let member = ContractMember::property("Age", TypeRef::I32, Access::GetSet);
        let resolved = resolve(member, &HookRegistry::new()).unwrap();

        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|r| !r.plan.target.is_resolved()));
        assert!(matches!(resolved[0].binding, Binding::Unresolved));
    }

    #[test]
    fn test_unregistered_hook_unresolved() {
        let member = ContractMember::property("Name", TypeRef::String, Access::Get)
            .with_return_extension("upper");
        let resolved = resolve(member, &HookRegistry::new()).unwrap();

        assert_eq!(
            resolved[0].plan.target,
            BindingTarget::Unresolved {
                reason: "hook 'upper' is not registered".into()
            }
        );
    }

    #[test]
    fn test_execution_hook() {
        let mut hooks = HookRegistry::new();
        hooks.register(
            "answer",
            Arc::new(FnHook::new(|_: HookCall<'_>| Ok(Value::Int(42))).returns(TypeRef::I64)),
        );
        let member =
            ContractMember::method("Answer", Vec::new(), TypeRef::I32).with_extension("answer");
        let resolved = resolve(member, &hooks).unwrap();

        let plan = &resolved[0].plan;
        assert_eq!(
            plan.target,
            BindingTarget::Hook {
                name: "answer".into()
            }
        );
        assert_eq!(
            plan.returns,
            Coercion::Int {
                width: IntWidth::I32
            }
        );
    }

    #[test]
    fn test_extension_receiver_mismatch() {
        let member = ContractMember::method("Describe", Vec::new(), TypeRef::String)
            .with_binding(BindingDirective::static_on("demo::Helpers"));
        let err = resolve(member, &HookRegistry::new()).err().unwrap();

        assert!(matches!(err, Error::InvalidOperation { .. }));
    }
}
