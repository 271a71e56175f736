//! Synthesized adapter types and the instances built from them.

use std::{any::Any, fmt, sync::Arc};

use indexmap::IndexMap;
use mimic_core::{
    Adapted, Error, Invocation, Object, ObjectRef, Result, ServicesRef, TypeInfo, TypeRef, Value,
};
use mimic_ir::{MemberPlan, SlotKey, SynthesisKey};

use crate::{EngineInner, TypeRegistry, convert, hooks::Hook, pipeline::Diagnostic};

/// A slot's compiled behaviour.
pub type Invoker = Arc<dyn Fn(&CallEnv, &Invocation) -> Result<Value> + Send + Sync>;

/// What an invoker runs against: the wrapped object, the optional services
/// handle, and the engine for nested adaptation.
#[derive(Clone)]
pub struct CallEnv {
    source: ObjectRef,
    services: Option<ServicesRef>,
    engine: Arc<EngineInner>,
}

impl CallEnv {
    pub(crate) fn new(
        source: ObjectRef,
        services: Option<ServicesRef>,
        engine: Arc<EngineInner>,
    ) -> Self {
        Self {
            source,
            services,
            engine,
        }
    }

    pub fn source(&self) -> &ObjectRef {
        &self.source
    }

    pub fn services(&self) -> Option<&ServicesRef> {
        self.services.as_ref()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.engine.registry
    }

    pub fn hook(&self, name: &str) -> Option<&Arc<dyn Hook>> {
        self.engine.hooks.get(name)
    }

    /// Adapt a value to a contract, sharing this call's services.
    ///
    /// Null stays null and a view that already implements the contract is
    /// returned as is.
    pub fn adapt(&self, value: Value, contract: &str) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Object(obj) => {
                if obj.as_adapted().is_some_and(|view| view.implements(contract)) {
                    return Ok(Value::Object(obj));
                }
                let adapted = EngineInner::adapt_object(
                    &self.engine,
                    obj,
                    &[contract],
                    self.services.clone(),
                )?;
                Ok(Value::Object(adapted))
            }
            other => Err(Error::invalid_operation(format!(
                "cannot adapt a {} value to '{}'",
                other.kind(),
                contract
            ))),
        }
    }

    pub fn convert(
        &self,
        value: Value,
        coercion: &mimic_ir::Coercion,
        bindings: &convert::Bindings,
    ) -> Result<Value> {
        convert::apply(self, coercion, value, bindings)
    }
}

/// One dispatchable entry of an adapter type.
#[derive(Clone)]
pub struct Slot {
    pub plan: MemberPlan,
    pub(crate) invoker: Invoker,
}

/// A synthesized implementation of a contract set for one source type.
pub struct AdapterType {
    name: String,
    key: SynthesisKey,
    source: Arc<TypeInfo>,
    implemented: Vec<String>,
    slots: IndexMap<SlotKey, Slot>,
    info: Arc<TypeInfo>,
    diagnostics: Vec<Diagnostic>,
}

impl AdapterType {
    pub(crate) fn new(
        key: SynthesisKey,
        source: Arc<TypeInfo>,
        implemented: Vec<String>,
        slots: IndexMap<SlotKey, Slot>,
        info: Arc<TypeInfo>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            name: key.canonical_name(),
            key,
            source,
            implemented,
            slots,
            info,
            diagnostics,
        }
    }

    #[cfg(test)]
    pub(crate) fn empty(key: SynthesisKey, source: Arc<TypeInfo>) -> Self {
        let info = TypeInfo::builder(key.canonical_name()).build();
        Self::new(key, source, Vec::new(), IndexMap::new(), info, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &SynthesisKey {
        &self.key
    }

    /// The source type this adapter wraps.
    pub fn source(&self) -> &Arc<TypeInfo> {
        &self.source
    }

    /// The requested contracts, in order.
    pub fn contracts(&self) -> &[String] {
        &self.key.contracts
    }

    /// Every contract satisfied, inherited ones included.
    pub fn implemented(&self) -> &[String] {
        &self.implemented
    }

    pub fn implements(&self, contract: &str) -> bool {
        self.implemented.iter().any(|c| c == contract)
    }

    pub fn slot(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(key)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    pub fn plans(&self) -> impl Iterator<Item = &MemberPlan> {
        self.slots.values().map(|slot| &slot.plan)
    }

    /// Reflective description of the adapter itself, so an adapted view can
    /// be adapted again or bound against like any source object.
    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    /// Warnings collected while synthesizing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Debug for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterType")
            .field("name", &self.name)
            .field("implemented", &self.implemented)
            .field(
                "slots",
                &self.slots.keys().map(|k| k.to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// An object viewed through a synthesized adapter type.
pub struct AdaptedInstance {
    ty: Arc<AdapterType>,
    env: CallEnv,
}

impl AdaptedInstance {
    pub(crate) fn new(ty: Arc<AdapterType>, env: CallEnv) -> Self {
        Self { ty, env }
    }

    /// Downcast a value holding an adapted view.
    pub fn from_value(value: &Value) -> Option<&AdaptedInstance> {
        value
            .as_object()
            .and_then(|obj| obj.as_any().downcast_ref::<AdaptedInstance>())
    }

    pub fn adapter_type(&self) -> &Arc<AdapterType> {
        &self.ty
    }

    /// The exact object this view wraps.
    pub fn inner(&self) -> &ObjectRef {
        &self.env.source
    }

    pub fn services(&self) -> Option<&ServicesRef> {
        self.env.services()
    }

    /// Read a property.
    pub fn get(&self, property: &str) -> Result<Value> {
        self.invoke(&SlotKey::get(property), Invocation::default())
    }

    /// Write a property.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> Result<()> {
        self.invoke(&SlotKey::set(property), Invocation::new(vec![value.into()]))
            .map(|_| ())
    }

    /// Call a method.
    pub fn call(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        self.invoke(&SlotKey::call(method, args.len()), Invocation::new(args))
    }

    /// Call a generic method with explicit type arguments.
    pub fn call_generic(
        &self,
        method: &str,
        type_args: Vec<TypeRef>,
        args: Vec<Value>,
    ) -> Result<Value> {
        self.invoke(
            &SlotKey::call(method, args.len()),
            Invocation::new(args).with_type_args(type_args),
        )
    }

    /// Read through the indexer taking `indices.len()` arguments.
    pub fn index(&self, indices: Vec<Value>) -> Result<Value> {
        self.invoke(&SlotKey::index_get(indices.len()), Invocation::new(indices))
    }

    /// Write through the indexer taking `indices.len()` arguments.
    pub fn set_index(&self, mut indices: Vec<Value>, value: impl Into<Value>) -> Result<()> {
        let key = SlotKey::index_set(indices.len());
        indices.push(value.into());
        self.invoke(&key, Invocation::new(indices)).map(|_| ())
    }

    pub(crate) fn invoke(&self, key: &SlotKey, invocation: Invocation) -> Result<Value> {
        let slot = self.ty.slot(key).ok_or_else(|| {
            Error::invalid_operation(format!("'{}' does not expose '{}'", self.ty.name(), key))
        })?;
        (slot.invoker)(&self.env, &invocation)
    }
}

impl Object for AdaptedInstance {
    fn type_info(&self) -> Arc<TypeInfo> {
        Arc::clone(&self.ty.info)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_adapted(&self) -> Option<&dyn Adapted> {
        Some(self)
    }
}

impl Adapted for AdaptedInstance {
    fn inner(&self) -> &ObjectRef {
        &self.env.source
    }

    fn implements(&self, contract: &str) -> bool {
        self.ty.implements(contract)
    }
}

impl fmt::Debug for AdaptedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptedInstance")
            .field("type", &self.ty.name())
            .field("source", &self.env.source.type_info().name)
            .finish()
    }
}
