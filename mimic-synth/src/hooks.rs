//! Hooks selected by extension directives.
//!
//! A hook either transforms one value (a parameter or a return value) or,
//! when named as a member's `extension`, executes the member outright.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use mimic_core::{ObjectRef, Result, ServicesRef, TypeRef, Value};

/// What a hook sees when it runs.
pub struct HookCall<'a> {
    /// The contract member being invoked.
    pub member: &'a str,
    /// The wrapped source object.
    pub source: &'a ObjectRef,
    pub services: Option<&'a ServicesRef>,
    /// The value being transformed; `Null` for execution hooks.
    pub value: Value,
    /// The caller's arguments, as passed to the contract member.
    pub args: &'a [Value],
}

/// A named value transformer or member executor.
pub trait Hook: Send + Sync {
    fn call(&self, call: HookCall<'_>) -> Result<Value>;

    /// Type of the values this hook produces, when known. Coercions after the
    /// hook are planned from it; without one they are decided at call time.
    fn output_type(&self) -> Option<&TypeRef> {
        None
    }
}

/// A hook backed by a closure.
///
/// # Example
///
/// ```ignore
/// let trim = FnHook::new(|call| Ok(call.value.as_str().unwrap_or_default().trim().into()))
///     .returns(TypeRef::String);
/// ```
pub struct FnHook<F> {
    f: F,
    output: Option<TypeRef>,
}

impl<F> FnHook<F>
where
    F: Fn(HookCall<'_>) -> Result<Value> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f, output: None }
    }

    /// Declare the output type.
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.output = Some(ty);
        self
    }
}

impl<F> Hook for FnHook<F>
where
    F: Fn(HookCall<'_>) -> Result<Value> + Send + Sync,
{
    fn call(&self, call: HookCall<'_>) -> Result<Value> {
        (self.f)(call)
    }

    fn output_type(&self) -> Option<&TypeRef> {
        self.output.as_ref()
    }
}

/// Registered hooks by name.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: IndexMap<String, Arc<dyn Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, hook: Arc<dyn Hook>) {
        self.hooks.insert(name.into(), hook);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Hook>> {
        self.hooks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hooks.keys()).finish()
    }
}
