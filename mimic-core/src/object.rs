//! The object trait and optional object capabilities.

use std::{any::Any, sync::Arc};

use crate::{TypeInfo, Value};

/// Shared handle to an adaptable object.
pub type ObjectRef = Arc<dyn Object>;

/// An object the engine can bind against.
///
/// Implementors describe their own shape through [`TypeInfo`]; state that
/// adapted setters mutate must use interior mutability since every member
/// receives `&self`.
///
/// # Example
///
/// ```ignore
/// struct Person { name: Mutex<String> }
///
/// impl Object for Person {
///     fn type_info(&self) -> Arc<TypeInfo> { PERSON_TYPE.clone() }
///     fn as_any(&self) -> &dyn Any { self }
/// }
/// ```
pub trait Object: Any + Send + Sync {
    /// Reflective description of this object's type.
    fn type_info(&self) -> Arc<TypeInfo>;

    /// Upcast for receiver downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Duck-typed member access, for objects whose type is flagged dynamic.
    fn as_dynamic(&self) -> Option<&dyn DynamicMembers> {
        None
    }

    /// Present on adapted views; exposes the wrapped object.
    fn as_adapted(&self) -> Option<&dyn Adapted> {
        None
    }
}

/// Escape hatch implemented by every adapted view.
pub trait Adapted {
    /// The exact object this view wraps.
    fn inner(&self) -> &ObjectRef;

    /// Returns true if this view implements the contract, directly or through
    /// an inherited contract.
    fn implements(&self, contract: &str) -> bool;
}

/// Structured descriptor for indexed dynamic access.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexCall {
    /// Index arguments in declaration order.
    pub args: Vec<Value>,
    /// Contract parameter names, parallel to `args`.
    pub names: Vec<String>,
}

/// Name-based member access for duck-typed objects.
///
/// A `None`/`false` result means the member does not exist or rejected
/// the value; the adapter turns failed gets into `Null` and ignores failed
/// sets.
pub trait DynamicMembers {
    fn try_get_member(&self, name: &str) -> Option<Value>;

    fn try_set_member(&self, name: &str, value: Value) -> bool;

    fn try_get_index(&self, call: &IndexCall) -> Option<Value>;

    fn try_set_index(&self, call: &IndexCall, value: Value) -> bool;
}
