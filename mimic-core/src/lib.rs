//! Core object model for the mimic adapter engine.
//!
//! Rust has no runtime reflection, so everything the engine binds against is
//! described explicitly here:
//!
//! - [`Value`] - the dynamically-typed values flowing through adapted calls
//! - [`TypeRef`] - type expressions used in contract and source signatures
//! - [`TypeInfo`] - reflective description of a source type, built with [`TypeBuilder`]
//! - [`Object`] - the trait every adaptable object implements
//! - [`Promise`] / [`Callback`] - the asynchronous completion primitives
//! - [`Services`] - the optional per-adaptation services handle
//! - [`Error`] - the error taxonomy shared by every crate in the workspace

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod info;
mod object;
mod promise;
mod services;
mod types;
mod utils;
mod value;

pub use error::{Error, Result};
pub use info::{
    EnumInfo, FieldInfo, Getter, IndexGetter, IndexSetter, IndexerInfo, Invocation, MethodFn,
    MethodInfo, ParamInfo, PropertyInfo, Setter, TypeBuilder, TypeInfo,
};
pub use object::{Adapted, DynamicMembers, IndexCall, Object, ObjectRef};
pub use promise::{Callback, Completer, Promise};
pub use services::{ServiceMap, Services, ServicesRef};
pub use types::{IntWidth, TypeParseError, TypeRef};
pub use utils::{Accessor, accessor_name, split_accessor, strip_async_suffix, to_pascal_case};
pub use value::Value;
