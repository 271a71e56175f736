//! Built-in pipeline phases.
//!
//! - [`ValidatePhase`] - runs lints over the requested contracts
//! - [`FlattenPhase`] - collects members across inherited contracts
//! - [`ResolvePhase`] - binds every slot
//! - [`EmitPhase`] - compiles bindings into the adapter type

mod emit;
mod flatten;
mod resolve;
mod validate;

pub use emit::EmitPhase;
pub use flatten::{FlattenPhase, SlotOutline, outline};
pub(crate) use flatten::contract_closure;
pub use resolve::ResolvePhase;
pub use validate::{
    AdaptTargetLint, Lint, LintInfo, StaticOwnerLint, UnknownHookLint, ValidatePhase,
};
