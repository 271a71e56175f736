//! Binding plan representation for the mimic adapter engine.
//!
//! These types describe what synthesis decided for each member of an
//! adapter, independently of the closures that carry the decision out.
//!
//! # Architecture
//!
//! ```text
//! contracts (manifest) + source TypeInfo → resolver → MemberPlan per slot → emitted adapter
//! ```
//!
//! The IR is plain data: it can be printed, serialized and compared, which is
//! what `mimic explain` and the engine's diagnostics rely on.

mod key;
mod plan;
mod slot;

pub use key::SynthesisKey;
pub use plan::{ArgPlan, BindingTarget, CallShape, Coercion, HookPlacement, HookPlan, MemberPlan};
pub use slot::{SlotKey, SlotKind};
