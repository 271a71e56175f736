//! Adapter type synthesis for the mimic engine.
//!
//! Given a source type and an ordered set of contracts, the engine builds
//! (once, then caches) an adapter type whose slots forward each contract
//! member to the source, converting values on the way in and out.
//!
//! # Module Organization
//!
//! - [`engine`] - [`Engine`] and its builder, the public entry points
//! - [`pipeline`] - the synthesis phases (validate, flatten, resolve, emit) and plugins
//! - [`resolve`] - member binding rules
//! - [`convert`] - value coercions between source and contract shapes
//! - [`strategy`] - pluggable member implementations (async pattern, dynamic members)
//! - [`hooks`] - named value transformers and member executors
//! - [`cache`] - the single-flight adapter type cache
//!
//! # Example
//!
//! ```ignore
//! let engine = Engine::builder()
//!     .manifest(manifest)
//!     .with_default_strategies()
//!     .build();
//!
//! let parent = engine.adapt(Some(object), "IParent", None)?.unwrap();
//! let child = parent.call("GetChild", vec![])?;
//! ```

mod adapter;
pub mod cache;
pub mod convert;
pub mod engine;
pub mod hooks;
pub mod pipeline;
mod registry;
pub mod resolve;
pub mod strategy;

pub use adapter::{AdaptedInstance, AdapterType, CallEnv, Invoker, Slot};
pub use cache::TypeCache;
pub use convert::{Bindings, Planner};
pub(crate) use engine::EngineInner;
pub use engine::{Engine, EngineBuilder};
pub use hooks::{FnHook, Hook, HookCall, HookRegistry};
pub use pipeline::{Diagnostic, Severity, phases::{SlotOutline, outline}};
pub use registry::TypeRegistry;
pub use resolve::{FlatMember, ResolvedSlot};
pub use strategy::{AsyncPatternStrategy, DynamicMembersStrategy, Strategy, StrategyRequest};
