//! Pluggable strategies that implement whole contract members.
//!
//! Strategies are consulted before any other binding rule, in registration
//! order; the first one that claims a member implements all of its slots.

mod async_pattern;
mod dynamic;

use std::sync::Arc;

pub use async_pattern::AsyncPatternStrategy;
pub use dynamic::DynamicMembersStrategy;
use mimic_core::{Result, TypeInfo};
use mimic_ir::SlotKey;
use mimic_manifest::ContractMember;

use crate::{Invoker, TypeRegistry};

/// What a strategy is asked to implement.
pub struct StrategyRequest<'a> {
    /// Name of the adapter being synthesized, for error reporting.
    pub adapter: &'a str,
    pub member: &'a ContractMember,
    pub slot: &'a SlotKey,
    pub source: &'a Arc<TypeInfo>,
    pub registry: &'a TypeRegistry,
}

/// Implements contract members the ordinary binding rules cannot.
pub trait Strategy: Send + Sync {
    /// The name of this strategy (shown in binding plans).
    fn name(&self) -> &'static str;

    /// Whether this strategy takes over `member` for `source`.
    fn can_implement(&self, member: &ContractMember, source: &TypeInfo) -> bool;

    /// Build the invoker for one slot of a claimed member.
    ///
    /// # Errors
    ///
    /// Returns `AdapterGeneration` if the member cannot be implemented after
    /// all; synthesis of the whole adapter fails.
    fn implement(&self, request: &StrategyRequest<'_>) -> Result<Invoker>;
}

/// The built-in strategies, in their default order.
pub fn defaults() -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(AsyncPatternStrategy),
        Arc::new(DynamicMembersStrategy),
    ]
}
