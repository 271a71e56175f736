//! Synthesis pipeline.
//!
//! This module provides a [`Pipeline`] orchestrator that turns one
//! (source type, contract set) request into an [`crate::AdapterType`]. The
//! pipeline provides:
//!
//! - Explicit phase boundaries (validate → flatten → resolve → emit)
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection
//! - Shared state via [`SynthesisContext`]
//!
//! # Example
//!
//! ```ignore
//! use mimic_synth::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let mut ctx = pipeline.run(request)?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("warning: {}", diag.message);
//! }
//!
//! let adapter = ctx.take_adapter()?;
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::{SynthesisContext, SynthesisRequest};
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
