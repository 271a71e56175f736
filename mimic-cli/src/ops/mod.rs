//! Core operations.
//!
//! This module contains the business logic for mimic commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod explain;

pub use check::check;
pub use explain::explain;
