//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod explain;
mod output;

pub use check::{CheckReport, ContractSummary, EnumSummary};
pub use explain::ExplainReport;
pub use output::{Report, TerminalOutput};
