//! Explain command report data structures.

use std::path::PathBuf;

use mimic_synth::{
    SlotOutline,
    pipeline::{PhaseInfo, phases::LintInfo},
};
use serde::Serialize;

use super::output::{Output, Report};

/// Report data from a synthesis walkthrough.
#[derive(Debug, Serialize)]
pub struct ExplainReport {
    /// Path to the manifest file.
    pub config_path: PathBuf,
    /// Requested contracts, in order.
    pub contracts: Vec<String>,
    pub phases: Vec<PhaseInfo>,
    pub lints: Vec<LintInfo>,
    /// Slots of the adapter, own members first.
    pub slots: Vec<SlotOutline>,
}

impl Report for ExplainReport {
    fn render(&self, out: &mut dyn Output) {
        out.title("Adapter Synthesis Explanation");
        out.newline();

        out.key_value("Input", &self.config_path.display().to_string());
        out.key_value_indented("Contracts", &self.contracts.join(", "));
        out.newline();

        out.section("Pipeline Phases");
        for (i, phase) in self.phases.iter().enumerate() {
            out.numbered_item(i + 1, &format!("{} - {}", phase.name, phase.description));
        }
        out.newline();

        out.section("Validation Lints");
        for lint in &self.lints {
            out.list_item(&format!("{}: {}", lint.name, lint.description));
        }
        out.newline();

        out.section("Slots");
        for slot in &self.slots {
            out.list_item(&format!(
                "{} - {} ({})",
                slot.slot, slot.signature, slot.contract
            ));
            if let Some(directive) = &slot.directive {
                out.key_value_indented("bind", directive);
            }
            if !slot.hooks.is_empty() {
                out.key_value_indented("hooks", &slot.hooks.join(", "));
            }
        }
    }
}
