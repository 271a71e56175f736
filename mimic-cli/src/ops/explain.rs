//! Explain operation - synthesis walkthrough for a contract set.

use std::path::Path;

use eyre::{Context, Result};
use mimic_manifest::Manifest;
use mimic_synth::{TypeRegistry, outline, pipeline::Pipeline};

use crate::reports::ExplainReport;

/// Execute the explain operation.
///
/// Lists the pipeline phases and lints, and outlines the slots an adapter for
/// `contracts` will expose. No source type is needed, so nothing is bound.
pub fn explain(
    manifest: Manifest,
    config_path: &Path,
    contracts: &[String],
) -> Result<ExplainReport> {
    let mut registry = TypeRegistry::new();
    registry.load(manifest);

    let names: Vec<&str> = contracts.iter().map(String::as_str).collect();
    let slots = outline(&registry, &names).wrap_err("Failed to outline contracts")?;

    let pipeline = Pipeline::new();
    Ok(ExplainReport {
        config_path: config_path.to_path_buf(),
        contracts: contracts.to_vec(),
        phases: pipeline.phase_info(),
        lints: pipeline.lint_info(),
        slots,
    })
}
