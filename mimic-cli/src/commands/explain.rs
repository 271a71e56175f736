use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use mimic_manifest::ManifestFile;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ExplainCommand {
    /// Contracts to adapt to, in order
    #[arg(required = true)]
    pub contracts: Vec<String>,

    /// Path to the contract manifest (defaults to ./mimic.toml)
    #[arg(short, long, default_value = "mimic.toml")]
    pub config: PathBuf,

    /// Print the explanation as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let file = ManifestFile::open(&self.config).unwrap_or_exit();
        let report = ops::explain(file.into_manifest(), &self.config, &self.contracts)?;

        if self.json {
            let json = serde_json::to_string_pretty(&report).wrap_err("Failed to encode report")?;
            println!("{}", json);
        } else {
            report.render(&mut TerminalOutput::new());
        }
        Ok(())
    }
}
