use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use mimic_manifest::ManifestFile;
use tracing::debug;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the contract manifest (defaults to ./mimic.toml)
    #[arg(short, long, default_value = "mimic.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let file = ManifestFile::open(&self.config).unwrap_or_exit();
        debug!(path = %self.config.display(), "loaded manifest");

        let report = ops::check(file.manifest(), &self.config)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
