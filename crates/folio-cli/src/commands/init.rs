use anyhow::bail;
use clap::Args;
use colored::Colorize;
use folio_core::{FolioConfig, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct InitCommand {
    /// Where to write the configuration
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        if self.output.exists() && !self.force {
            bail!(
                "{} already exists, pass --force to overwrite it",
                self.output.display()
            );
        }

        let yaml = FolioConfig::default().to_yaml()?;
        std::fs::write(&self.output, yaml)?;
        info!("Wrote default configuration to {}", self.output.display());

        println!(
            "{} {}",
            "Created".bright_green().bold(),
            self.output.display().to_string().bright_cyan()
        );
        Ok(())
    }
}
