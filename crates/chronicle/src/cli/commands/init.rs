//! Init command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use chronicle_core::config::{find_config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};

use crate::cli::{output, Cli};

/// Write a default configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        if self.output.is_none() && !self.force {
            if let Some(existing) = find_config(&cwd) {
                if !cli.quiet {
                    output::warning(&format!(
                        "{} is also present and may take precedence",
                        output::path(&existing)
                    ));
                }
            }
        }

        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        if !cli.quiet {
            output::success(&format!(
                "Created {}",
                output::path(&config_path)
            ));
            output::info("Run `chronicle generate --tag <tag>` to update the changelog");
        }

        Ok(())
    }
}
