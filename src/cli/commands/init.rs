//! Init command: seed project config and database.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Serialize)]
struct InitOutput {
    config_path: String,
    database_path: String,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        format!(
            "Initialized larkspur project.\n  config:   {}\n  database: {}",
            self.config_path, self.database_path
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json: bool) -> Result<()> {
    let config = Config::default();
    let config_path = Path::new(".larkspur/config.yaml");

    if config_path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", config_path.display());
    }

    std::fs::create_dir_all(".larkspur").context("failed to create .larkspur directory")?;
    std::fs::write(config_path, default_config_yaml(&config))
        .context("failed to write config file")?;

    initialize_database(&config.database.url(), config.database.max_connections).await?;

    output(
        &InitOutput {
            config_path: config_path.display().to_string(),
            database_path: config.database.path.clone(),
        },
        json,
    );
    Ok(())
}

fn default_config_yaml(config: &Config) -> String {
    format!(
        "database:\n  path: {}\n  max_connections: {}\nlogging:\n  level: {}\n  format: {}\n",
        config.database.path,
        config.database.max_connections,
        config.logging.level,
        config.logging.format
    )
}
