//! Command-line interface for the larkspur annotation core.

pub mod commands;
pub mod display;
pub mod output;

use clap::{Parser, Subcommand};

pub use output::{output, CommandOutput};

#[derive(Parser, Debug)]
#[command(name = "larkspur", version, about = "Medical-image annotation with adaptive pairwise ranking")]
pub struct Cli {
    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project config and database
    Init(commands::init::InitArgs),
    /// Manage image datasets
    Dataset(commands::dataset::DatasetArgs),
    /// Manage labeling sessions
    Session(commands::session::SessionArgs),
    /// Record and inspect labels
    Label(commands::label::LabelArgs),
}

/// Report a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": err.to_string() });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("error: {err:#}");
    }
    std::process::exit(1);
}
