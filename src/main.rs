//! Larkspur CLI entry point.

use clap::Parser;

use larkspur::cli::{Cli, Commands};
use larkspur::infrastructure::config::ConfigLoader;
use larkspur::infrastructure::logging::init_tracing;

#[tokio::main]
async fn main() {
    // Best effort: a broken config file still gets default logging here and
    // a proper error from the command that loads it.
    let logging = ConfigLoader::load().map(|c| c.logging).unwrap_or_default();
    init_tracing(&logging);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => larkspur::cli::commands::init::execute(args, cli.json).await,
        Commands::Dataset(args) => larkspur::cli::commands::dataset::execute(args, cli.json).await,
        Commands::Session(args) => larkspur::cli::commands::session::execute(args, cli.json).await,
        Commands::Label(args) => larkspur::cli::commands::label::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        larkspur::cli::handle_error(err, cli.json);
    }
}
