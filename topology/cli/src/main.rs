#![warn(clippy::indexing_slicing)]

//! `topology`: checks `Shovel` manifests against the admission rules of the cluster, and renders
//! the shovel definitions the broker would receive.

use clap::Parser;
use config::{Cli, Commands};
use error::CliResult;

mod config;
mod definition;
mod error;
mod logging;
mod manifest;
mod verify;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    logging::init_tracing_registry(cli.log_level.as_deref(), cli.log_format);

    let res: CliResult<()> = match cli.commands {
        Commands::Verify(args) => verify::verify(*args),
        Commands::Definition(args) => definition::definition(*args),
    };

    res.map_err(Into::into)
}
