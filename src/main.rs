//! Quarry CLI - project reference resolver and control-palette discovery
//!
//! Usage: quarry <COMMAND> [PATH]
//!
//! Commands:
//!   tree     Print the project file tree
//!   refs     Print resolved reference binaries
//!   palette  Discover palette controls
//!   flavor   Print the detected UI framework

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use quarry::presentation::{Cli, Commands};

use commands::CommandContext;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    let ctx = CommandContext::from_cli(&cli);

    match &cli.command {
        Commands::Tree { path } => commands::tree::cmd_tree(path, &ctx),
        Commands::Refs { path } => commands::refs::cmd_refs(path, &ctx),
        Commands::Palette { path } => commands::palette::cmd_palette(path, &ctx),
        Commands::Flavor { path } => commands::flavor::cmd_flavor(path, &ctx),
    }
}
