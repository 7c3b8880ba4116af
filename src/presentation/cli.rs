//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (--json, --verbose, --configuration, --global-packages) are
//! inherited by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ConfigOverrides;

/// Quarry - project reference resolver and control-palette discovery
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Build configuration folder to prefer (can be specified multiple times)
    #[arg(long = "configuration", value_name = "NAME", global = true)]
    pub configurations: Vec<String>,

    /// Global package cache to search instead of the default
    #[arg(long, value_name = "DIR", global = true)]
    pub global_packages: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            configurations: self.configurations.clone(),
            global_packages: self.global_packages.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the project file tree with code-behind files nested
    Tree {
        /// Project, solution, or folder to open
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print resolved reference binaries in resolution order
    Refs {
        /// Project, solution, or folder to open
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Discover palette controls in every resolved binary
    Palette {
        /// Project, solution, or folder to open
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print the detected UI framework and the rule that decided it
    Flavor {
        /// Project, solution, or folder to open
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

impl Commands {
    pub fn path(&self) -> &PathBuf {
        match self {
            Commands::Tree { path }
            | Commands::Refs { path }
            | Commands::Palette { path }
            | Commands::Flavor { path } => path,
        }
    }
}
