//! Subcommand handlers
//!
//! Every command opens the workspace the same way and renders a different
//! slice of the report.

pub mod flavor;
pub mod palette;
pub mod refs;
pub mod tree;

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use quarry::config::{load_layered, ConfigOverrides, ConfigSources};
use quarry::presentation::factory::create_open_workspace_use_case;
use quarry::presentation::output::stdout_supports_unicode;
use quarry::presentation::{Cli, OutputFormat, TextRenderer};
use quarry::{ControlCatalog, WorkspaceReport};

/// Global flags shared by every handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub verbose: u8,
    pub overrides: ConfigOverrides,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: OutputFormat::from_json_flag(cli.json),
            verbose: cli.verbose,
            overrides: cli.overrides(),
        }
    }

    pub fn renderer(&self) -> TextRenderer {
        TextRenderer::new(stdout_supports_unicode(), self.verbose)
    }
}

/// Load layered config for `path` and run the open action.
pub fn open_workspace(path: &Path, ctx: &CommandContext) -> Result<WorkspaceReport> {
    let folder = if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    };
    let sources = ConfigSources::for_project(Some(folder));
    let (config, warnings) = load_layered(&sources, &ctx.overrides, |key| std::env::var(key).ok())?;
    for warning in &warnings {
        match &warning.suggestion {
            Some(suggestion) => warn!(
                "unknown config key '{}' in {} (did you mean '{}'?)",
                warning.key,
                warning.file.display(),
                suggestion
            ),
            None => warn!(
                "unknown config key '{}' in {}",
                warning.key,
                warning.file.display()
            ),
        }
    }

    let use_case = create_open_workspace_use_case(config);
    let mut catalog = ControlCatalog::new();
    Ok(use_case.execute(path, &mut catalog)?)
}
