//! Flavor command handler

use std::path::Path;

use anyhow::Result;

use quarry::presentation::output::flavor_json;
use quarry::presentation::OutputFormat;

use super::{open_workspace, CommandContext};

pub fn cmd_flavor(path: &Path, ctx: &CommandContext) -> Result<()> {
    let report = open_workspace(path, ctx)?;
    match ctx.format {
        OutputFormat::Json => println!("{}", flavor_json(&report)?),
        OutputFormat::Text => print!("{}", ctx.renderer().render_flavor(&report)),
    }
    Ok(())
}
