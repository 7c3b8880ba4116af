//! Tree command handler

use std::path::Path;

use anyhow::Result;

use quarry::presentation::output::report_json;
use quarry::presentation::OutputFormat;

use super::{open_workspace, CommandContext};

pub fn cmd_tree(path: &Path, ctx: &CommandContext) -> Result<()> {
    let report = open_workspace(path, ctx)?;
    match ctx.format {
        OutputFormat::Json => println!("{}", report_json(&report)?),
        OutputFormat::Text => print!("{}", ctx.renderer().render_tree(&report)),
    }
    Ok(())
}
