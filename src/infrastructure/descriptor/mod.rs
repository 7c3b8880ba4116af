//! Project descriptor infrastructure
//!
//! Filesystem-backed [`DescriptorReader`] and [`SolutionReader`].

mod locate;
mod solution;
mod xml;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::entities::{Flavor, ProjectDescriptor};
use crate::domain::ports::{DescriptorError, DescriptorReader, SolutionReader};
use crate::domain::services::apply_flavor;
use crate::domain::value_objects::ScanRules;

pub use locate::{
    locate_descriptor_below, locate_target, OpenTarget, DESCRIPTOR_EXTENSION, SOLUTION_EXTENSION,
};
pub use solution::{member_paths, parse_solution, SolutionEntry};
pub use xml::{parse_descriptor, ParsedDescriptor};

/// Reads `.csproj` and `.sln` files from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsDescriptorReader {
    rules: ScanRules,
}

impl FsDescriptorReader {
    pub fn new(rules: ScanRules) -> Self {
        Self { rules }
    }
}

impl DescriptorReader for FsDescriptorReader {
    fn read_descriptor(&self, path: &Path) -> Result<ProjectDescriptor, DescriptorError> {
        let content = read_text(path)?;
        let parsed = parse_descriptor(path, &content)?;
        let mut descriptor = parsed.descriptor;

        if parsed.is_project {
            apply_flavor(&mut descriptor, &self.rules);
        } else {
            debug!("{} root element is not Project", path.display());
            descriptor.flavor = Flavor::Unknown;
            descriptor.flavor_rule = "root_element";
        }
        Ok(descriptor)
    }
}

impl SolutionReader for FsDescriptorReader {
    fn read_members(&self, solution: &Path) -> Result<Vec<PathBuf>, DescriptorError> {
        let content = read_text(solution)?;
        Ok(member_paths(solution, &content))
    }

    fn fallback_descriptor(&self, solution: &Path) -> Result<PathBuf, DescriptorError> {
        locate_descriptor_below(solution.parent().unwrap_or(solution))
    }
}

fn read_text(path: &Path) -> Result<String, DescriptorError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DescriptorError::MissingDescriptor {
            searched: path.to_path_buf(),
        },
        _ => DescriptorError::io(path, &e),
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}
