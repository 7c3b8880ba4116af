//! DescriptorReader and SolutionReader ports
//!
//! Read project descriptors and solution member lists from disk.

use std::path::{Path, PathBuf};

use crate::domain::entities::ProjectDescriptor;

pub trait DescriptorReader {
    /// Parse a descriptor and decide its flavor.
    fn read_descriptor(&self, path: &Path) -> Result<ProjectDescriptor, DescriptorError>;
}

pub trait SolutionReader {
    /// Absolute descriptor paths of the solution's member projects, in file order.
    fn read_members(&self, solution: &Path) -> Result<Vec<PathBuf>, DescriptorError>;

    /// Descriptor to open when a solution lists no usable members.
    fn fallback_descriptor(&self, solution: &Path) -> Result<PathBuf, DescriptorError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("no project descriptor found for {searched}")]
    MissingDescriptor { searched: PathBuf },

    #[error("malformed project descriptor {path}: {message}")]
    MalformedDescriptor { path: PathBuf, message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl DescriptorError {
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        DescriptorError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
