//! Managed module metadata reader
//!
//! Reads ECMA-335 metadata straight from PE images. Nothing in the module is
//! loaded or executed.

mod bytes;
mod pe;
mod reader;
mod root;
mod tables;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::ports::{ModuleInspector, ModuleLoadError, ModuleMetadata};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("not a portable executable: {0}")]
    NotPortableExecutable(String),
    #[error("no CLI header")]
    NotManaged,
    #[error("{0}")]
    Malformed(String),
    #[error("{0}")]
    Unsupported(String),
}

impl MetadataError {
    fn at(self, path: &Path) -> ModuleLoadError {
        let path = path.to_path_buf();
        match self {
            Self::NotPortableExecutable(reason) => {
                ModuleLoadError::NotPortableExecutable { path, reason }
            }
            Self::NotManaged => ModuleLoadError::NotManaged { path },
            Self::Malformed(reason) => ModuleLoadError::MalformedMetadata { path, reason },
            Self::Unsupported(reason) => ModuleLoadError::UnsupportedMetadata { path, reason },
        }
    }
}

/// Filesystem-backed [`ModuleInspector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClrMetadataReader;

impl ClrMetadataReader {
    pub fn new() -> Self {
        Self
    }

    /// Parses an in-memory image.
    pub fn read_image(image: &[u8]) -> Result<ModuleMetadata, MetadataError> {
        reader::read_module(image)
    }
}

impl ModuleInspector for ClrMetadataReader {
    fn inspect(&self, path: &Path) -> Result<ModuleMetadata, ModuleLoadError> {
        let image = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ModuleLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ModuleLoadError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;
        let metadata = Self::read_image(&image).map_err(|e| e.at(path))?;
        tracing::trace!(
            module = %path.display(),
            types = metadata.types.len(),
            "read module metadata"
        );
        Ok(metadata)
    }
}
