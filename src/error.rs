//! Error types for Quarry
//!
//! Uses `thiserror` for library errors. Per-item failures during a resolution
//! pass are reported as diagnostics instead; only structural failures surface here.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::ports::DescriptorError;

/// Result type alias for Quarry operations
pub type QuarryResult<T> = Result<T, QuarryError>;

/// Main error type for Quarry operations
#[derive(Error, Debug)]
pub enum QuarryError {
    /// The path handed to an open action cannot be read at all
    #[error("cannot access '{path}': {message}")]
    RootInaccessible { path: PathBuf, message: String },

    /// Descriptor lookup or parsing failed for the root project
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Configuration file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
