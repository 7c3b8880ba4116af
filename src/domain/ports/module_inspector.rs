//! ModuleInspector port
//!
//! Reads the type table of a compiled module without executing any of its code.

use std::path::{Path, PathBuf};

/// One type definition as recorded in module metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub namespace: String,
    /// Simple name; nested types use `Outer+Inner`
    pub name: String,
    /// Public, or nested-public inside a chain of public types
    pub is_exported: bool,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub is_generic_definition: bool,
    pub has_public_default_ctor: bool,
    /// Full name of the direct base type, if any
    pub base_type: Option<String>,
}

impl TypeInfo {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Exported, concrete, non-generic, and constructible without arguments.
    pub fn is_instantiable(&self) -> bool {
        self.is_exported
            && !self.is_abstract
            && !self.is_interface
            && !self.is_generic_definition
            && self.has_public_default_ctor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleMetadata {
    /// Name from the assembly manifest, when the module carries one
    pub assembly_name: Option<String>,
    pub types: Vec<TypeInfo>,
}

pub trait ModuleInspector {
    fn inspect(&self, path: &Path) -> Result<ModuleMetadata, ModuleLoadError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModuleLoadError {
    #[error("module not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read module {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("{path} is not a portable executable: {reason}")]
    NotPortableExecutable { path: PathBuf, reason: String },

    #[error("{path} has no managed metadata")]
    NotManaged { path: PathBuf },

    #[error("malformed metadata in {path}: {reason}")]
    MalformedMetadata { path: PathBuf, reason: String },

    #[error("unsupported metadata in {path}: {reason}")]
    UnsupportedMetadata { path: PathBuf, reason: String },
}
