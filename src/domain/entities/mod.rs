//! Domain Entities
//!
//! Core domain entities created fresh for each open action.
//! - `ProjectDescriptor` - A parsed `.csproj`
//! - `ProjectTree` - Files belonging to a project
//! - `ResolvedArtifact` - A binary produced by resolving a reference
//! - `ControlCatalog` - Palette registry shared for the lifetime of the process

mod artifact;
mod catalog;
mod descriptor;
mod project_tree;

pub use artifact::{
    logical_name_of, ArtifactList, ArtifactMark, ArtifactOrigin, PushOutcome, ResolvedArtifact,
};
pub use catalog::{CatalogBatch, ControlCatalog, ControlCatalogEntry, Registration};
pub use descriptor::{DirectReference, Flavor, PackageReference, ProjectDescriptor, ReferenceSet};
pub use project_tree::{FileEntry, FileKind, FolderEntry, ProjectTree};
