//! Quarry - project reference resolver and control-palette discovery
//!
//! Opens a `.csproj`, `.sln`, or folder the way a XAML designer does: builds
//! the project file tree, resolves sibling-project, package and direct
//! references to concrete binaries, and reads their metadata to find the
//! control types a designer palette can offer.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{OpenWorkspaceUseCase, WorkspaceReport};
pub use config::Config;
pub use domain::entities::{ControlCatalog, Flavor};
pub use error::{QuarryError, QuarryResult};
pub use infrastructure::{ClrMetadataReader, FsDescriptorReader};
