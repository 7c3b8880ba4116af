//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use crate::application::OpenWorkspaceUseCase;
use crate::config::Config;
use crate::infrastructure::{ClrMetadataReader, FsDescriptorReader};

/// Type alias for the concrete OpenWorkspaceUseCase with all dependencies
pub type ConcreteOpenWorkspaceUseCase = OpenWorkspaceUseCase<FsDescriptorReader, ClrMetadataReader>;

/// Create an open-workspace use case reading from the local filesystem
pub fn create_open_workspace_use_case(config: Config) -> ConcreteOpenWorkspaceUseCase {
    let reader = FsDescriptorReader::new(config.scan_rules());
    OpenWorkspaceUseCase::new(reader, ClrMetadataReader::new(), config)
}
