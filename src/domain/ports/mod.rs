//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod descriptor_reader;
pub mod module_inspector;

pub use descriptor_reader::{DescriptorError, DescriptorReader, SolutionReader};
pub use module_inspector::{ModuleInspector, ModuleLoadError, ModuleMetadata, TypeInfo};
