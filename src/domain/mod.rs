//! Domain Layer
//!
//! The resolution engine: descriptors, project trees, reference resolution
//! and palette discovery.
//!
//! ## Structure
//!
//! - `entities/` - Values built during one open action (ProjectDescriptor, ProjectTree, ArtifactList, ControlCatalog)
//! - `value_objects/` - Small shared values (ItemPattern, ProcessedSet, FrameworkPriority, Diagnostic)
//! - `services/` - The resolution components
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **Filesystem discovery lives here** - Scanning folders is what these components do
//! 2. **Parsing behind ports** - Descriptor XML and binary metadata are read through `ports/`
//! 3. **Explicit session state** - Visited sets and catalogs are passed in, never global

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
