//! Infrastructure Layer
//!
//! Concrete implementations of domain ports. All filesystem parsing lives here.
//!
//! ## Structure
//!
//! - `descriptor/` - Project and solution descriptor readers
//! - `metadata/` - Managed module metadata reader

pub mod descriptor;
pub mod metadata;

pub use descriptor::FsDescriptorReader;
pub use metadata::{ClrMetadataReader, MetadataError};
