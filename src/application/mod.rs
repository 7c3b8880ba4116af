//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `OpenWorkspaceUseCase` - Opens a project or solution and fills the palette catalog

pub mod open_workspace;

pub use open_workspace::{OpenWorkspaceUseCase, ProjectReport, WorkspaceMode, WorkspaceReport};
