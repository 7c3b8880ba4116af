//! Open Workspace Use Case
//!
//! The "open project or solution" action: locate what to load, resolve every
//! reference, build the file trees and feed the palette catalog.

mod result;
mod use_case;


pub use result::{ProjectReport, WorkspaceMode, WorkspaceReport};
pub use use_case::OpenWorkspaceUseCase;
