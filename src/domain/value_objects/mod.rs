//! Value Objects
//!
//! Immutable or append-only values shared by the domain services.

mod diagnostic;
mod framework_priority;
mod item_pattern;
mod processed_set;
mod scan_rules;
mod system_modules;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use framework_priority::{
    FrameworkPriority, DEFAULT_BUILD_TARGETS, DEFAULT_CONFIGURATIONS, DEFAULT_PACKAGE_FRAMEWORKS,
};
pub use item_pattern::{ItemPattern, PatternError, PatternSet};
pub use processed_set::ProcessedSet;
pub use scan_rules::{
    ScanRules, DEFAULT_EXCLUDED_FOLDERS, DEFAULT_GENERATED_SUFFIXES, DEFAULT_SCAN_EXTENSIONS,
};
pub use system_modules::SystemModuleFilter;
