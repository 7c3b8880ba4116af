//! Diagnostics collected during a resolution pass
//!
//! Per-item failures never abort a pass; they are recorded here and logged.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingDescriptor,
    MalformedDescriptor,
    UnresolvableReference,
    ModuleLoadFailure,
}

impl DiagnosticKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingDescriptor => "missing descriptor",
            DiagnosticKind::MalformedDescriptor => "malformed descriptor",
            DiagnosticKind::UnresolvableReference => "unresolvable reference",
            DiagnosticKind::ModuleLoadFailure => "module load failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub subject: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.kind.label(),
            self.message,
            self.subject.display()
        )
    }
}
