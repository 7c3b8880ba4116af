//! Open Workspace Result

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::{
    CatalogBatch, Flavor, ProjectDescriptor, ProjectTree, ReferenceSet, ResolvedArtifact,
};
use crate::domain::services::IntrospectionReport;
use crate::domain::value_objects::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceMode {
    Project,
    Solution,
}

/// One descriptor read during the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub name: String,
    pub path: PathBuf,
    pub flavor: Flavor,
    /// Detection rule that decided `flavor`
    pub flavor_rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    pub target_frameworks: Vec<String>,
    pub references: ReferenceSet,
    /// Opened directly or listed by the solution
    pub is_root: bool,
    /// Only built for root projects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<ProjectTree>,
    /// Non-framework CLR namespaces the root's markup maps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub markup_namespaces: Vec<String>,
}

impl ProjectReport {
    pub(super) fn new(descriptor: &ProjectDescriptor, is_root: bool, tree: Option<ProjectTree>) -> Self {
        Self {
            name: descriptor.name(),
            path: descriptor.path.clone(),
            flavor: descriptor.flavor,
            flavor_rule: descriptor.flavor_rule,
            sdk: descriptor.sdk.clone(),
            target_frameworks: descriptor.target_frameworks.clone(),
            references: descriptor.references.clone(),
            is_root,
            tree,
            markup_namespaces: Vec::new(),
        }
    }
}

/// Everything one open action produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceReport {
    pub mode: WorkspaceMode,
    /// Descriptor or solution that was opened
    pub target: PathBuf,
    /// Dependencies before dependents
    pub projects: Vec<ProjectReport>,
    /// Resolution order
    pub artifacts: Vec<ResolvedArtifact>,
    pub introspection: IntrospectionReport,
    /// Batches this pass added to the catalog
    pub catalog: Vec<CatalogBatch>,
    pub diagnostics: Vec<Diagnostic>,
}

impl WorkspaceReport {
    pub fn roots(&self) -> impl Iterator<Item = &ProjectReport> {
        self.projects.iter().filter(|p| p.is_root)
    }

    pub fn control_count(&self) -> usize {
        self.catalog.iter().map(|b| b.controls.len()).sum()
    }
}
