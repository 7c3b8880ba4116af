//! Open Workspace Use Case implementation

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::domain::entities::ControlCatalog;
use crate::domain::ports::{DescriptorReader, ModuleInspector, SolutionReader};
use crate::domain::services::{
    markup_namespaces, normalize_path, ArtifactIntrospector, BuildOutputLocator, Entry,
    IntrospectionReport, PackageCacheLookup, ProjectTreeBuilder, ReferenceResolver,
    ResolutionSession, SolutionAggregator,
};
use crate::error::{QuarryError, QuarryResult};
use crate::infrastructure::descriptor::{locate_target, OpenTarget};

use super::result::{ProjectReport, WorkspaceMode, WorkspaceReport};

/// Open Workspace Use Case
///
/// Generic over the descriptor reader and module inspector so tests can
/// substitute either side.
pub struct OpenWorkspaceUseCase<R, M>
where
    R: DescriptorReader + SolutionReader,
    M: ModuleInspector,
{
    reader: R,
    inspector: M,
    config: Config,
}

impl<R, M> OpenWorkspaceUseCase<R, M>
where
    R: DescriptorReader + SolutionReader,
    M: ModuleInspector,
{
    pub fn new(reader: R, inspector: M, config: Config) -> Self {
        Self {
            reader,
            inspector,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a descriptor, solution, or folder.
    ///
    /// `catalog` outlives the call: modules it already knows are not
    /// rescanned, and their controls count as known bases.
    pub fn execute(&self, path: &Path, catalog: &mut ControlCatalog) -> QuarryResult<WorkspaceReport> {
        fs::metadata(path).map_err(|e| QuarryError::RootInaccessible {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let target = locate_target(path)?;
        info!("opening {}", target.path().display());

        let packages = PackageCacheLookup::new(self.config.package_options());
        let outputs = BuildOutputLocator::new(self.config.build_options());
        let resolver = ReferenceResolver::new(&self.reader, &packages, &outputs);
        let introspector =
            ArtifactIntrospector::new(&self.inspector, self.config.introspection_options());

        let mut session = ResolutionSession::new();
        let batches_before = catalog.batches().len();

        let (mode, roots, mut introspection) = match &target {
            OpenTarget::Project(descriptor) => {
                let report = match resolver.resolve(descriptor, Entry::Root, &mut session)? {
                    Some(flavor) => {
                        introspector.introspect(session.artifacts.as_slice(), flavor, catalog)
                    }
                    None => IntrospectionReport::default(),
                };
                session.diagnostics.extend(report.diagnostics.iter().cloned());
                (WorkspaceMode::Project, vec![descriptor.clone()], report)
            }
            OpenTarget::Solution(solution) => {
                let aggregator = SolutionAggregator::new(&self.reader, &resolver, &introspector);
                let pass = aggregator.aggregate(solution, &mut session, catalog)?;
                let roots = match pass.fallback {
                    Some(fallback) => vec![fallback],
                    None => pass.members,
                };
                (WorkspaceMode::Solution, roots, pass.introspection)
            }
        };
        let roots: Vec<PathBuf> = roots.iter().map(|p| normalize_path(p)).collect();

        let trees = ProjectTreeBuilder::new(self.config.scan_rules());
        let mut projects = Vec::with_capacity(session.projects.len());
        for descriptor in &session.projects {
            let is_root = roots.contains(&descriptor.path);
            let tree = is_root.then(|| trees.build(descriptor));
            let namespaces = tree.as_ref().map(markup_namespaces).unwrap_or_default();
            if !namespaces.is_empty() {
                let report = introspector.introspect_markup_namespaces(
                    &outputs.all_outputs(descriptor),
                    &namespaces,
                    descriptor.flavor,
                    catalog,
                );
                introspection.merge(report);
            }
            let mut project = ProjectReport::new(descriptor, is_root, tree);
            project.markup_namespaces = namespaces.into_iter().collect();
            projects.push(project);
        }

        info!(
            "opened {}: {} artifacts, {} new catalog batches, {} diagnostics",
            target.path().display(),
            session.artifacts.len(),
            catalog.batches().len().saturating_sub(batches_before),
            session.diagnostics.len()
        );

        Ok(WorkspaceReport {
            mode,
            target: target.path().to_path_buf(),
            projects,
            artifacts: session.artifacts.as_slice().to_vec(),
            introspection,
            catalog: catalog.batches().get(batches_before..).unwrap_or_default().to_vec(),
            diagnostics: session.diagnostics,
        })
    }
}
