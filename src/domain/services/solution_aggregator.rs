//! Solution aggregation
//!
//! Resolves and introspects every member of a solution against one session
//! and one catalog.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::entities::ControlCatalog;
use crate::domain::ports::{DescriptorError, SolutionReader};
use crate::domain::value_objects::{Diagnostic, DiagnosticKind};

use super::artifact_introspector::{ArtifactIntrospector, IntrospectionReport};
use super::reference_resolver::{
    descriptor_diagnostic, Entry, ReferenceResolver, ResolutionSession,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionPass {
    /// Members listed by the solution that exist on disk
    pub members: Vec<PathBuf>,
    /// Descriptor opened instead when no member was usable
    pub fallback: Option<PathBuf>,
    pub introspection: IntrospectionReport,
}

pub struct SolutionAggregator<'a> {
    solutions: &'a dyn SolutionReader,
    resolver: &'a ReferenceResolver<'a>,
    introspector: &'a ArtifactIntrospector<'a>,
}

impl<'a> SolutionAggregator<'a> {
    pub fn new(
        solutions: &'a dyn SolutionReader,
        resolver: &'a ReferenceResolver<'a>,
        introspector: &'a ArtifactIntrospector<'a>,
    ) -> Self {
        Self {
            solutions,
            resolver,
            introspector,
        }
    }

    pub fn aggregate(
        &self,
        solution: &Path,
        session: &mut ResolutionSession,
        catalog: &mut ControlCatalog,
    ) -> Result<SolutionPass, DescriptorError> {
        let listed = self.solutions.read_members(solution)?;
        let mut pass = SolutionPass::default();

        for member in listed {
            if member.is_file() {
                pass.members.push(member);
            } else {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::UnresolvableReference,
                    &member,
                    "solution member does not exist",
                );
                warn!("{}", diagnostic);
                session.diagnostics.push(diagnostic);
            }
        }
        info!(
            "{}: {} usable member projects",
            solution.display(),
            pass.members.len()
        );

        if pass.members.is_empty() {
            let fallback = self.solutions.fallback_descriptor(solution)?;
            info!("falling back to {}", fallback.display());
            self.resolve_member(&fallback, true, session, catalog, &mut pass)?;
            pass.fallback = Some(fallback);
            return Ok(pass);
        }

        for member in pass.members.clone() {
            self.resolve_member(&member, false, session, catalog, &mut pass)?;
        }
        Ok(pass)
    }

    /// A member that fails to parse only aborts its own resolution; the
    /// fallback descriptor is the root of the pass, so its failure propagates.
    fn resolve_member(
        &self,
        path: &Path,
        is_fallback: bool,
        session: &mut ResolutionSession,
        catalog: &mut ControlCatalog,
        pass: &mut SolutionPass,
    ) -> Result<(), DescriptorError> {
        let mark = session.artifacts.mark();
        let flavor = match self.resolver.resolve(path, Entry::Root, session) {
            Ok(Some(flavor)) => flavor,
            Ok(None) => return Ok(()),
            Err(err) if is_fallback => return Err(err),
            Err(err) => {
                let diagnostic = descriptor_diagnostic(path, &err);
                warn!("{}", diagnostic);
                session.diagnostics.push(diagnostic);
                return Ok(());
            }
        };

        // An override of an artifact an earlier member already scanned must
        // replace that member's registration.
        for artifact in session.artifacts.replaced_since(mark) {
            if catalog.release_superseded(&artifact.logical_name, &artifact.path) {
                debug!(
                    "{} now comes from {}",
                    artifact.logical_name,
                    artifact.path.display()
                );
            }
        }

        let changed = session.artifacts.changed_since(mark);
        let report = self.introspector.introspect(&changed, flavor, catalog);
        session.diagnostics.extend(report.diagnostics.iter().cloned());
        pass.introspection.merge(report);
        Ok(())
    }
}
