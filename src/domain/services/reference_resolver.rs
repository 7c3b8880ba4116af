//! Reference resolver
//!
//! Depth-first walk over a project's sibling-project, package and direct
//! references. One `ResolutionSession` is threaded through the whole walk
//! (and through every member of a solution), so each descriptor is resolved
//! at most once however many paths reach it.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::domain::entities::{
    ArtifactList, ArtifactOrigin, Flavor, ProjectDescriptor, PushOutcome, ResolvedArtifact,
};
use crate::domain::ports::{DescriptorError, DescriptorReader};
use crate::domain::value_objects::{Diagnostic, DiagnosticKind, ProcessedSet};

use super::build_output::BuildOutputLocator;
use super::package_lookup::{PackageCacheLookup, PackageLookup};

/// Mutable state for one open action.
#[derive(Debug, Default)]
pub struct ResolutionSession {
    pub processed: ProcessedSet,
    pub artifacts: ArtifactList,
    pub diagnostics: Vec<Diagnostic>,
    /// Every descriptor read, dependencies before dependents.
    pub projects: Vec<ProjectDescriptor>,
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self, path: &Path) -> Option<&ProjectDescriptor> {
        self.projects.iter().find(|p| p.path == path)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// How the walk reached a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Opened directly, or listed by a solution
    Root,
    /// Named by another project's `ProjectReference`
    Sibling,
}

pub struct ReferenceResolver<'a> {
    reader: &'a dyn DescriptorReader,
    packages: &'a PackageCacheLookup,
    outputs: &'a BuildOutputLocator,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        reader: &'a dyn DescriptorReader,
        packages: &'a PackageCacheLookup,
        outputs: &'a BuildOutputLocator,
    ) -> Self {
        Self {
            reader,
            packages,
            outputs,
        }
    }

    /// Resolve a descriptor and everything it references into `session`.
    ///
    /// Returns the project's flavor, or `None` when the descriptor was already
    /// processed in this session. Only a root descriptor that cannot be read
    /// is an error; the same failure for a sibling becomes a diagnostic.
    pub fn resolve(
        &self,
        path: &Path,
        entry: Entry,
        session: &mut ResolutionSession,
    ) -> Result<Option<Flavor>, DescriptorError> {
        let path = normalize_path(path);
        if !session.processed.insert(&path) {
            trace!("{} already processed", path.display());
            return Ok(None);
        }

        let descriptor = match self.reader.read_descriptor(&path) {
            Ok(descriptor) => descriptor,
            Err(err) if entry == Entry::Root => return Err(err),
            Err(err) => {
                session.report(descriptor_diagnostic(&path, &err));
                return Ok(None);
            }
        };
        info!(
            "resolving {} ({}, {} project / {} package / {} direct references)",
            descriptor.name(),
            descriptor.flavor,
            descriptor.references.projects.len(),
            descriptor.references.packages.len(),
            descriptor.references.direct.len()
        );

        self.resolve_siblings(&descriptor, session);
        self.resolve_packages(&descriptor, session);
        self.resolve_direct(&descriptor, session);
        self.resolve_own_output(&descriptor, entry, session);

        let flavor = descriptor.flavor;
        session.projects.push(descriptor);
        Ok(Some(flavor))
    }

    fn resolve_siblings(&self, descriptor: &ProjectDescriptor, session: &mut ResolutionSession) {
        for include in &descriptor.references.projects {
            let target = normalize_path(&descriptor.folder().join(slashed(include)));
            if !target.is_file() {
                session.report(Diagnostic::new(
                    DiagnosticKind::UnresolvableReference,
                    &target,
                    format!("{} references a project that does not exist", descriptor.name()),
                ));
                continue;
            }
            // Sibling failures are recorded as diagnostics, never returned.
            let _ = self.resolve(&target, Entry::Sibling, session);
        }
    }

    fn resolve_packages(&self, descriptor: &ProjectDescriptor, session: &mut ResolutionSession) {
        for package in &descriptor.references.packages {
            match self.packages.lookup(descriptor.folder(), package) {
                PackageLookup::Found(found) => {
                    for binary in found.binaries {
                        add(session, binary, ArtifactOrigin::Package, &descriptor.path);
                    }
                }
                PackageLookup::SystemPackage => {}
                PackageLookup::NoBinaries { package_folder } => {
                    debug!(
                        "package {} at {} has no loadable binaries",
                        package.name,
                        package_folder.display()
                    );
                }
                PackageLookup::NotFound => session.report(Diagnostic::new(
                    DiagnosticKind::UnresolvableReference,
                    &descriptor.path,
                    format!(
                        "package {} {} not found in any package cache",
                        package.name,
                        package.version.as_deref().unwrap_or("(any version)")
                    ),
                )),
            }
        }
    }

    fn resolve_direct(&self, descriptor: &ProjectDescriptor, session: &mut ResolutionSession) {
        for reference in &descriptor.references.direct {
            let Some(hint) = &reference.hint_path else {
                trace!("reference {} has no hint path", reference.name);
                continue;
            };
            let full = normalize_path(&descriptor.folder().join(slashed(hint)));
            if full.is_file() {
                add(session, full, ArtifactOrigin::Direct, &descriptor.path);
            } else {
                session.report(Diagnostic::new(
                    DiagnosticKind::UnresolvableReference,
                    &full,
                    format!("hint path for {} does not exist", reference.name),
                ));
            }
        }
    }

    fn resolve_own_output(
        &self,
        descriptor: &ProjectDescriptor,
        entry: Entry,
        session: &mut ResolutionSession,
    ) {
        let origin = match entry {
            Entry::Root => ArtifactOrigin::OwnOutput,
            Entry::Sibling => ArtifactOrigin::SiblingProject,
        };
        match self.outputs.locate(descriptor) {
            Some(output) => add(session, output.path, origin, &descriptor.path),
            None => session.report(Diagnostic::new(
                DiagnosticKind::UnresolvableReference,
                self.outputs.output_root(descriptor),
                format!("no build output found for {}", descriptor.name()),
            )),
        }
    }
}

fn add(session: &mut ResolutionSession, path: PathBuf, origin: ArtifactOrigin, by: &Path) {
    let artifact = ResolvedArtifact::new(path, origin, by);
    let shown = artifact.path.display().to_string();
    match session.artifacts.push(artifact) {
        PushOutcome::Added => debug!("artifact {} ({})", shown, origin.label()),
        PushOutcome::Replaced => debug!("artifact {} ({}) overrides earlier", shown, origin.label()),
        PushOutcome::Duplicate => trace!("artifact {} already listed", shown),
    }
}

pub(crate) fn descriptor_diagnostic(path: &Path, err: &DescriptorError) -> Diagnostic {
    let kind = match err {
        DescriptorError::MissingDescriptor { .. } => DiagnosticKind::MissingDescriptor,
        DescriptorError::MalformedDescriptor { .. } => DiagnosticKind::MalformedDescriptor,
        DescriptorError::Io { .. } => DiagnosticKind::UnresolvableReference,
    };
    Diagnostic::new(kind, path, err.to_string())
}

fn slashed(raw: &str) -> String {
    raw.trim().replace('\\', "/")
}

/// Canonical form when the path exists, lexical `.`/`..` folding otherwise.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
