//! Artifact introspection
//!
//! Reads the metadata of every candidate module in a pass and registers the
//! concrete control types each one defines. Inheritance is followed across
//! all modules loaded in the pass, every type the catalog recorded in earlier
//! passes, and the flavor's framework control hierarchy.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{
    logical_name_of, ControlCatalog, ControlCatalogEntry, Flavor, ResolvedArtifact,
};
use crate::domain::ports::{ModuleInspector, ModuleMetadata, TypeInfo};
use crate::domain::value_objects::{Diagnostic, DiagnosticKind, SystemModuleFilter};

#[derive(Debug, Clone, Default)]
pub struct IntrospectionOptions {
    pub system_modules: SystemModuleFilter,
    /// Additional fully-qualified base types that mark a control
    pub extra_base_types: Vec<String>,
}

/// What one introspection pass did to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntrospectionReport {
    pub registered: Vec<String>,
    pub empty: Vec<String>,
    pub skipped: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl IntrospectionReport {
    pub fn merge(&mut self, other: IntrospectionReport) {
        self.registered.extend(other.registered);
        self.empty.extend(other.empty);
        self.skipped.extend(other.skipped);
        self.diagnostics.extend(other.diagnostics);
    }
}

pub struct ArtifactIntrospector<'a> {
    inspector: &'a dyn ModuleInspector,
    options: IntrospectionOptions,
}

struct Loaded<'p> {
    artifact: &'p ResolvedArtifact,
    metadata: ModuleMetadata,
}

impl<'a> ArtifactIntrospector<'a> {
    pub fn new(inspector: &'a dyn ModuleInspector, options: IntrospectionOptions) -> Self {
        Self { inspector, options }
    }

    pub fn introspect(
        &self,
        artifacts: &[ResolvedArtifact],
        flavor: Flavor,
        catalog: &mut ControlCatalog,
    ) -> IntrospectionReport {
        let mut report = IntrospectionReport::default();
        let loaded = self.load_candidates(artifacts, catalog, &mut report);

        let index = type_index(loaded.iter().map(|m| &m.metadata));
        let bases = self.control_bases(flavor);

        // Decide every module before registering any, so a control's own
        // registration cannot change the outcome for a later module.
        let known: &ControlCatalog = catalog;
        let mut decided = Vec::with_capacity(loaded.len());
        for module in &loaded {
            let controls: Vec<ControlCatalogEntry> = module
                .metadata
                .types
                .iter()
                .filter(|t| t.is_instantiable())
                .filter(|t| derives_from_control(t, &index, &bases, known))
                .map(|t| ControlCatalogEntry {
                    name: t.name.clone(),
                    namespace: t.namespace.clone(),
                    module: module.artifact.logical_name.clone(),
                })
                .collect();
            decided.push((module.artifact, controls));
        }
        catalog.record_type_bases(index);

        for (artifact, controls) in decided {
            let module = artifact.logical_name.clone();
            if controls.is_empty() {
                debug!("{} has no palette controls", module);
                catalog.mark_empty(&module, &artifact.path);
                report.empty.push(module);
            } else {
                info!("{}: {} palette controls", module, controls.len());
                catalog.register_batch(module.clone(), artifact.path.clone(), controls);
                report.registered.push(module);
            }
        }

        report
    }

    /// Scans every binary under a project's output root for controls in the
    /// namespaces its markup declares. Modules without a match are left
    /// unregistered so a later full pass can still scan them.
    pub fn introspect_markup_namespaces(
        &self,
        outputs: &[PathBuf],
        namespaces: &BTreeSet<String>,
        flavor: Flavor,
        catalog: &mut ControlCatalog,
    ) -> IntrospectionReport {
        let mut report = IntrospectionReport::default();
        if namespaces.is_empty() {
            return report;
        }
        let bases = self.control_bases(flavor);
        let mut seen: HashSet<String> = HashSet::new();

        for path in outputs {
            let module = logical_name_of(path);
            if !seen.insert(module.to_ascii_lowercase()) {
                continue;
            }
            if catalog.is_registered(&module) || self.options.system_modules.is_system(&module) {
                trace!("skipping {}", module);
                report.skipped.push(module);
                continue;
            }
            let metadata = match self.inspector.inspect(path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!("not scanning {}: {}", path.display(), err);
                    continue;
                }
            };

            let index = type_index(std::iter::once(&metadata));
            let known: &ControlCatalog = catalog;
            let controls: Vec<ControlCatalogEntry> = metadata
                .types
                .iter()
                .filter(|t| namespaces.contains(&t.namespace))
                .filter(|t| t.is_instantiable())
                .filter(|t| derives_from_control(t, &index, &bases, known))
                .map(|t| ControlCatalogEntry {
                    name: t.name.clone(),
                    namespace: t.namespace.clone(),
                    module: module.clone(),
                })
                .collect();
            catalog.record_type_bases(index);

            if controls.is_empty() {
                trace!("{} has no controls in markup namespaces", module);
                continue;
            }
            info!("{}: {} controls from markup namespaces", module, controls.len());
            catalog.register_batch(module.clone(), path.clone(), controls);
            report.registered.push(module);
        }

        report
    }

    fn control_bases(&self, flavor: Flavor) -> HashSet<String> {
        std::iter::once(flavor.base_control_type())
            .chain(flavor.framework_controls().iter().copied())
            .map(str::to_string)
            .chain(self.options.extra_base_types.iter().cloned())
            .collect()
    }

    fn load_candidates<'p>(
        &self,
        artifacts: &'p [ResolvedArtifact],
        catalog: &ControlCatalog,
        report: &mut IntrospectionReport,
    ) -> Vec<Loaded<'p>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut loaded = Vec::new();

        for artifact in artifacts {
            let key = artifact.logical_name.to_ascii_lowercase();
            if !seen.insert(key) {
                trace!("{} repeated in this pass", artifact.logical_name);
                continue;
            }
            if catalog.is_registered(&artifact.logical_name)
                || self.options.system_modules.is_system(&artifact.logical_name)
            {
                trace!("skipping {}", artifact.logical_name);
                report.skipped.push(artifact.logical_name.clone());
                continue;
            }

            match self.inspector.inspect(&artifact.path) {
                Ok(metadata) => {
                    debug!(
                        "{}: {} type definitions",
                        artifact.logical_name,
                        metadata.types.len()
                    );
                    loaded.push(Loaded { artifact, metadata });
                }
                Err(err) => {
                    let diagnostic = Diagnostic::new(
                        DiagnosticKind::ModuleLoadFailure,
                        &artifact.path,
                        err.to_string(),
                    );
                    warn!("{}", diagnostic);
                    report.diagnostics.push(diagnostic);
                }
            }
        }

        loaded
    }
}

fn type_index<'m>(modules: impl Iterator<Item = &'m ModuleMetadata>) -> HashMap<String, Option<String>> {
    modules
        .flat_map(|m| m.types.iter())
        .map(|t| (t.full_name(), t.base_type.clone()))
        .collect()
}

/// Walks the base chain; the type itself never counts, only its ancestors.
/// Types outside the pass are looked up in the catalog's recorded bases.
fn derives_from_control(
    ty: &TypeInfo,
    index: &HashMap<String, Option<String>>,
    bases: &HashSet<String>,
    catalog: &ControlCatalog,
) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = ty.base_type.as_deref();

    while let Some(name) = current {
        if bases.contains(name) || catalog.is_known_control(name) {
            return true;
        }
        if !visited.insert(name) {
            return false;
        }
        current = match index.get(name) {
            Some(base) => base.as_deref(),
            None => catalog.base_of(name),
        };
    }
    false
}
