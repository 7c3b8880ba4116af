//! Domain Services
//!
//! The resolution components, leaves first. Filesystem discovery happens
//! here; descriptor parsing and binary metadata go through ports.

mod artifact_introspector;
mod build_output;
mod flavor_detector;
mod markup_namespaces;
mod package_lookup;
mod project_tree_builder;
mod reference_resolver;
mod scan;
mod solution_aggregator;

pub use artifact_introspector::{ArtifactIntrospector, IntrospectionOptions, IntrospectionReport};
pub use build_output::{BuildOutput, BuildOutputLocator, BuildOutputOptions, DEFAULT_OUTPUT_ROOT};
pub use flavor_detector::{
    apply_flavor, detect_flavor, sniff_markup, FlavorDecision, FlavorProbe, FALLBACK_FLAVOR,
    FLAVOR_PREDICATES,
};
pub use markup_namespaces::{markup_namespaces, namespaces_in};
pub use package_lookup::{
    compare_versions, CacheKind, PackageBinaries, PackageCacheLookup, PackageLookup,
    PackageLookupOptions, DEFAULT_BINARY_FOLDERS, DEFAULT_LOCAL_FOLDER_NAME,
};
pub use project_tree_builder::ProjectTreeBuilder;
pub use reference_resolver::{normalize_path, Entry, ReferenceResolver, ResolutionSession};
pub use solution_aggregator::{SolutionAggregator, SolutionPass};
