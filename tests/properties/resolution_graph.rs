//! Property tests for resolution over random project graphs.

use std::collections::BTreeSet;

use proptest::prelude::*;

use quarry::config::Config;
use quarry::domain::services::{
    BuildOutputLocator, Entry, PackageCacheLookup, ReferenceResolver, ResolutionSession,
};
use quarry::domain::value_objects::ProcessedSet;
use quarry::FsDescriptorReader;
use tempfile::TempDir;

use crate::common::{write_build_output, ProjectFixture};

const MAX_PROJECTS: usize = 6;

fn graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1..=MAX_PROJECTS).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec((0..n, 0..n), 0..=n * 2),
        )
    })
}

fn reachable(n: usize, edges: &[(usize, usize)]) -> BTreeSet<usize> {
    let mut seen = BTreeSet::new();
    let mut pending = vec![0];
    while let Some(node) = pending.pop() {
        if node >= n || !seen.insert(node) {
            continue;
        }
        pending.extend(edges.iter().filter(|(from, _)| *from == node).map(|(_, to)| *to));
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every reachable descriptor is processed exactly once,
    /// cycles and self-references included.
    #[test]
    fn property_each_reachable_project_processed_once((n, edges) in graph()) {
        let dir = TempDir::new().unwrap();
        for node in 0..n {
            let name = format!("P{node}");
            let mut fixture = ProjectFixture::new();
            for (_, to) in edges.iter().filter(|(from, _)| *from == node) {
                fixture = fixture.sibling(&format!("../P{to}/P{to}.csproj"));
            }
            fixture.write(dir.path(), &name);
            write_build_output(&dir.path().join(&name), "Debug", "net8.0", &name, b"image");
        }

        let mut config = Config::default();
        config.packages.global_cache = Some(dir.path().join("global"));
        let reader = FsDescriptorReader::new(config.scan_rules());
        let packages = PackageCacheLookup::new(config.package_options());
        let outputs = BuildOutputLocator::new(config.build_options());
        let resolver = ReferenceResolver::new(&reader, &packages, &outputs);

        let mut session = ResolutionSession::new();
        resolver
            .resolve(&dir.path().join("P0/P0.csproj"), Entry::Root, &mut session)
            .unwrap();

        let expected = reachable(n, &edges);
        prop_assert_eq!(session.processed.len(), expected.len());
        prop_assert_eq!(session.projects.len(), expected.len());
        prop_assert_eq!(session.artifacts.len(), expected.len());
        // The root's own output always comes last.
        prop_assert_eq!(
            session.artifacts.as_slice().last().map(|a| a.logical_name.as_str()),
            Some("P0")
        );
    }

    /// PROPERTY: the processed set only grows and never exceeds the number of
    /// distinct paths offered to it.
    #[test]
    fn property_processed_set_is_monotonic(indices in proptest::collection::vec(0usize..8, 0..40)) {
        let mut set = ProcessedSet::new();
        let mut distinct = BTreeSet::new();
        let mut previous = 0;
        for i in indices {
            let path = std::path::PathBuf::from(format!("/work/P{i}/P{i}.csproj"));
            let fresh = distinct.insert(i);
            prop_assert_eq!(set.insert(&path), fresh);
            prop_assert!(set.len() >= previous);
            prop_assert_eq!(set.len(), distinct.len());
            previous = set.len();
        }
    }
}
