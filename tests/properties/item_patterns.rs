//! Property tests for item pattern handling.

use std::path::Path;

use proptest::prelude::*;

use quarry::domain::value_objects::{ItemPattern, PatternSet};

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.*?\\[\\]!-]{0,8}"
}

fn raw_pattern() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..5).prop_map(|parts| parts.join("\\"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: parsing and matching arbitrary patterns never panics.
    #[test]
    fn property_pattern_matching_never_panics(
        raws in proptest::collection::vec(raw_pattern(), 0..4),
        file in "[A-Za-z0-9_./]{0,24}",
    ) {
        let patterns: Vec<ItemPattern> = raws
            .iter()
            .flat_map(|raw| ItemPattern::parse_list(raw))
            .collect();
        for pattern in &patterns {
            let _ = pattern.base_folder();
            let _ = pattern.has_wildcard();
        }
        if let Ok(set) = PatternSet::build(Path::new("/work/App"), &patterns) {
            let _ = set.matches_file(&file);
            let _ = set.matches_file_or_parent(&file);
        }
    }

    /// PROPERTY: a literal relative path matches itself, whatever its case.
    #[test]
    fn property_literal_pattern_matches_itself(
        parts in proptest::collection::vec("[A-Za-z][A-Za-z0-9]{0,6}", 1..4),
    ) {
        let file = format!("{}.axaml", parts.join("/"));
        let pattern = ItemPattern::parse(&file.replace('/', "\\")).unwrap();
        let set = PatternSet::build(Path::new("/work/App"), [&pattern]).unwrap();
        prop_assert!(set.matches_file(&file));
        prop_assert!(set.matches_file(&file.to_uppercase()));
    }
}
