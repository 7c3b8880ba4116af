//! Property tests for natural version ordering.

use std::cmp::Ordering;

use proptest::prelude::*;

use quarry::domain::services::compare_versions;

fn version() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u32..30, 1..5)
        .prop_map(|parts| parts.iter().map(u32::to_string).collect::<Vec<_>>().join("."))
}

proptest! {
    /// PROPERTY: comparison is antisymmetric for any pair of names.
    #[test]
    fn property_compare_is_antisymmetric(a in "[A-Za-z0-9.-]{0,12}", b in "[A-Za-z0-9.-]{0,12}") {
        prop_assert_eq!(compare_versions(&a, &b), compare_versions(&b, &a).reverse());
    }

    /// PROPERTY: dotted numeric versions order component-wise by value.
    #[test]
    fn property_numeric_versions_order_by_value(a in version(), b in version()) {
        let parse = |v: &str| v.split('.').map(|p| p.parse::<u32>().unwrap()).collect::<Vec<_>>();
        let expected = parse(&a).cmp(&parse(&b));
        if expected != Ordering::Equal {
            prop_assert_eq!(compare_versions(&a, &b), expected);
        }
    }
}
