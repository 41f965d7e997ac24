//! Property-based tests for tag version ordering

use drui::registry::tag_sort_key;
use proptest::prelude::*;

proptest! {
    #[test]
    fn latest_sorts_after_any_tag(tag in "[a-zA-Z0-9._-]{1,16}") {
        prop_assume!(!tag.eq_ignore_ascii_case("latest"));
        prop_assert!(tag_sort_key(&tag) < tag_sort_key("latest"));
    }

    #[test]
    fn numeric_versions_order_by_value(
        a in (0u64..500, 0u64..500, 0u64..500),
        b in (0u64..500, 0u64..500, 0u64..500),
    ) {
        let left = format!("{}.{}.{}", a.0, a.1, a.2);
        let right = format!("{}.{}.{}", b.0, b.1, b.2);
        prop_assert_eq!(tag_sort_key(&left).cmp(&tag_sort_key(&right)), a.cmp(&b));
    }
}
