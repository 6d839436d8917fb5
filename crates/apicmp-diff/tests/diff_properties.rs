//! Property tests for the structural differ
//!
//! Random JSON trees are generated with proptest and checked against the
//! guarantees callers rely on: equal trees never diverge, key presence is
//! checked symmetrically, superset mode tolerates extra keys and array
//! length mismatches short-circuit element comparison.

use apicmp_diff::{DiffOptions, Differ, DivergenceKind};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn object() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,6}", tree(), 0..6)
        .prop_map(|m| m.into_iter().collect::<Map<_, _>>())
}

proptest! {
    #[test]
    fn equal_trees_never_diverge(value in tree()) {
        prop_assert!(Differ::default().diff(&value, &value.clone()).is_empty());
        let superset = Differ::new(DiffOptions::new().superset(true));
        prop_assert!(superset.diff(&value, &value.clone()).is_empty());
    }

    #[test]
    fn key_presence_is_symmetric(base in object(), extra in "[A-Z]{1,6}", v in 0i64..1000) {
        let mut with_key = base.clone();
        with_key.insert(extra.clone(), json!(v));
        let with_key = Value::Object(with_key);
        let without_key = Value::Object(base);

        let differ = Differ::default();
        let forward = differ.diff(&with_key, &without_key);
        let backward = differ.diff(&without_key, &with_key);

        prop_assert_eq!(forward.len(), 1);
        prop_assert_eq!(&forward[0].path, &extra);
        prop_assert_eq!(forward[0].kind, DivergenceKind::Missing);
        prop_assert_eq!(backward.len(), 1);
        prop_assert_eq!(&backward[0].path, &extra);
        prop_assert_eq!(backward[0].kind, DivergenceKind::Extra);
    }

    #[test]
    fn superset_tolerates_extra_keys_only(base in object(), extra in "[A-Z]{1,6}", v in 0i64..1000) {
        let mut bigger = base.clone();
        bigger.insert(extra.clone(), json!(v));
        let bigger = Value::Object(bigger);
        let smaller = Value::Object(base);

        let differ = Differ::new(DiffOptions::new().superset(true));
        prop_assert!(differ.diff(&smaller, &bigger).is_empty());

        let diffs = differ.diff(&bigger, &smaller);
        prop_assert_eq!(diffs.len(), 1);
        prop_assert_eq!(&diffs[0].path, &extra);
    }

    #[test]
    fn array_length_mismatch_is_one_divergence(
        before in prop::collection::vec(any::<i64>(), 0..10),
        after in prop::collection::vec(any::<i64>(), 0..10),
    ) {
        prop_assume!(before.len() != after.len());
        let diffs = Differ::default().diff(&json!({"items": before}), &json!({"items": after}));
        prop_assert_eq!(diffs.len(), 1);
        prop_assert_eq!(diffs[0].path.as_str(), "items.length");
        prop_assert_eq!(diffs[0].kind, DivergenceKind::Length);
    }
}

#[test]
fn test_ignored_path_still_reports_siblings() {
    let ignore = std::sync::Arc::new(|path: &str| path == "a.b");
    let differ = Differ::new(DiffOptions::new().with_ignore(ignore));

    let diffs = differ.diff(&json!({"a": {"b": 1, "c": 2}}), &json!({"a": {"b": 99, "c": 5}}));
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].path, "a.c");
}
