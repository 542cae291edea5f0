//! Property tests for tree flattening.

use proptest::prelude::*;
use serde_json::{Map, Value};
use vouch_context::{flatten, leaves, publish, ContextStore, InMemoryContextStore, Origin};

fn arb_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..5).prop_map(|pairs| {
                let mut members = Map::new();
                for (k, v) in pairs {
                    members.insert(k, v);
                }
                Value::Object(members)
            }),
        ]
    })
}

fn count_scalars(tree: &Value) -> usize {
    match tree {
        Value::Array(items) => items.iter().map(count_scalars).sum(),
        Value::Object(members) => members.values().map(count_scalars).sum(),
        _ => 1,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..Default::default()
    })]

    /// Property: flattening the same tree twice yields identical pairs.
    #[test]
    fn flattening_is_deterministic(tree in arb_tree()) {
        prop_assert_eq!(flatten(&tree), flatten(&tree));
    }

    /// Property: one pair per scalar leaf, with distinct paths.
    #[test]
    fn one_pair_per_scalar(tree in arb_tree()) {
        let pairs = flatten(&tree);
        prop_assert_eq!(pairs.len(), count_scalars(&tree));

        let mut paths: Vec<&String> = pairs.iter().map(|(p, _)| p).collect();
        paths.sort();
        paths.dedup();
        prop_assert_eq!(paths.len(), pairs.len());
    }

    /// Property: every flattened leaf can be read back from the store.
    #[test]
    fn published_leaves_are_readable(tree in arb_tree()) {
        let store = InMemoryContextStore::new();
        publish(&store, Origin::ResponseData, &tree).unwrap();
        for (path, value) in leaves(&tree) {
            let stored = store.get(&Origin::ResponseData.key(&path)).unwrap();
            prop_assert_eq!(stored.as_ref(), Some(value));
        }
    }
}
