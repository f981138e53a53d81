use std::cell::Cell;
use std::rc::Rc;

use pathstore::{diff, format_path, tree, ChangedPaths, Snapshot, Store, StoreOptions, SubscriptionRegistry, Value};
use pathstore_path::{ancestors, overlaps};
use proptest::prelude::*;

fn key() -> impl Strategy<Value = String> {
    "[a-d]"
}

fn path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(key(), 1..4)
}

fn leaf() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (-100i64..100).prop_map(serde_json::Value::from),
        "[a-z]{0,3}".prop_map(serde_json::Value::from),
    ]
}

fn node() -> impl Strategy<Value = serde_json::Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(key(), inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map(key(), node(), 0..5).prop_map(|m| {
        Snapshot::from_json(serde_json::Value::Object(m.into_iter().collect())).unwrap()
    })
}

fn is_node(value: &Value) -> bool {
    matches!(value, Value::List(_) | Value::Map(_))
}

proptest! {
    #[test]
    fn set_shares_every_untouched_subtree(prev in snapshot(), path in path(), value in node()) {
        let next = tree::set(&prev, &path, Value::from(value)).unwrap();
        prop_assert!(!prev.ptr_eq(&next));

        let mut before = Some(prev.to_value());
        let mut after = next.to_value();
        for segment in &path {
            let (Some(Value::Map(b)), Value::Map(a)) = (&before, &after) else {
                break;
            };
            for (k, child) in b.iter() {
                if k != segment && is_node(child) {
                    prop_assert!(child.ptr_eq(a.get(k).unwrap()), "sibling {} copied", k);
                }
            }
            let (b_next, a_next) = (b.get(segment).cloned(), a.get(segment).cloned().unwrap());
            before = b_next;
            after = a_next;
        }
    }

    #[test]
    fn set_then_get_returns_value(prev in snapshot(), path in path(), value in node()) {
        let value = Value::from(value);
        let next = tree::set(&prev, &path, value.clone()).unwrap();
        prop_assert_eq!(tree::get(&next, &path), Some(value));
    }

    #[test]
    fn delete_of_unresolvable_path_keeps_identity(prev in snapshot(), path in path()) {
        let mut missing = vec!["zz".to_string()];
        missing.extend(path.iter().cloned());
        prop_assert!(tree::delete(&prev, &missing).unwrap().ptr_eq(&prev));

        if tree::get(&prev, &path).is_none() {
            prop_assert!(tree::delete(&prev, &path).unwrap().ptr_eq(&prev));
        }
    }

    #[test]
    fn diff_reports_path_and_every_ancestor(prev in snapshot(), path in path(), n in 0i64..100) {
        // Make every intermediate a map holding a known leaf first.
        let prev = tree::set(&prev, &path, Value::from(-1)).unwrap();
        let next = tree::set(&prev, &path, Value::from(n)).unwrap();

        let changed = diff(&prev, &next);
        let formatted = format_path(&path);
        prop_assert!(changed.contains(&formatted));
        for ancestor in ancestors(&formatted) {
            prop_assert!(changed.contains(ancestor), "missing ancestor {}", ancestor);
        }
    }

    #[test]
    fn noop_delete_notifies_nobody(prev in snapshot(), path in path()) {
        let store = Store::new(prev.clone(), StoreOptions::default());
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let _sub = store.subscribe_fn("", move |_| counter.set(counter.get() + 1));

        let mut missing = vec!["zz".to_string()];
        missing.extend(path);
        store.delete_state(missing).unwrap();

        prop_assert_eq!(fired.get(), 0);
        prop_assert!(store.snapshot().ptr_eq(&prev));
        prop_assert!(store.metrics().samples.is_empty());
    }

    #[test]
    fn plain_changed_paths_match_symmetrically(changed in path(), listener in path()) {
        let (changed, listener) = (format_path(&changed), format_path(&listener));
        let registry = SubscriptionRegistry::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let _sub = registry.subscribe(listener.clone(), Rc::new(move |_: &Snapshot| counter.set(counter.get() + 1)));

        let set: ChangedPaths = [changed.clone()].into_iter().collect();
        registry.notify(&Snapshot::default(), &set);
        prop_assert_eq!(fired.get() == 1, overlaps(&changed, &listener));
    }
}
