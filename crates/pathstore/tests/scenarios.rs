use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use pathstore::{Observer, Snapshot, Store, StoreOptions, Value};
use serde_json::json;

fn store(json: serde_json::Value) -> Store {
    Store::new(Snapshot::from_json(json).unwrap(), StoreOptions::default())
}

fn map(json: serde_json::Value) -> pathstore::Map {
    pathstore::Map::clone(Snapshot::from_json(json).unwrap().as_map())
}

/// Observer that records every snapshot it is handed.
fn recorder() -> (Rc<RefCell<Vec<Snapshot>>>, Observer) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let observer: Observer = Rc::new(move |snapshot: &Snapshot| sink.borrow_mut().push(snapshot.clone()));
    (seen, observer)
}

#[test]
fn set_top_level_notifies_root_once() {
    let s = store(json!({"count": 0}));
    let (seen, observer) = recorder();
    let _sub = s.subscribe("", observer);

    s.set_state("count", 5).unwrap();

    assert_eq!(s.get_state("count"), Some(Value::from(5)));
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].to_json(), json!({"count": 5}));
}

#[test]
fn sibling_observer_is_not_woken() {
    let s = store(json!({"user": {"name": "A", "age": 1}}));
    let (name, name_observer) = recorder();
    let (age, age_observer) = recorder();
    let _n = s.subscribe("user.name", name_observer);
    let _a = s.subscribe("user.age", age_observer);

    s.set_state("user.name", "B").unwrap();

    assert_eq!(name.borrow().len(), 1);
    assert!(age.borrow().is_empty());
}

#[test]
fn missing_path_delete_is_silent() {
    let s = store(json!({}));
    let before = s.snapshot();
    let (seen, observer) = recorder();
    let _sub = s.subscribe("", observer);

    s.delete_state("missing.path").unwrap();

    assert!(s.snapshot().ptr_eq(&before));
    assert!(seen.borrow().is_empty());
}

#[test]
fn merge_reports_new_key_and_root() {
    let s = store(json!({"a": {"b": 1}}));
    let (seen, observer) = recorder();
    let _sub = s.subscribe("", observer);

    let outcome = s
        .dispatch(pathstore::Action::Merge {
            partial: map(json!({"c": 2})),
        })
        .unwrap();

    assert_eq!(s.snapshot().to_json(), json!({"a": {"b": 1}, "c": 2}));
    assert!(outcome.changed.contains("c"));
    assert!(outcome.changed.contains(""));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn lists_notify_only_on_content_change() {
    let s = store(json!({"todos": [{"id": 1, "text": "a"}]}));
    let (first, first_observer) = recorder();
    let (second, second_observer) = recorder();
    let _a = s.subscribe("todos", first_observer);
    let _b = s.subscribe("todos", second_observer);

    // New list, same content.
    s.set_state("todos", Value::from(json!([{"id": 1, "text": "a"}]))).unwrap();
    assert!(first.borrow().is_empty());
    assert!(second.borrow().is_empty());

    s.set_state("todos", Value::from(json!([{"id": 1, "text": "a"}, {"id": 2, "text": "b"}])))
        .unwrap();
    assert_eq!(first.borrow().len(), 1);
    assert_eq!(second.borrow().len(), 1);
}

#[test]
fn replacing_a_subtree_wakes_nested_listeners() {
    let s = store(json!({"user": {"name": {"first": "A"}}}));
    let (seen, observer) = recorder();
    let _sub = s.subscribe("user.name.first", observer);

    s.set_state("user", Value::from("anonymous")).unwrap();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(s.get_state("user.name.first"), None);
}

#[test]
fn scalar_intermediate_is_overwritten() {
    let s = store(json!({"user": "guest"}));
    s.set_state("user.name", "A").unwrap();
    assert_eq!(s.snapshot().to_json(), json!({"user": {"name": "A"}}));
}

#[test]
fn observers_fire_in_collection_order_once_each() {
    let s = store(json!({"user": {"name": "A"}}));
    let order = Rc::new(RefCell::new(Vec::new()));
    let shared: Observer = {
        let order = Rc::clone(&order);
        Rc::new(move |_: &Snapshot| order.borrow_mut().push("shared"))
    };
    let root: Observer = {
        let order = Rc::clone(&order);
        Rc::new(move |_: &Snapshot| order.borrow_mut().push("root"))
    };
    let _a = s.subscribe("user", Rc::clone(&shared));
    let _b = s.subscribe("user.name", shared);
    let _c = s.subscribe("", root);

    s.set_state("user.name", "B").unwrap();

    assert_eq!(*order.borrow(), vec!["shared", "root"]);
}

#[test]
fn panicking_observer_stops_delivery_after_commit() {
    let s = store(json!({}));
    let _failing = s.subscribe_fn("a", |_| panic!("observer failed"));
    let later = Rc::new(Cell::new(0));
    let counter = Rc::clone(&later);
    let _counting = s.subscribe_fn("a", move |_| counter.set(counter.get() + 1));

    let result = catch_unwind(AssertUnwindSafe(|| s.set_state("a", 1)));

    assert!(result.is_err());
    assert_eq!(later.get(), 0);
    assert_eq!(s.get_state("a"), Some(Value::from(1)));
    // No timing sample for an aborted mutation.
    assert!(s.metrics().samples.is_empty());
}

#[test]
fn scope_hands_out_the_provided_store() {
    let scope = pathstore::StoreScope::empty();
    assert!(matches!(scope.store(), Err(pathstore::StoreError::NoActiveStore)));

    let s = store(json!({"a": 1}));
    let scope = pathstore::StoreScope::provide(s.clone());
    scope.store().unwrap().set_state("a", 2).unwrap();
    assert_eq!(s.get_state("a"), Some(Value::from(2)));
}
