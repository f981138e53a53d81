//! Copy-on-write edits of a state tree.
//!
//! Every edit shallow-copies the maps along the edited path and leaves all
//! other nodes shared with the input snapshot.

use std::sync::Arc;

use crate::error::StoreError;
use crate::value::{Map, Snapshot, Value};

// ── Read ──────────────────────────────────────────────────────────────────

/// Resolve `path` against `tree`.
///
/// Maps are walked by key and lists by decimal index. Returns `None` as soon
/// as a segment is missing; the empty path yields the whole tree.
pub fn get(tree: &Snapshot, path: &[String]) -> Option<Value> {
    let Some((first, rest)) = path.split_first() else {
        return Some(tree.to_value());
    };
    let mut current = tree.get(first)?;
    for segment in rest {
        current = current.child(segment)?;
    }
    Some(current.clone())
}

// ── Write ─────────────────────────────────────────────────────────────────

/// Replace the value at `path`, creating intermediate maps as needed.
///
/// An intermediate that is absent or not a map is replaced by a fresh empty
/// map, discarding whatever scalar or list was there.
pub fn set(tree: &Snapshot, path: &[String], value: Value) -> Result<Snapshot, StoreError> {
    if path.is_empty() {
        return Err(StoreError::EmptyPath { op: "set" });
    }
    Ok(Snapshot::new(set_in(tree.as_map(), path, value)))
}

fn set_in(map: &Map, path: &[String], value: Value) -> Map {
    let mut next = map.clone();
    let Some((key, rest)) = path.split_first() else {
        return next;
    };
    if rest.is_empty() {
        next.insert(key.clone(), value);
        return next;
    }
    let child = match map.get(key) {
        Some(Value::Map(inner)) => set_in(inner, rest, value),
        _ => set_in(&Map::new(), rest, value),
    };
    next.insert(key.clone(), Value::Map(Arc::new(child)));
    next
}

/// Shallow union of `partial` over the root. Whole values are replaced; no
/// nested merging happens.
pub fn merge(tree: &Snapshot, partial: &Map) -> Snapshot {
    let mut next = Map::clone(tree.as_map());
    for (key, value) in partial {
        next.insert(key.clone(), value.clone());
    }
    Snapshot::new(next)
}

/// Remove the key at `path`.
///
/// When there is nothing to remove (an intermediate segment is absent or not
/// a map, or the final key is absent) the input snapshot is returned as is,
/// so callers can detect the no-op with [`Snapshot::ptr_eq`].
pub fn delete(tree: &Snapshot, path: &[String]) -> Result<Snapshot, StoreError> {
    if path.is_empty() {
        return Err(StoreError::EmptyPath { op: "delete" });
    }
    Ok(match delete_in(tree.as_map(), path) {
        Some(next) => Snapshot::new(next),
        None => tree.clone(),
    })
}

fn delete_in(map: &Map, path: &[String]) -> Option<Map> {
    let (key, rest) = path.split_first()?;
    if rest.is_empty() {
        if !map.contains_key(key) {
            return None;
        }
        let mut next = map.clone();
        next.shift_remove(key);
        return Some(next);
    }
    let Some(Value::Map(inner)) = map.get(key) else {
        return None;
    };
    let child = delete_in(inner, rest)?;
    let mut next = map.clone();
    next.insert(key.clone(), Value::Map(Arc::new(child)));
    Some(next)
}
