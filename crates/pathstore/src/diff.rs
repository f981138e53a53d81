//! Changed-path detection between two snapshots.

use std::sync::Arc;

use indexmap::IndexMap;
use pathstore_path::join;

use crate::value::{deep_equal, Map, Snapshot, Value};

/// How a path in a [`ChangedPaths`] set changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The value at the path was added, removed, or replaced.
    Value,
    /// The path is a map and something below it changed.
    Contents,
}

/// Dot-joined paths that differ between two snapshots, in discovery order.
///
/// Paths collected from plain strings are [`Change::Value`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedPaths {
    paths: IndexMap<String, Change>,
}

impl ChangedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`. A path recorded as both kinds keeps [`Change::Value`]
    /// and its first position.
    pub fn insert(&mut self, path: impl Into<String>, change: Change) {
        let slot = self.paths.entry(path.into()).or_insert(change);
        if change == Change::Value {
            *slot = Change::Value;
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains_key(path)
    }

    pub fn change(&self, path: &str) -> Option<Change> {
        self.paths.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.paths.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Change)> + '_ {
        self.paths.iter().map(|(path, change)| (path.as_str(), *change))
    }
}

impl<S: Into<String>> FromIterator<S> for ChangedPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut changed = ChangedPaths::new();
        for path in iter {
            changed.insert(path, Change::Value);
        }
        changed
    }
}

/// Compute the paths whose value differs between `prev` and `next`.
///
/// Maps are recursed into so that a change to `user.name` does not report
/// `user.age`. Added or removed keys and unequal non-map values are
/// [`Change::Value`] at their own path and mark their parent as
/// [`Change::Contents`]; for top-level keys the parent is the root marker
/// `""`. A map with any change below it is marked [`Change::Contents`] too,
/// so every ancestor of a changed value is present. Lists are compared
/// wholesale by content.
pub fn diff(prev: &Snapshot, next: &Snapshot) -> ChangedPaths {
    let mut changed = ChangedPaths::new();
    if !prev.ptr_eq(next) {
        diff_maps(prev.as_map(), next.as_map(), "", &mut changed);
    }
    changed
}

fn diff_maps(prev: &Map, next: &Map, parent: &str, changed: &mut ChangedPaths) {
    let keys = prev
        .keys()
        .chain(next.keys().filter(|key| !prev.contains_key(*key)));

    for key in keys {
        let current = join(parent, key);
        match (prev.get(key), next.get(key)) {
            (Some(Value::Map(before)), Some(Value::Map(after))) => {
                if Arc::ptr_eq(before, after) {
                    continue;
                }
                let seen = changed.len();
                diff_maps(before, after, &current, changed);
                if changed.len() > seen {
                    changed.insert(current, Change::Contents);
                }
            }
            (Some(before), Some(after)) => {
                if !deep_equal(before, after) {
                    changed.insert(current, Change::Value);
                    changed.insert(parent, Change::Contents);
                }
            }
            // Added or removed
            _ => {
                changed.insert(current, Change::Value);
                changed.insert(parent, Change::Contents);
            }
        }
    }
}
