use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::{map_equal, Map, Value};
use crate::error::StoreError;
use crate::tree;

/// One immutable version of the whole state tree.
///
/// The root is always a map. Cloning is a reference-count bump; two clones of
/// the same commit are [`ptr_eq`](Snapshot::ptr_eq).
#[derive(Clone, Debug, Default)]
pub struct Snapshot(Arc<Map>);

impl Snapshot {
    pub fn new(root: Map) -> Self {
        Snapshot(Arc::new(root))
    }

    /// Parse a JSON document whose top level must be an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, StoreError> {
        Snapshot::try_from(Value::from(json))
    }

    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_map(&self) -> &Arc<Map> {
        &self.0
    }

    /// Resolve a decoded path. The empty path resolves to the whole tree.
    pub fn resolve(&self, path: &[String]) -> Option<Value> {
        tree::get(self, path)
    }

    pub fn to_value(&self) -> Value {
        Value::Map(Arc::clone(&self.0))
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.to_value().to_json()
    }
}

impl Deref for Snapshot {
    type Target = Map;

    fn deref(&self) -> &Map {
        &self.0
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || map_equal(&self.0, &other.0)
    }
}

impl From<Map> for Snapshot {
    fn from(root: Map) -> Self {
        Snapshot::new(root)
    }
}

impl From<Arc<Map>> for Snapshot {
    fn from(root: Arc<Map>) -> Self {
        Snapshot(root)
    }
}

impl TryFrom<Value> for Snapshot {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(root) => Ok(Snapshot(root)),
            other => Err(StoreError::RootNotMap {
                found: other.type_name(),
            }),
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
