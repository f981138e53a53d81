//! `pathstore` command-line replay.
//!
//! Core logic behind the `pathstore` binary: read a JSON script, apply its
//! operations to a fresh store, and report the final state together with
//! which watched paths were notified by each operation.
//!
//! ```json
//! {
//!   "initial": {"user": {"name": "A", "age": 1}},
//!   "debug": false,
//!   "watch": ["user.name", "user.age", ""],
//!   "ops": [
//!     {"op": "set", "path": "user.name", "value": "B"},
//!     {"op": "merge", "value": {"theme": "dark"}},
//!     {"op": "delete", "path": ["user", "age"]}
//!   ]
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use pathstore_path::{decode_value, format_path};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;
use crate::store::{Action, Store, StoreOptions};
use crate::value::{Snapshot, Value};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("operation {index} failed: {source}")]
    Op {
        index: usize,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ── Script ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub initial: Option<serde_json::Value>,
    #[serde(flatten)]
    pub options: StoreOptions,
    #[serde(default)]
    pub watch: Vec<serde_json::Value>,
    #[serde(default)]
    pub ops: Vec<ScriptOp>,
}

/// One operation. Paths stay raw JSON until replay so that malformed ones are
/// reported against their position in the script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ScriptOp {
    Set {
        path: serde_json::Value,
        #[serde(default)]
        value: serde_json::Value,
    },
    Merge {
        value: serde_json::Value,
    },
    Delete {
        path: serde_json::Value,
    },
}

impl ScriptOp {
    pub fn into_action(self) -> Result<Action, StoreError> {
        Ok(match self {
            ScriptOp::Set { path, value } => Action::Set {
                path: decode_value(&path)?,
                value: Value::from(value),
            },
            ScriptOp::Merge { value } => Action::Merge {
                partial: Snapshot::from_json(value)?.as_map().as_ref().clone(),
            },
            ScriptOp::Delete { path } => Action::Delete {
                path: decode_value(&path)?,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub state: Snapshot,
    /// Per operation, the watched paths whose observers fired, in firing order.
    pub notifications: Vec<Vec<String>>,
    pub averages: IndexMap<String, f64>,
}

// ── Replay ────────────────────────────────────────────────────────────────

/// Parse `input` as a script, replay it, and render the report as JSON.
pub fn run_script(input: &str) -> Result<String, CliError> {
    let script: Script = serde_json::from_str(input)?;
    let report = replay(script)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn replay(script: Script) -> Result<Report, CliError> {
    let initial = match script.initial {
        Some(json) => Snapshot::from_json(json)?,
        None => Snapshot::default(),
    };
    let store = Store::new(initial, script.options);

    let fired: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut subscriptions = Vec::with_capacity(script.watch.len());
    for raw in &script.watch {
        let path = format_path(&decode_value(raw).map_err(StoreError::from)?);
        let sink = Rc::clone(&fired);
        let label = path.clone();
        subscriptions.push(store.subscribe_fn(path.as_str(), move |_| {
            sink.borrow_mut().push(label.clone());
        }));
    }

    let mut notifications = Vec::with_capacity(script.ops.len());
    for (index, op) in script.ops.into_iter().enumerate() {
        op.into_action()
            .and_then(|action| store.dispatch(action))
            .map_err(|source| CliError::Op { index, source })?;
        notifications.push(fired.take());
    }

    for subscription in subscriptions {
        subscription.unsubscribe();
    }

    Ok(Report {
        state: store.snapshot(),
        notifications,
        averages: store.metrics().averages_by_kind,
    })
}
