//! The store: current snapshot, dispatch pipeline, public read/write surface.
//!
//! Every mutation runs to completion before returning: reduce, diff, commit,
//! notify, record timing, and (when enabled) emit a debug record. Observers
//! run synchronously and may call back into the store; such re-entrant
//! mutations run the whole pipeline nested inside the outer one. Mutation
//! cycles between observers are not detected.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

use indexmap::IndexMap;
use pathstore_path::{decode, format_path, IntoPath, Path};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::binding::{StateValue, StateWatch};
use crate::diff::{diff, ChangedPaths};
use crate::error::StoreError;
use crate::metrics::{MetricsLog, MetricsSample, OperationKind};
use crate::registry::{Observer, Subscription, SubscriptionRegistry};
use crate::tree;
use crate::value::{Map, Snapshot, Value};

mod options;
pub mod scope;

pub use options::StoreOptions;
pub use scope::StoreScope;

// ── Actions ───────────────────────────────────────────────────────────────

/// A single state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Set { path: Path, value: Value },
    Merge { partial: Map },
    Delete { path: Path },
}

impl Action {
    pub fn kind(&self) -> OperationKind {
        match self {
            Action::Set { .. } => OperationKind::SetState,
            Action::Merge { .. } => OperationKind::MergeState,
            Action::Delete { .. } => OperationKind::DeleteState,
        }
    }

    /// Dot-joined target path; merges have none.
    pub fn path_label(&self) -> Option<String> {
        match self {
            Action::Set { path, .. } | Action::Delete { path } => Some(format_path(path)),
            Action::Merge { .. } => None,
        }
    }

    fn payload_json(&self) -> serde_json::Value {
        match self {
            Action::Set { path, value } => serde_json::json!({
                "path": format_path(path),
                "value": value.to_json(),
            }),
            Action::Merge { partial } => Value::map(partial.clone()).to_json(),
            Action::Delete { path } => serde_json::Value::String(format_path(path)),
        }
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// False for no-op deletes, which commit nothing.
    pub committed: bool,
    pub changed: ChangedPaths,
    /// Observers invoked by this dispatch (nested dispatches not included).
    pub notified: usize,
}

// ── Store ─────────────────────────────────────────────────────────────────

struct StoreInner {
    current: RefCell<Snapshot>,
    registry: SubscriptionRegistry,
    metrics: RefCell<MetricsLog>,
    options: StoreOptions,
}

/// Handle to a state container. Clones share the same state.
///
/// The handle is single-threaded (`!Send`); snapshots it hands out are plain
/// shared data and may cross threads.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    pub fn new(initial: impl Into<Snapshot>, options: StoreOptions) -> Self {
        let metrics = MetricsLog::new(options.metrics_capacity);
        Self {
            inner: Rc::new(StoreInner {
                current: RefCell::new(initial.into()),
                registry: SubscriptionRegistry::new(),
                metrics: RefCell::new(metrics),
                options,
            }),
        }
    }

    /// Create a store with default options apart from `debug`.
    pub fn with_debug(initial: impl Into<Snapshot>, debug: bool) -> Self {
        Self::new(initial, StoreOptions::default().with_debug(debug))
    }

    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    /// The committed snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.current.borrow().clone()
    }

    /// Read the value at `path`. The empty path returns the whole tree;
    /// `None` means some segment along the way is absent.
    pub fn get_state(&self, path: impl IntoPath) -> Option<Value> {
        self.snapshot().resolve(&decode(path))
    }

    pub fn set_state(&self, path: impl IntoPath, value: impl Into<Value>) -> Result<(), StoreError> {
        self.dispatch(Action::Set {
            path: decode(path),
            value: value.into(),
        })
        .map(drop)
    }

    pub fn merge_state(&self, partial: impl Into<Map>) -> Result<(), StoreError> {
        self.dispatch(Action::Merge {
            partial: partial.into(),
        })
        .map(drop)
    }

    pub fn delete_state(&self, path: impl IntoPath) -> Result<(), StoreError> {
        self.dispatch(Action::Delete { path: decode(path) }).map(drop)
    }

    /// Run one action through reduce → diff → commit → notify → record.
    pub fn dispatch(&self, action: Action) -> Result<DispatchOutcome, StoreError> {
        let started = Instant::now();
        let kind = action.kind();
        let path = action.path_label();
        let payload = self.inner.options.debug.then(|| action.payload_json());

        let prev = self.snapshot();
        let next = match action {
            Action::Set { path, value } => tree::set(&prev, &path, value)?,
            Action::Merge { partial } => tree::merge(&prev, &partial),
            Action::Delete { path } => tree::delete(&prev, &path)?,
        };

        if next.ptr_eq(&prev) {
            trace!(action = %kind, path = ?path, "nothing to change, skipping commit");
            return Ok(DispatchOutcome::default());
        }

        let changed = diff(&prev, &next);
        *self.inner.current.borrow_mut() = next.clone();
        let notified = self.inner.registry.notify(&next, &changed);

        self.inner.metrics.borrow_mut().record(MetricsSample {
            kind,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            path,
        });

        if let Some(payload) = payload {
            debug!(
                target: "pathstore::store",
                action = kind.action_type(),
                prev = %prev,
                payload = %payload,
                next = %next,
                "state transition"
            );
        }

        Ok(DispatchOutcome {
            committed: true,
            changed,
            notified,
        })
    }

    /// Register `observer` for changes overlapping `path`.
    pub fn subscribe(&self, path: impl IntoPath, observer: Observer) -> Subscription {
        let path = format_path(&decode(path));
        self.inner.registry.subscribe(path, observer)
    }

    pub fn subscribe_fn<F>(&self, path: impl IntoPath, observer: F) -> Subscription
    where
        F: Fn(&Snapshot) + 'static,
    {
        self.subscribe(path, Rc::new(observer))
    }

    /// Typed handle reading and writing the value at `path`.
    pub fn bind<T: Serialize + DeserializeOwned>(&self, path: impl IntoPath) -> StateValue<T> {
        StateValue::new(self.clone(), decode(path))
    }

    /// Cached copy of the value at `path`, refreshed on relevant changes.
    pub fn watch(&self, path: impl IntoPath) -> StateWatch {
        StateWatch::new(self, decode(path))
    }

    /// Number of registered (path, observer) entries.
    pub fn listener_count(&self) -> usize {
        self.inner.registry.listener_count()
    }

    /// Number of distinct listener paths.
    pub fn path_count(&self) -> usize {
        self.inner.registry.path_count()
    }

    /// Retained timing samples and per-kind averages.
    pub fn metrics(&self) -> MetricsReport {
        let metrics = self.inner.metrics.borrow();
        MetricsReport {
            samples: metrics.samples(),
            averages_by_kind: metrics.averages(),
            store: Rc::downgrade(&self.inner),
        }
    }

    pub fn clear_metrics(&self) {
        self.inner.metrics.borrow_mut().clear();
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.current.borrow())
            .field("registry", &self.inner.registry)
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Copy of the timing log taken by [`Store::metrics`].
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub samples: Vec<MetricsSample>,
    pub averages_by_kind: IndexMap<String, f64>,
    store: Weak<StoreInner>,
}

impl MetricsReport {
    /// Clear the store's log. This report keeps its copy.
    pub fn clear(&self) {
        if let Some(inner) = self.store.upgrade() {
            inner.metrics.borrow_mut().clear();
        }
    }
}
