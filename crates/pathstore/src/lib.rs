//! pathstore: a path-addressed state container.
//!
//! State is a tree of nested maps, lists and scalars held in an immutable
//! [`Snapshot`]. Every mutation produces a new snapshot that shares every
//! untouched subtree with the previous one, computes which dot-joined paths
//! changed, and wakes only the observers whose listener path overlaps a
//! change.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use pathstore::{Snapshot, Store, StoreOptions, Value};
//! use serde_json::json;
//!
//! let store = Store::new(
//!     Snapshot::from_json(json!({"user": {"name": "A", "age": 1}})).unwrap(),
//!     StoreOptions::default(),
//! );
//!
//! let fired = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&fired);
//! let _sub = store.subscribe_fn("user.name", move |_| counter.set(counter.get() + 1));
//!
//! store.set_state("user.age", 2).unwrap();
//! assert_eq!(fired.get(), 0);
//!
//! store.set_state("user.name", "B").unwrap();
//! assert_eq!(fired.get(), 1);
//! assert_eq!(store.get_state("user.name"), Some(Value::from("B")));
//! ```

pub mod binding;
pub mod cli;
pub mod debugger;
pub mod diff;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod store;
pub mod tree;
pub mod value;

pub use binding::{StateValue, StateWatch};
pub use debugger::{export_state, ChangeLog, LogEntry};
pub use diff::{diff, Change, ChangedPaths};
pub use error::{StoreError, StoreResult};
pub use metrics::{MetricsLog, MetricsSample, OperationKind};
pub use registry::{Observer, Subscription, SubscriptionRegistry};
pub use store::{Action, DispatchOutcome, MetricsReport, Store, StoreOptions, StoreScope};
pub use value::{deep_equal, Map, Snapshot, Value};

pub use pathstore_path::{decode, format_path, IntoPath, Path, PathError};
