//! Change log for inspecting a running store.
//!
//! A [`ChangeLog`] subscribes at the root and records one [`LogEntry`] per
//! top-level key whose value changed, newest first.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::StoreError;
use crate::registry::Subscription;
use crate::store::Store;
use crate::value::{deep_equal, Snapshot, Value};

/// Entries kept before the oldest is dropped.
pub const MAX_ENTRIES: usize = 100;

pub const STATE_CHANGE: &str = "STATE_CHANGE";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: u64,
    pub action: &'static str,
    pub timestamp_ms: u64,
    pub path: String,
    /// `None` when the key was removed.
    pub value: Option<Value>,
    /// `None` when the key was added.
    pub previous_value: Option<Value>,
}

#[derive(Default)]
struct Recorder {
    previous: RefCell<Snapshot>,
    entries: RefCell<VecDeque<LogEntry>>,
    next_id: Cell<u64>,
}

impl Recorder {
    fn observe(&self, snapshot: &Snapshot) {
        let previous = self.previous.replace(snapshot.clone());
        let removed = previous.keys().filter(|key| !snapshot.contains_key(*key));
        let keys: Vec<&String> = snapshot.keys().chain(removed).collect();

        let mut entries = self.entries.borrow_mut();
        for key in keys {
            let before = previous.get(key);
            let after = snapshot.get(key);
            let unchanged = match (before, after) {
                (Some(a), Some(b)) => deep_equal(a, b),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                continue;
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            entries.push_front(LogEntry {
                id,
                action: STATE_CHANGE,
                timestamp_ms: now_ms(),
                path: key.clone(),
                value: after.cloned(),
                previous_value: before.cloned(),
            });
        }
        entries.truncate(MAX_ENTRIES);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(millis)
        .unwrap_or_default()
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Root subscriber recording top-level changes. Detaches when dropped.
pub struct ChangeLog {
    recorder: Rc<Recorder>,
    subscription: Option<Subscription>,
}

impl ChangeLog {
    /// Start recording changes made to `store` from now on.
    pub fn attach(store: &Store) -> Self {
        let recorder = Rc::new(Recorder {
            previous: RefCell::new(store.snapshot()),
            ..Recorder::default()
        });
        let weak = Rc::downgrade(&recorder);
        let subscription = store.subscribe_fn("", move |snapshot: &Snapshot| {
            if let Some(recorder) = weak.upgrade() {
                recorder.observe(snapshot);
            }
        });
        Self {
            recorder,
            subscription: Some(subscription),
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.recorder.entries.borrow().iter().cloned().collect()
    }

    /// Entries whose path contains `needle`. An empty needle keeps all.
    pub fn filtered(&self, needle: &str) -> Vec<LogEntry> {
        self.recorder
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.path.contains(needle))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recorder.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorder.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.recorder.entries.borrow_mut().clear();
    }

    /// Stop recording. Entries recorded so far are returned.
    pub fn detach(mut self) -> Vec<LogEntry> {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.entries()
    }
}

impl Drop for ChangeLog {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Current state of `store` as pretty-printed JSON.
pub fn export_state(store: &Store) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&store.snapshot())?)
}
