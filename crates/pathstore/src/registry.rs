//! Path-scoped observers and change fan-out.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use pathstore_path::{is_descendant, overlaps};
use tracing::trace;

use crate::diff::{Change, ChangedPaths};
use crate::value::Snapshot;

/// Callback invoked with the snapshot committed by a mutation.
///
/// Identity is the `Rc` allocation: clone the same `Rc` to register one
/// observer under several paths.
pub type Observer = Rc<dyn Fn(&Snapshot)>;

type Listeners = IndexMap<String, Vec<Observer>>;

fn observer_key(observer: &Observer) -> *const () {
    Rc::as_ptr(observer) as *const ()
}

fn same_observer(a: &Observer, b: &Observer) -> bool {
    observer_key(a) == observer_key(b)
}

/// A replaced value wakes listeners at, above, and below its path. A map
/// whose contents changed only wakes listeners at or above it; listeners
/// below it are reached through the changed paths underneath.
fn wakes(changed: &str, change: Change, listener: &str) -> bool {
    match change {
        Change::Value => overlaps(changed, listener),
        Change::Contents => {
            changed == listener || listener.is_empty() || is_descendant(changed, listener)
        }
    }
}

/// Listener paths mapped to their observer sets, in registration order.
#[derive(Default)]
pub struct SubscriptionRegistry {
    listeners: Rc<RefCell<Listeners>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer` at the dot-joined `path` (`""` for the root).
    ///
    /// Registering the same observer twice at one path keeps a single entry.
    pub fn subscribe(&self, path: impl Into<String>, observer: Observer) -> Subscription {
        let path = path.into();
        let mut listeners = self.listeners.borrow_mut();
        let set = listeners.entry(path.clone()).or_default();
        if !set.iter().any(|o| same_observer(o, &observer)) {
            set.push(Rc::clone(&observer));
        }
        Subscription {
            listeners: Rc::downgrade(&self.listeners),
            path,
            observer,
        }
    }

    /// Observers whose listener path is woken by any changed path.
    ///
    /// Collected per changed path, then per listener path, each observer at
    /// most once.
    pub fn matching(&self, changed: &ChangedPaths) -> Vec<Observer> {
        let listeners = self.listeners.borrow();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (changed_path, change) in changed.entries() {
            for (listener_path, set) in listeners.iter() {
                if !wakes(changed_path, change, listener_path) {
                    continue;
                }
                for observer in set {
                    if seen.insert(observer_key(observer)) {
                        out.push(Rc::clone(observer));
                    }
                }
            }
        }
        out
    }

    /// Invoke every matching observer with `snapshot`, synchronously and in
    /// collection order. Returns how many observers ran.
    ///
    /// The listener table is not borrowed while observers run, so they may
    /// subscribe, unsubscribe or mutate the store that owns this registry.
    /// A panicking observer aborts delivery to the rest.
    pub fn notify(&self, snapshot: &Snapshot, changed: &ChangedPaths) -> usize {
        let observers = self.matching(changed);
        trace!(
            changed = changed.len(),
            observers = observers.len(),
            "notifying observers"
        );
        for observer in &observers {
            observer(snapshot);
        }
        observers.len()
    }

    /// Number of registered (path, observer) entries.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().values().map(Vec::len).sum()
    }

    /// Number of distinct listener paths.
    pub fn path_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_map()
            .entries(listeners.iter().map(|(path, set)| (path, set.len())))
            .finish()
    }
}

/// Handle for one registration. Dropping it leaves the observer registered;
/// call [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription {
    listeners: Weak<RefCell<Listeners>>,
    path: String,
    observer: Observer,
}

impl Subscription {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Remove the observer from its path, and the path once it has no
    /// observers left. Does nothing if the registry is gone.
    pub fn unsubscribe(self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut listeners = listeners.borrow_mut();
        if let Some(set) = listeners.get_mut(&self.path) {
            set.retain(|o| !same_observer(o, &self.observer));
            if set.is_empty() {
                listeners.shift_remove(&self.path);
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
