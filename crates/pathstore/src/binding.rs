//! Path-bound handles over a store.
//!
//! [`StateValue`] reads and writes one path through serde. [`StateWatch`]
//! keeps a copy of one path's value current by subscribing to it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use pathstore_path::{format_path, Path};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::registry::Subscription;
use crate::store::Store;
use crate::value::{Snapshot, Value};

/// Typed accessor for the value at a fixed path.
pub struct StateValue<T> {
    store: Store,
    path: Path,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> StateValue<T> {
    pub(crate) fn new(store: Store, path: Path) -> Self {
        Self {
            store,
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// `Ok(None)` when the path is absent.
    pub fn get(&self) -> Result<Option<T>, StoreError> {
        match self.store.get_state(&self.path) {
            Some(value) => Ok(Some(serde_json::from_value(value.to_json())?)),
            None => Ok(None),
        }
    }

    pub fn set(&self, value: T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value)?;
        self.store.set_state(&self.path, Value::from(json))
    }

    /// Read, transform, write back. Absent values start from `T::default()`.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> Result<(), StoreError>
    where
        T: Default,
    {
        let current = self.get()?.unwrap_or_default();
        self.set(f(current))
    }
}

impl<T> fmt::Debug for StateValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("path", &format_path(&self.path))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct WatchState {
    value: RefCell<Option<Value>>,
    refreshes: Cell<usize>,
}

/// A copy of one path's value, refreshed after every mutation whose changes
/// overlap the path. Unsubscribes when dropped.
pub struct StateWatch {
    state: Rc<WatchState>,
    path: Path,
    subscription: Option<Subscription>,
}

impl StateWatch {
    pub(crate) fn new(store: &Store, path: Path) -> Self {
        let state = Rc::new(WatchState {
            value: RefCell::new(store.get_state(&path)),
            refreshes: Cell::new(0),
        });

        // The observer holds the watch state weakly and reads from the
        // snapshot it is handed, so it keeps neither the watch nor the store
        // alive.
        let weak = Rc::downgrade(&state);
        let watched = path.clone();
        let subscription = store.subscribe_fn(&path, move |snapshot: &Snapshot| {
            if let Some(state) = weak.upgrade() {
                *state.value.borrow_mut() = snapshot.resolve(&watched);
                state.refreshes.set(state.refreshes.get() + 1);
            }
        });

        Self {
            state,
            path,
            subscription: Some(subscription),
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn current(&self) -> Option<Value> {
        self.state.value.borrow().clone()
    }

    /// Deserialize the cached value.
    pub fn get<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        match self.current() {
            Some(value) => Ok(Some(serde_json::from_value(value.to_json())?)),
            None => Ok(None),
        }
    }

    /// How many notifications refreshed the cache.
    pub fn refresh_count(&self) -> usize {
        self.state.refreshes.get()
    }
}

impl Drop for StateWatch {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl fmt::Debug for StateWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateWatch")
            .field("path", &format_path(&self.path))
            .field("value", &self.current())
            .finish()
    }
}
