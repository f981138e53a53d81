use super::Store;
use crate::error::StoreError;

/// Explicit holder for the store a group of consumers works against.
///
/// Consumers are handed the scope (or the store itself); nothing is looked up
/// ambiently. Asking an empty scope for its store is a wiring bug and fails
/// with [`StoreError::NoActiveStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreScope {
    store: Option<Store>,
}

impl StoreScope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn provide(store: Store) -> Self {
        Self { store: Some(store) }
    }

    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Result<Store, StoreError> {
        self.store.clone().ok_or(StoreError::NoActiveStore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Snapshot, StoreOptions, Value};

    #[test]
    fn test_empty_scope_fails_fast() {
        let scope = StoreScope::empty();
        assert!(!scope.is_active());
        assert!(matches!(scope.store(), Err(StoreError::NoActiveStore)));
    }

    #[test]
    fn test_provided_scope_shares_the_store() {
        let store = Store::new(Snapshot::default(), StoreOptions::default());
        let scope = StoreScope::provide(store.clone());
        scope.store().unwrap().set_state("a", 1).unwrap();
        assert_eq!(store.get_state("a"), Some(Value::from(1)));
    }
}
