use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use statetree_types::{Mutation, StateMap, StatePath, Value};

use crate::config::StoreConfig;
use crate::store::StateStore;

/// A [`StateStore`] that can be shared across threads.
///
/// Reads take a read lock; updates hold the write lock while the update
/// function runs, so each update is atomic with respect to other threads.
/// Keep update functions short: they block every other caller.
pub struct SharedStateStore {
    inner: RwLock<StateStore>,
}

impl SharedStateStore {
    /// Create a shared store holding an empty tree.
    pub fn new() -> Self {
        Self::from_store(StateStore::new())
    }

    /// Create a shared store holding an empty tree, with a custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self::from_store(StateStore::with_config(config))
    }

    /// Wrap an existing store.
    pub fn from_store(store: StateStore) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }

    /// See [`StateStore::get`].
    pub fn get(&self, path: impl Into<StatePath>, default: impl Into<Value>) -> Value {
        self.read().get(path, default)
    }

    /// See [`StateStore::update`].
    pub fn update<F>(&self, path: impl Into<StatePath>, f: F)
    where
        F: FnOnce(Value) -> Value,
    {
        self.write().update(path, f);
    }

    /// See [`StateStore::update_and_return`].
    pub fn update_and_return<R, F>(&self, path: impl Into<StatePath>, f: F) -> R
    where
        F: FnOnce(Value) -> Mutation<R>,
    {
        self.write().update_and_return(path, f)
    }

    /// The current root. Later updates do not affect the returned map.
    pub fn snapshot(&self) -> StateMap {
        self.read().state().clone()
    }

    /// Number of root replacements committed so far.
    pub fn revision(&self) -> u64 {
        self.read().revision()
    }

    /// Unwrap the store, recovering it from a poisoned lock if needed.
    pub fn into_inner(self) -> StateStore {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // A panicking update function poisons the lock before any root swap, so
    // the guarded store is always consistent and safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, StateStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StateStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SharedStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl From<StateStore> for SharedStateStore {
    fn from(store: StateStore) -> Self {
        Self::from_store(store)
    }
}

impl std::fmt::Debug for SharedStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedStateStore").field(&*self.read()).finish()
    }
}
