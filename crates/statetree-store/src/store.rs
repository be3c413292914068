use std::fmt;

use statetree_types::{Mutation, StateMap, StatePath, Value};
use tracing::{debug, trace, warn};

use crate::config::StoreConfig;

/// A mutable handle over one persistent state tree.
///
/// The tree itself is never mutated: every update computes a new root that
/// shares all untouched subtrees with the old one, then swaps it in. A
/// [`StateMap`] obtained from [`state`](Self::state) before an update keeps
/// showing the old version.
///
/// The store is single-threaded. Wrap it in
/// [`SharedStateStore`](crate::SharedStateStore) to share it across threads.
#[derive(Clone)]
pub struct StateStore {
    state: StateMap,
    config: StoreConfig,
    revision: u64,
}

impl StateStore {
    /// Create a store holding an empty tree.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store holding an empty tree, with a custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: StateMap::new(),
            config,
            revision: 0,
        }
    }

    /// Create a store seeded with an existing tree.
    pub fn from_state(state: StateMap) -> Self {
        Self {
            state,
            ..Self::new()
        }
    }

    /// The configuration this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The current root. Cloning it is cheap and yields a stable snapshot.
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Consume the store, keeping its final root.
    pub fn into_state(self) -> StateMap {
        self.state
    }

    /// Number of root replacements committed so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Read the value at `path`, or `default` if any key along it is missing.
    ///
    /// An intermediate leaf counts as missing. The empty path always yields
    /// the root as [`Value::Map`].
    pub fn get(&self, path: impl Into<StatePath>, default: impl Into<Value>) -> Value {
        let path = path.into();
        if self.config.trace_reads {
            trace!(store = %self.config.name, %path, "get");
        }
        if path.is_root() {
            return Value::Map(self.state.clone());
        }
        match self.state.get_in(&path) {
            Some(value) => value.clone(),
            None => default.into(),
        }
    }

    /// Replace the value at `path` with `f(current)`.
    ///
    /// `f` receives an empty map when nothing is stored at `path`. Missing
    /// intermediate levels are created as empty maps. At the empty path,
    /// `f` receives the root and must return a map; any other result is
    /// dropped with a warning and the tree is left as it was.
    pub fn update<F>(&mut self, path: impl Into<StatePath>, f: F)
    where
        F: FnOnce(Value) -> Value,
    {
        let path = path.into();
        let next = f(self.state.value_at_or_empty(&path));
        self.commit(&path, next, "update");
    }

    /// Like [`update`](Self::update), but `f` also produces a result that
    /// is returned once the new value has been written.
    pub fn update_and_return<R, F>(&mut self, path: impl Into<StatePath>, f: F) -> R
    where
        F: FnOnce(Value) -> Mutation<R>,
    {
        let path = path.into();
        let Mutation { result, value } = f(self.state.value_at_or_empty(&path));
        self.commit(&path, value, "update_and_return");
        result
    }

    fn commit(&mut self, path: &StatePath, value: Value, op: &'static str) {
        match self.state.set_in(path, value) {
            Ok(next) => {
                self.state = next;
                self.revision += 1;
                debug!(
                    store = %self.config.name,
                    %path,
                    revision = self.revision,
                    op,
                    "state replaced"
                );
            }
            Err(e) => {
                warn!(
                    store = %self.config.name,
                    %path,
                    op,
                    error = %e,
                    "discarding write"
                );
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("name", &self.config.name)
            .field("revision", &self.revision)
            .field("top_level_keys", &self.state.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> StateStore {
        let state = StateMap::try_from(Value::from(json!({
            "servers": {
                "main": {"port": 57120, "booted": true},
                "spare": {"port": 57121, "booted": false}
            },
            "clients": {"alice": {"id": 1}}
        })))
        .expect("seed is an object");
        StateStore::from_state(state)
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_store_is_empty() {
        let store = StateStore::new();
        assert!(store.state().is_empty());
        assert_eq!(store.revision(), 0);
        assert_eq!(store.config(), &StoreConfig::default());
    }

    #[test]
    fn with_config_keeps_config() {
        let store = StateStore::with_config(StoreConfig::named("sessions"));
        assert_eq!(store.config().name, "sessions");
        assert!(store.state().is_empty());
    }

    #[test]
    fn into_state_returns_root() {
        let mut store = StateStore::new();
        store.update(["a"], |_| Value::Int(1));
        let root = store.into_state();
        assert_eq!(root.get("a"), Some(&Value::Int(1)));
    }

    // -----------------------------------------------------------------------
    // get
    // -----------------------------------------------------------------------

    #[test]
    fn get_missing_returns_default() {
        let store = seeded();
        assert_eq!(store.get(["nope"], "missing"), Value::from("missing"));
        assert_eq!(store.get(["servers", "ghost", "port"], 0), Value::Int(0));
        assert_eq!(store.get(["servers", "main", "port", "deeper"], Value::Null), Value::Null);
    }

    #[test]
    fn get_existing_value() {
        let store = seeded();
        assert_eq!(store.get(["servers", "main", "port"], 0), Value::Int(57120));
        assert!(store.get(["clients"], Value::Null).is_map());
    }

    #[test]
    fn get_root_ignores_default() {
        let store = StateStore::new();
        assert_eq!(store.get(StatePath::root(), "unused"), Value::empty_map());
    }

    #[test]
    fn get_root_shares_state() {
        let store = seeded();
        let root = store.get(StatePath::root(), Value::Null);
        assert!(root.as_map().is_some_and(|m| m.ptr_eq(store.state())));
    }

    #[test]
    fn repeated_get_is_stable() {
        let store = seeded();
        let first = store.get(["servers", "spare"], Value::Null);
        let second = store.get(["servers", "spare"], Value::Null);
        assert_eq!(first, second);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn get_returns_stored_null() {
        let mut store = StateStore::new();
        store.update(["k"], |_| Value::Null);
        assert_eq!(store.get(["k"], 7), Value::Null);
        assert_eq!(store.get(["absent"], 7), Value::Int(7));
    }

    #[test]
    fn get_accepts_parsed_paths() {
        let store = seeded();
        let path: StatePath = "clients.alice.id".parse().unwrap();
        assert_eq!(store.get(&path, Value::Null), Value::Int(1));
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    #[test]
    fn update_vivifies_path() {
        let mut store = StateStore::new();
        store.update(["a", "b"], |v| {
            let map = v.as_map().cloned().unwrap_or_default();
            Value::Map(map.insert("x", 1))
        });

        assert_eq!(store.get(["a", "b", "x"], Value::Null), Value::Int(1));
        assert_eq!(store.get(["a", "c"], "missing"), Value::from("missing"));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn update_passes_empty_map_for_missing_path() {
        let mut store = StateStore::new();
        let mut seen = None;
        store.update(["fresh"], |v| {
            seen = Some(v.clone());
            v
        });
        assert_eq!(seen, Some(Value::empty_map()));
        assert_eq!(store.get(["fresh"], Value::Null), Value::empty_map());
    }

    #[test]
    fn update_passes_existing_value() {
        let mut store = seeded();
        store.update(["servers", "main", "port"], |v| {
            Value::Int(v.as_i64().unwrap_or(0) + 1)
        });
        assert_eq!(store.get(["servers", "main", "port"], 0), Value::Int(57121));
    }

    #[test]
    fn update_keeps_previous_root() {
        let mut store = seeded();
        let before = store.state().clone();
        let before_json = serde_json::to_value(&before).unwrap();

        store.update(["servers", "main", "booted"], |_| Value::Bool(false));

        assert!(!before.ptr_eq(store.state()));
        assert_eq!(serde_json::to_value(&before).unwrap(), before_json);
        assert_eq!(
            before.get_in(&StatePath::from(["servers", "main", "booted"])),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn update_shares_unrelated_branches() {
        let mut store = seeded();
        let clients = store.state().get("clients").and_then(Value::as_map).cloned().unwrap();
        let spare = store
            .get(["servers", "spare"], Value::Null)
            .as_map()
            .cloned()
            .unwrap();

        store.update(["servers", "main", "port"], |_| Value::Int(1));

        let clients_after = store.state().get("clients").and_then(Value::as_map).unwrap();
        assert!(clients.ptr_eq(clients_after));

        let spare_after = store.get(["servers", "spare"], Value::Null);
        assert!(spare_after.as_map().is_some_and(|m| m.ptr_eq(&spare)));
    }

    #[test]
    fn update_shares_sibling_leaves() {
        let mut store = StateStore::new();
        let items: Vec<i64> = (0..10_000).collect();
        store.update(["data", "blob"], |_| Value::from(items));
        store.update(["data", "text"], |_| Value::from("y".repeat(100_000)));

        let blob = store.get(["data", "blob"], Value::Null);
        let text = store.get(["data", "text"], Value::Null);

        store.update(["data", "counter"], |_| Value::Int(1));

        let blob_after = store.get(["data", "blob"], Value::Null);
        let text_after = store.get(["data", "text"], Value::Null);
        assert_eq!(
            blob.as_list().map(<[Value]>::as_ptr),
            blob_after.as_list().map(<[Value]>::as_ptr)
        );
        assert_eq!(
            text.as_str().map(str::as_ptr),
            text_after.as_str().map(str::as_ptr)
        );
        assert!(blob_after.as_list().is_some_and(|items| items.len() == 10_000));
    }

    #[test]
    fn update_root_with_map_replaces_state() {
        let mut store = seeded();
        store.update(StatePath::root(), |root| {
            let map = root.as_map().cloned().unwrap_or_default();
            Value::Map(map.remove("clients"))
        });
        assert!(!store.state().contains_key("clients"));
        assert!(store.state().contains_key("servers"));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn update_root_with_leaf_is_discarded() {
        let mut store = seeded();
        let before = store.state().clone();
        store.update(StatePath::root(), |_| Value::Int(3));
        assert!(store.state().ptr_eq(&before));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn update_through_leaf_replaces_it() {
        let mut store = seeded();
        store.update(["servers", "main", "port", "number"], |_| Value::Int(9));
        assert_eq!(
            store.get(["servers", "main", "port", "number"], Value::Null),
            Value::Int(9)
        );
        assert_eq!(store.get(["servers", "main", "booted"], Value::Null), Value::Bool(true));
    }

    // -----------------------------------------------------------------------
    // update_and_return
    // -----------------------------------------------------------------------

    fn bump_counter(v: Value) -> Mutation<i64> {
        let n = v.get("n").and_then(Value::as_i64).unwrap_or(0) + 1;
        Mutation::new(n, StateMap::new().insert("n", n))
    }

    #[test]
    fn update_and_return_counts() {
        let mut store = StateStore::new();
        assert_eq!(store.update_and_return(["count"], bump_counter), 1);
        assert_eq!(store.update_and_return(["count"], bump_counter), 2);
        assert_eq!(store.get(["count", "n"], 0), Value::Int(2));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn update_and_return_replaces_slot() {
        let mut store = seeded();
        let old_port = store.update_and_return(["servers", "main"], |v| {
            let port = v.get("port").and_then(Value::as_i64);
            Mutation::new(port, StateMap::new().insert("port", 1))
        });
        assert_eq!(old_port, Some(57120));
        // The slot is replaced wholesale, so sibling keys are gone.
        assert_eq!(store.get(["servers", "main", "booted"], "gone"), Value::from("gone"));
        assert_eq!(store.get(["servers", "main", "port"], 0), Value::Int(1));
    }

    #[test]
    fn update_and_return_root_leaf_still_returns() {
        let mut store = seeded();
        let result = store.update_and_return(StatePath::root(), |root| {
            Mutation::new(root.as_map().map(StateMap::len), Value::Null)
        });
        assert_eq!(result, Some(2));
        assert!(store.state().contains_key("servers"));
        assert_eq!(store.revision(), 0);
    }

    // -----------------------------------------------------------------------
    // Debug
    // -----------------------------------------------------------------------

    #[test]
    fn debug_format() {
        let store = seeded();
        let debug = format!("{store:?}");
        assert!(debug.contains("StateStore"));
        assert!(debug.contains("top_level_keys: 2"));
    }
}
