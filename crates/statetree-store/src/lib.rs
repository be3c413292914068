//! Mutable handles over persistent state trees.
//!
//! A [`StateStore`] owns one [`StateMap`] and offers three path-addressed
//! primitives:
//!
//! - [`get`](StateStore::get) — read a nested value, falling back to a default
//! - [`update`](StateStore::update) — replace a nested value with a function of itself
//! - [`update_and_return`](StateStore::update_and_return) — the same, also
//!   returning a result computed alongside the new value
//!
//! Updates never touch the existing tree. They build a new root that shares
//! every unchanged subtree and swap it in, so snapshots taken earlier stay
//! valid. Missing intermediate levels are created as empty maps.
//!
//! # Example
//!
//! ```
//! use statetree_store::{Mutation, StateMap, StateStore, Value};
//!
//! let mut store = StateStore::new();
//! store.update(["a", "b"], |v| {
//!     let map = v.as_map().cloned().unwrap_or_default();
//!     Value::Map(map.insert("x", 1))
//! });
//! assert_eq!(store.get(["a", "b", "x"], Value::Null), Value::Int(1));
//! assert_eq!(store.get(["a", "c"], "missing"), Value::from("missing"));
//!
//! let next = store.update_and_return(["count"], |v| {
//!     let n = v.get("n").and_then(Value::as_i64).unwrap_or(0) + 1;
//!     Mutation::new(n, StateMap::new().insert("n", n))
//! });
//! assert_eq!(next, 1);
//! ```
//!
//! [`SharedStateStore`] wraps a store in a lock for use across threads.

pub mod config;
pub mod shared;
pub mod store;

pub use config::StoreConfig;
pub use shared::SharedStateStore;
pub use store::StateStore;

// Re-export the value model so callers need only this crate.
pub use statetree_types::{
    Mutation, PathError, StateMap, StatePath, Value, ValueError, ValueKind,
};
