//! Foundation types for statetree.
//!
//! A state tree is a persistent nested map: every write produces a new
//! version and old versions stay valid, sharing every subtree the write did
//! not touch.
//!
//! # Key Types
//!
//! - [`Value`] — A tree node: a leaf or a nested map
//! - [`StateMap`] — Persistent ordered map with structural sharing
//! - [`StatePath`] — Sequence of keys addressing a nested location
//! - [`Mutation`] — Result-and-new-value pair returned by update functions
//! - [`ValueError`] / [`PathError`] — Conversion and parsing errors

pub mod error;
pub mod map;
pub mod mutation;
pub mod path;
pub mod value;

pub use error::{PathError, PathResult, ValueError, ValueResult};
pub use map::StateMap;
pub use mutation::Mutation;
pub use path::StatePath;
pub use value::{Value, ValueKind};
