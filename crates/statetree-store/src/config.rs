use serde::{Deserialize, Serialize};

/// Configuration for a [`StateStore`](crate::StateStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Label attached to every log event emitted by the store.
    pub name: String,
    /// Emit a `trace` event for every read.
    pub trace_reads: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "state".to_string(),
            trace_reads: false,
        }
    }
}

impl StoreConfig {
    /// Default configuration with a custom store label.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
