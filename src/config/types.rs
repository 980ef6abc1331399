//! Configuration type definitions

use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Construction options for a `NavigatorX` engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorOptions {
    /// Storage slot holding the persisted shortcuts (default: "navigatorx_shortcuts")
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Held keys tolerated before a full reset (default: 10)
    #[serde(default = "default_max_held_keys")]
    pub max_held_keys: usize,
    /// Directory for file-backed storage; `None` uses ~/.navigatorx/storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}
fn default_max_held_keys() -> usize {
    DEFAULT_MAX_HELD_KEYS
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        NavigatorOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_held_keys: DEFAULT_MAX_HELD_KEYS,
            storage_dir: None,
        }
    }
}

impl NavigatorOptions {
    /// Options with a custom storage key and defaults otherwise.
    pub fn with_storage_key(storage_key: impl Into<String>) -> Self {
        NavigatorOptions {
            storage_key: storage_key.into(),
            ..Default::default()
        }
    }
}
