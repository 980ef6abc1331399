//! Persistence of shortcut descriptions to a string key-value store.
//!
//! Format: a JSON object mapping shortcut id to
//! `{ "keys": [modifier, key], "actionData": description | null }`.
//! Live callbacks are dropped on save and rebuilt from `actionData` on load.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::action::{encode, ActionData};
use super::registry::ShortcutRegistry;
use super::types::ShortcutKeys;

/// Failure of the underlying string store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage quota exceeded writing '{key}' ({needed} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string store contract.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose total stored bytes would exceed `limit`.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            slots: Arc::default(),
            quota: Some(limit),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.lock().contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.lock().get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock();
        if let Some(limit) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

/// One JSON file per storage key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path backing `key`. Path separators in keys are flattened.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                other => other,
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Atomic write: temp file, then rename.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, &path).map_err(|e| io_error(&path, e))?;

        debug!(path = %path.display(), bytes = value.len(), "Wrote storage slot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

/// A stored record as understood on load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedRecord {
    pub keys: ShortcutKeys,
    pub action_data: Option<ActionData>,
    /// The stored description when it did not decode as `ActionData`.
    pub unrecognized_action: Option<serde_json::Value>,
}

/// Everything read back from one storage slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub records: BTreeMap<String, PersistedRecord>,
    /// Records whose keys did not parse, kept verbatim.
    pub retained: BTreeMap<String, serde_json::Value>,
}

impl PersistedState {
    pub fn len(&self) -> usize {
        self.records.len() + self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.retained.is_empty()
    }
}

/// Lenient on-disk shape: descriptions are validated per record.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    keys: serde_json::Value,
    #[serde(default)]
    action_data: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredAction<'a> {
    Known(ActionData),
    Unrecognized(&'a serde_json::Value),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    keys: &'a ShortcutKeys,
    action_data: Option<StoredAction<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StoredEntry<'a> {
    Live(StoredRecord<'a>),
    Retained(&'a serde_json::Value),
}

/// Project the registry and serialize it. Ids are emitted in sorted order.
///
/// Descriptions that could not be decoded and records with unreadable keys
/// are written back exactly as they were read.
pub fn serialize_registry(registry: &ShortcutRegistry) -> Result<String, serde_json::Error> {
    let mut records: BTreeMap<&str, StoredEntry<'_>> = registry
        .retained()
        .map(|(id, raw)| (id.as_str(), StoredEntry::Retained(raw)))
        .collect();

    for (id, shortcut) in registry.iter() {
        let action_data = match encode(shortcut.action_data.as_ref()) {
            Some(data) => Some(StoredAction::Known(data)),
            None => shortcut
                .unrecognized_action
                .as_ref()
                .map(StoredAction::Unrecognized),
        };
        records.insert(
            id.as_str(),
            StoredEntry::Live(StoredRecord {
                keys: &shortcut.keys,
                action_data,
            }),
        );
    }

    serde_json::to_string(&records)
}

/// Parse stored text.
///
/// The outer object must be valid JSON. Records with unusable keys are
/// retained verbatim; unusable descriptions decode to `None` but are kept
/// alongside. Both are logged.
pub fn parse_persisted(text: &str) -> Result<PersistedState, serde_json::Error> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(text)?;
    let mut state = PersistedState::default();

    for (id, value) in raw {
        let record = match serde_json::from_value::<RawRecord>(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!(shortcut_id = %id, error = %e, "Keeping malformed persisted shortcut as-is");
                state.retained.insert(id, value);
                continue;
            }
        };

        let keys = match serde_json::from_value::<ShortcutKeys>(record.keys) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(shortcut_id = %id, error = %e, "Keeping persisted shortcut with invalid keys as-is");
                state.retained.insert(id, value);
                continue;
            }
        };

        let (action_data, unrecognized_action) = match record.action_data {
            None | Some(serde_json::Value::Null) => (None, None),
            Some(raw_action) => match serde_json::from_value::<ActionData>(raw_action.clone()) {
                Ok(data) => (Some(data), None),
                Err(e) => {
                    warn!(
                        shortcut_id = %id,
                        error = %e,
                        "Unrecognized persisted action, restoring as no-op"
                    );
                    (None, Some(raw_action))
                }
            },
        };

        state.records.insert(
            id,
            PersistedRecord {
                keys,
                action_data,
                unrecognized_action,
            },
        );
    }

    Ok(state)
}
