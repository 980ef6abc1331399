//! The id -> shortcut mapping.
//!
//! Ids are unique; registering an existing id replaces the entry. Iteration
//! order is unspecified.
//!
//! Stored records whose keys no longer parse are held verbatim next to the
//! live entries. They never match, and they are written back unchanged until
//! their id is registered again, unregistered or cleared.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::action::{Action, ActionData};
use super::types::ShortcutKeys;

/// A registered chord with its live callback and optional description.
#[derive(Clone)]
pub struct Shortcut {
    pub keys: ShortcutKeys,
    pub action: Action,
    pub action_data: Option<ActionData>,
    /// Stored description this build could not decode. Written back as-is.
    pub unrecognized_action: Option<serde_json::Value>,
}

impl Shortcut {
    pub fn new(keys: ShortcutKeys, action: Action, action_data: Option<ActionData>) -> Self {
        Self {
            keys,
            action,
            action_data,
            unrecognized_action: None,
        }
    }

    pub fn with_unrecognized_action(mut self, raw: Option<serde_json::Value>) -> Self {
        self.unrecognized_action = raw;
        self
    }

    /// Whether this entry survives a reload with its behavior intact.
    pub fn is_restorable(&self) -> bool {
        self.action_data.is_some()
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shortcut")
            .field("keys", &self.keys)
            .field("action_data", &self.action_data)
            .field("unrecognized_action", &self.unrecognized_action)
            .finish_non_exhaustive()
    }
}

/// Owner of all registered shortcuts.
#[derive(Default, Clone)]
pub struct ShortcutRegistry {
    entries: HashMap<String, Shortcut>,
    retained: BTreeMap<String, serde_json::Value>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the replaced entry, if any.
    pub fn register(&mut self, id: impl Into<String>, shortcut: Shortcut) -> Option<Shortcut> {
        let id = id.into();
        self.retained.remove(&id);
        self.entries.insert(id, shortcut)
    }

    /// Keep a stored record that could not be turned into a shortcut.
    pub fn retain_raw(&mut self, id: impl Into<String>, record: serde_json::Value) {
        let id = id.into();
        if !self.entries.contains_key(&id) {
            self.retained.insert(id, record);
        }
    }

    /// Records kept verbatim, sorted by id.
    pub fn retained(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.retained.iter()
    }

    /// Remove an entry. Absent ids are a no-op.
    pub fn unregister(&mut self, id: &str) -> Option<Shortcut> {
        self.retained.remove(id);
        self.entries.remove(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Shortcut> {
        self.entries.get(id)
    }

    /// Owned copy; changes to it never reach the registry.
    pub fn snapshot(&self) -> HashMap<String, Shortcut> {
        self.entries.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Shortcut)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.retained.clear();
    }
}

impl fmt::Debug for ShortcutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutRegistry")
            .field("entries", &self.entries)
            .field("retained", &self.retained)
            .finish()
    }
}
