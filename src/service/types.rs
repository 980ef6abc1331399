//! Service-level metadata and tracking types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shortcuts::{ModifierKey, ShortcutKeys};

/// Errors raised by `ShortcutService` registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("shortcut '{0}' already exists; use override_existing to replace it")]
    AlreadyRegistered(String),
    #[error("invalid shortcut config: {0}")]
    InvalidConfig(String),
}

/// Grouping used when listing shortcuts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutCategory {
    Navigation,
    Editing,
    View,
    System,
    Custom,
}

/// A chord plus the metadata shown to users
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    pub id: String,
    pub keys: ShortcutKeys,
    pub description: String,
    pub category: ShortcutCategory,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ShortcutConfig {
    pub fn new(
        id: impl Into<String>,
        modifier: ModifierKey,
        key: impl Into<String>,
        description: impl Into<String>,
        category: ShortcutCategory,
    ) -> Self {
        Self {
            id: id.into(),
            keys: ShortcutKeys::new(modifier, key),
            description: description.into(),
            category,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Options for a single registration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Replace an existing shortcut with the same id instead of failing
    pub override_existing: bool,
    /// Keep the action description so it survives a reload
    pub persist: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            override_existing: false,
            persist: true,
        }
    }
}

/// One recorded execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutEvent {
    pub id: String,
    pub keys: ShortcutKeys,
    /// Unix timestamp in milliseconds
    pub timestamp_ms: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate execution statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutStats {
    pub total_registered: usize,
    pub total_executed: u64,
    /// Up to five ids, most executed first
    pub most_used: Vec<(String, u64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<ShortcutEvent>,
}

/// Handle returned by `ShortcutService::on`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
