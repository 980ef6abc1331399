//! Chord matching against a key press and the current held-key state.
//!
//! An entry fires when all three hold:
//! 1. its modifier flag is asserted on the event,
//! 2. no other modifier flag is asserted,
//! 3. held-key state is exactly {modifier, key}.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::key_state::KeyState;
use super::registry::ShortcutRegistry;
use super::types::{ModifierKey, ShortcutKeys};

/// A native key event as delivered by the input source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub meta_key: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Event with exactly `modifier`'s flag set.
    pub fn with_modifier(key: impl Into<String>, modifier: ModifierKey) -> Self {
        Self::new(key).modifier(modifier)
    }

    /// Set `modifier`'s flag.
    pub fn modifier(mut self, modifier: ModifierKey) -> Self {
        match modifier {
            ModifierKey::Shift => self.shift_key = true,
            ModifierKey::Control => self.ctrl_key = true,
            ModifierKey::Alt => self.alt_key = true,
            ModifierKey::Meta => self.meta_key = true,
        }
        self
    }

    pub fn is_asserted(&self, modifier: ModifierKey) -> bool {
        match modifier {
            ModifierKey::Shift => self.shift_key,
            ModifierKey::Control => self.ctrl_key,
            ModifierKey::Alt => self.alt_key,
            ModifierKey::Meta => self.meta_key,
        }
    }

    /// No modifier other than `modifier` is asserted.
    pub fn only_asserts(&self, modifier: ModifierKey) -> bool {
        ModifierKey::ALL
            .iter()
            .filter(|&&other| other != modifier)
            .all(|&other| !self.is_asserted(other))
    }
}

/// Whether `keys` fires for `event` given the held-key `state`.
pub fn chord_matches(keys: &ShortcutKeys, event: &KeyEvent, state: &KeyState) -> bool {
    let modifier = keys.modifier();
    event.is_asserted(modifier)
        && event.only_asserts(modifier)
        && state.holds_exactly(modifier.held_name(), &keys.held_key())
}

/// Every entry matching the press, in registry iteration order.
pub fn find_matches(
    registry: &ShortcutRegistry,
    event: &KeyEvent,
    state: &KeyState,
) -> Vec<(String, Action)> {
    registry
        .iter()
        .filter(|(_, shortcut)| chord_matches(&shortcut.keys, event, state))
        .map(|(id, shortcut)| (id.clone(), shortcut.action.clone()))
        .collect()
}
