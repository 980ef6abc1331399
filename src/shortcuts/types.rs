//! Core chord types with parse errors and platform-aware display.
//!
//! This module provides:
//! - `ModifierKey` - The single modifier a chord is bound to
//! - `ShortcutKeys` - A modifier + one key, persisted as `["Control", "s"]`
//! - `ShortcutParseError` - Detailed parse errors for user feedback
//! - Display helpers (⌘K / ⇧K on macOS style, Ctrl+S / Alt+X otherwise)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing a modifier or chord string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("shortcut has no key, only a modifier")]
    MissingKey,
    #[error("shortcut has no modifier")]
    MissingModifier,
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("unexpected token '{0}' in shortcut")]
    UnexpectedToken(String),
}

/// The fixed set of modifiers a chord can be bound to.
///
/// Variant names double as the persisted names and as the `key` value a
/// keyboard event reports for the modifier itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Meta,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 4] = [
        ModifierKey::Shift,
        ModifierKey::Control,
        ModifierKey::Alt,
        ModifierKey::Meta,
    ];

    /// The name as reported by a keyboard event (`"Control"`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shift => "Shift",
            Self::Control => "Control",
            Self::Alt => "Alt",
            Self::Meta => "Meta",
        }
    }

    /// Lowercase name, the form stored in held-key state.
    pub fn held_name(&self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Control => "control",
            Self::Alt => "alt",
            Self::Meta => "meta",
        }
    }

    /// Display prefix used when formatting a chord.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Control => "Ctrl+",
            Self::Shift => "⇧",
            Self::Alt => "Alt+",
            Self::Meta => "⌘",
        }
    }
}

impl FromStr for ModifierKey {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shift" | "shft" | "⇧" => Ok(Self::Shift),
            "control" | "ctrl" | "ctl" | "^" => Ok(Self::Control),
            "alt" | "opt" | "option" | "⌥" => Ok(Self::Alt),
            "meta" | "cmd" | "command" | "super" | "win" | "⌘" => Ok(Self::Meta),
            "" => Err(ShortcutParseError::Empty),
            other => Err(ShortcutParseError::UnknownModifier(other.to_string())),
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A chord: exactly one modifier plus one ordinary key.
///
/// The key keeps the caller's spelling; matching lowercases both sides.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShortcutKeys(pub ModifierKey, pub String);

impl ShortcutKeys {
    pub fn new(modifier: ModifierKey, key: impl Into<String>) -> Self {
        Self(modifier, key.into())
    }

    /// Build from separate modifier and key strings, as typed on a command line.
    pub fn from_parts(modifier: &str, key: &str) -> Result<Self, ShortcutParseError> {
        let modifier: ModifierKey = modifier.parse()?;
        if key.is_empty() {
            return Err(ShortcutParseError::MissingKey);
        }
        Ok(Self::new(modifier, key))
    }

    pub fn modifier(&self) -> ModifierKey {
        self.0
    }

    pub fn key(&self) -> &str {
        &self.1
    }

    /// Lowercase key name, the form stored in held-key state.
    pub fn held_key(&self) -> String {
        self.1.to_lowercase()
    }

    /// Parse `"ctrl+s"`, `"Shift K"` and similar two-token forms.
    pub fn parse(s: &str) -> Result<Self, ShortcutParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        // A literal "+" key ("ctrl++") would otherwise vanish in the split.
        let (head, plus_key) = match s.strip_suffix("++") {
            Some(head) => (head, true),
            None => (s, false),
        };

        let normalized = head.replace('+', " ");
        let mut parts = normalized.split_whitespace();

        let modifier = parts
            .next()
            .ok_or(ShortcutParseError::MissingModifier)?
            .parse::<ModifierKey>()?;

        let key = if plus_key {
            "+".to_string()
        } else {
            parts
                .next()
                .ok_or(ShortcutParseError::MissingKey)?
                .to_string()
        };

        if let Some(extra) = parts.next() {
            return Err(ShortcutParseError::UnexpectedToken(extra.to_string()));
        }

        Ok(Self(modifier, key))
    }

    /// Formats as `⇧K`, `Ctrl+S`, `Alt+X` or `⌘K`.
    pub fn display(&self) -> String {
        format!("{}{}", self.0.symbol(), self.1.to_uppercase())
    }

    /// Canonical lowercase form, e.g. `control+s`.
    pub fn to_canonical_string(&self) -> String {
        format!("{}+{}", self.0.held_name(), self.held_key())
    }
}

impl fmt::Display for ShortcutKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
