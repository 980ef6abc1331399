//! Keyboard chord detection with persistable actions.
//!
//! This module provides:
//! - Chord types (one modifier + one key)
//! - Held-key tracking with overflow self-heal
//! - Exact-chord matching with modifier exclusivity
//! - A registry of shortcuts keyed by id
//! - Persistence of action descriptions and their reconstruction on load
//!
//! # Architecture
//!
//! Input events enter `NavigatorX::dispatch`. Presses update `KeyState`;
//! when the press is tracked, `find_matches` walks the registry and every
//! matching action runs. Mutations of the registry re-save through the
//! `Storage` contract; construction reads it back once and rebuilds
//! callbacks from their `ActionData`.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use navigatorx::config::NavigatorOptions;
//! use navigatorx::shortcuts::*;
//!
//! let history = HistoryNavigator::new("/");
//! let mut engine = NavigatorX::new(
//!     NavigatorOptions::default(),
//!     MemoryStorage::new(),
//!     Rc::new(history.clone()),
//! );
//! engine.register(
//!     "docs",
//!     ShortcutKeys::new(ModifierKey::Control, "d"),
//!     || {},
//!     Some(navigate_action("/docs")),
//! );
//! ```

mod action;
mod engine;
mod key_state;
mod matcher;
mod persistence;
mod registry;
mod source;
mod types;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;

pub use types::{ModifierKey, ShortcutKeys, ShortcutParseError};

pub use action::{
    back_action, custom_action, decode, encode, navigate_action, noop_action, Action, ActionData,
    HistoryNavigator, Navigator, DEFAULT_BACK_FALLBACK,
};

pub use key_state::{KeyState, PressOutcome, MAX_HELD_KEYS, MIN_HELD_KEYS};

pub use matcher::{chord_matches, find_matches, KeyEvent};

pub use registry::{Shortcut, ShortcutRegistry};

pub use persistence::{
    parse_persisted, serialize_registry, FileStorage, MemoryStorage, PersistedRecord,
    PersistedState, Storage, StorageError,
};

pub use source::{EventSource, InputEvent};

pub use engine::{DispatchOutcome, NavigatorX};
