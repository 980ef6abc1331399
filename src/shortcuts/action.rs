//! Serializable action descriptions and their reconstruction into callbacks.
//!
//! A live `Action` cannot be persisted, so every shortcut may carry an
//! `ActionData` describing what it does. On reload, `decode` turns that
//! description back into an equivalent callback.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Zero-argument shortcut callback.
pub type Action = Rc<dyn Fn()>;

/// Default fallback target for `back` when there is no history.
pub const DEFAULT_BACK_FALLBACK: &str = "/";

/// Persistable description of what a shortcut does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionData {
    /// Navigate the current context to `url`.
    Navigate { url: String },
    /// Go back one history step, or to `fallback` when there is none.
    Back {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
    /// Stub that only surfaces `message`; real behavior must be re-registered.
    Custom { message: String },
}

/// Build a `navigate` description.
pub fn navigate_action(url: impl Into<String>) -> ActionData {
    ActionData::Navigate { url: url.into() }
}

/// Build a `back` description; `None` falls back to `/`.
pub fn back_action(fallback: Option<&str>) -> ActionData {
    ActionData::Back {
        fallback: Some(fallback.unwrap_or(DEFAULT_BACK_FALLBACK).to_string()),
    }
}

/// Build a `custom` description.
pub fn custom_action(message: impl Into<String>) -> ActionData {
    ActionData::Custom {
        message: message.into(),
    }
}

/// The navigation context decoded actions act on.
pub trait Navigator {
    /// Replace the current location with `url`.
    fn assign(&self, url: &str);
    /// Number of entries in the session history, including the current one.
    fn history_len(&self) -> usize;
    /// Go back one history entry.
    fn back(&self);
}

/// In-memory navigator backed by a location stack.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    entries: Rc<RefCell<Vec<String>>>,
}

impl HistoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Rc::new(RefCell::new(vec![initial.into()])),
        }
    }

    /// Current location.
    pub fn location(&self) -> String {
        self.entries.borrow().last().cloned().unwrap_or_default()
    }

    /// Full history, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(DEFAULT_BACK_FALLBACK)
    }
}

impl Navigator for HistoryNavigator {
    fn assign(&self, url: &str) {
        self.entries.borrow_mut().push(url.to_string());
    }

    fn history_len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn back(&self) {
        let mut entries = self.entries.borrow_mut();
        if entries.len() > 1 {
            entries.pop();
        }
    }
}

/// An action that does nothing.
pub fn noop_action() -> Action {
    Rc::new(|| {})
}

/// Reconstruct a callback from an optional description. Total: a missing
/// description yields a no-op.
pub fn decode(data: Option<&ActionData>, navigator: &Rc<dyn Navigator>) -> Action {
    let Some(data) = data else {
        return noop_action();
    };

    match data.clone() {
        ActionData::Navigate { url } => {
            let navigator = Rc::clone(navigator);
            Rc::new(move || navigator.assign(&url))
        }
        ActionData::Back { fallback } => {
            let navigator = Rc::clone(navigator);
            let fallback = fallback.unwrap_or_else(|| DEFAULT_BACK_FALLBACK.to_string());
            Rc::new(move || {
                if navigator.history_len() > 1 {
                    navigator.back();
                } else {
                    navigator.assign(&fallback);
                }
            })
        }
        ActionData::Custom { message } => Rc::new(move || {
            info!(event_type = "custom_action", message = %message, "{}", message);
        }),
    }
}

/// The persisted projection of an action: the description passes through.
pub fn encode(data: Option<&ActionData>) -> Option<ActionData> {
    data.cloned()
}
