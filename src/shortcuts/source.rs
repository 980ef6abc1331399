//! Input events and the sources that deliver them.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::{Deserialize, Serialize};

use super::matcher::KeyEvent;

/// Everything the engine listens to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// Window lost input focus.
    Blur,
    /// Document visibility changed.
    VisibilityChange { hidden: bool },
}

impl InputEvent {
    pub fn key_down(event: KeyEvent) -> Self {
        Self::KeyDown(event)
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        Self::KeyUp(KeyEvent::new(key))
    }
}

/// A pull-based event source.
pub trait EventSource {
    /// Next pending event, or `None` when nothing is queued.
    fn next_event(&mut self) -> Option<InputEvent>;
}

impl EventSource for VecDeque<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}

impl EventSource for Receiver<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        match self.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
