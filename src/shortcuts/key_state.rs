//! Held-key tracking used as ground truth for exact-chord matching.

use std::collections::HashSet;

use tracing::warn;

/// Held keys beyond this count trigger a full reset.
pub const MAX_HELD_KEYS: usize = 10;

/// Smallest capacity that still lets a modifier and a key be held together.
pub const MIN_HELD_KEYS: usize = 2;

/// Result of feeding a press into the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    /// Key recorded; matching may proceed.
    Tracked,
    /// Document hidden; the press was dropped and must not match.
    IgnoredWhileHidden,
    /// Too many keys held; state was cleared and the press must not match.
    Overflowed,
}

impl PressOutcome {
    pub fn should_match(&self) -> bool {
        matches!(self, Self::Tracked)
    }
}

/// Set of lowercase key identifiers believed to be held down.
#[derive(Debug, Clone)]
pub struct KeyState {
    held: HashSet<String>,
    hidden: bool,
    capacity: usize,
}

impl Default for KeyState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyState {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HELD_KEYS)
    }

    /// Capacities below `MIN_HELD_KEYS` are raised to it.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity < MIN_HELD_KEYS {
            warn!(
                requested = capacity,
                minimum = MIN_HELD_KEYS,
                "Held-key capacity too small for a chord, raising it"
            );
        }
        let capacity = capacity.max(MIN_HELD_KEYS);
        Self {
            held: HashSet::new(),
            hidden: false,
            capacity,
        }
    }

    pub fn press(&mut self, key: &str) -> PressOutcome {
        if self.hidden {
            return PressOutcome::IgnoredWhileHidden;
        }

        self.held.insert(key.to_lowercase());

        if self.held.len() > self.capacity {
            warn!(
                event_type = "key_state_overflow",
                held = self.held.len(),
                capacity = self.capacity,
                "Too many keys pressed, clearing state"
            );
            self.held.clear();
            return PressOutcome::Overflowed;
        }

        PressOutcome::Tracked
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    /// Window lost focus: held keys can no longer be observed.
    pub fn blur(&mut self) {
        self.held.clear();
    }

    /// Visibility changed. Becoming hidden clears held keys.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            self.held.clear();
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// True when exactly `a` and `b` (already lowercase) are held.
    pub fn holds_exactly(&self, a: &str, b: &str) -> bool {
        self.held.len() == 2 && self.contains(a) && self.contains(b)
    }

    /// Held keys, sorted for stable display.
    pub fn held_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.held.iter().cloned().collect();
        keys.sort();
        keys
    }
}
