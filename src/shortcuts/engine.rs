//! The chord-detection engine.
//!
//! `NavigatorX` owns the registry, the held-key state and a handle to the
//! persistence store. Events flow in through `dispatch` (or `pump` for a
//! whole `EventSource`), update held keys, and fire every matching action.
//!
//! One engine is meant to be created by the application and passed to
//! whoever needs it; there is no global instance.
//!
//! Two live engines sharing one storage key overwrite each other's saves
//! (last write wins). Give each instance its own key.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, info, instrument};

use super::action::{decode, Action, ActionData, Navigator};
use super::key_state::KeyState;
use super::matcher::{find_matches, KeyEvent};
use super::persistence::{parse_persisted, serialize_registry, Storage};
use super::registry::{Shortcut, ShortcutRegistry};
use super::source::{EventSource, InputEvent};
use super::types::ShortcutKeys;
use crate::config::NavigatorOptions;
use crate::error::{Result, ResultExt};

/// What a single dispatched event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The host should suppress its default handling of the key press.
    pub default_prevented: bool,
    /// Ids whose actions ran, in firing order.
    pub fired: Vec<String>,
}

pub struct NavigatorX {
    registry: ShortcutRegistry,
    keys: KeyState,
    storage: Box<dyn Storage>,
    navigator: Rc<dyn Navigator>,
    storage_key: String,
    attached: bool,
}

impl NavigatorX {
    /// Create an engine and restore whatever is persisted under the
    /// configured storage key.
    pub fn new(
        options: NavigatorOptions,
        storage: impl Storage + 'static,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let mut engine = Self {
            registry: ShortcutRegistry::new(),
            keys: KeyState::with_capacity(options.max_held_keys),
            storage: Box::new(storage),
            navigator,
            storage_key: options.storage_key,
            attached: true,
        };
        engine.load();
        engine
    }

    /// Register or replace `id`. Always re-saves.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        keys: ShortcutKeys,
        action: impl Fn() + 'static,
        action_data: Option<ActionData>,
    ) {
        let id = id.into();
        let action: Action = Rc::new(action);
        let replaced = self
            .registry
            .register(id.clone(), Shortcut::new(keys, action, action_data));

        debug!(
            event_type = "shortcut_registered",
            shortcut_id = %id,
            replaced = replaced.is_some(),
            "Registered shortcut"
        );
        self.save();
    }

    /// Remove `id` if present. Always re-saves.
    pub fn unregister(&mut self, id: &str) {
        if self.registry.unregister(id).is_some() {
            debug!(event_type = "shortcut_unregistered", shortcut_id = %id, "Unregistered shortcut");
        }
        self.save();
    }

    pub fn has(&self, id: &str) -> bool {
        self.registry.has(id)
    }

    pub fn get(&self, id: &str) -> Option<&Shortcut> {
        self.registry.get(id)
    }

    /// Detached copy of every registered shortcut.
    pub fn get_all(&self) -> HashMap<String, Shortcut> {
        self.registry.snapshot()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Empty the registry and held keys, and delete the persisted record.
    #[instrument(name = "navigatorx_clear", skip(self), fields(storage_key = %self.storage_key))]
    pub fn clear(&mut self) {
        self.registry.clear();
        self.keys.clear();
        self.storage.remove(&self.storage_key).log_err();
    }

    /// Stop listening and drop in-memory state. Persisted data is kept.
    pub fn destroy(&mut self) {
        self.attached = false;
        self.registry.clear();
        self.keys.clear();
        debug!(event_type = "navigatorx_destroyed", storage_key = %self.storage_key, "Engine detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn navigator(&self) -> Rc<dyn Navigator> {
        Rc::clone(&self.navigator)
    }

    /// Whether storage currently holds a record for `id`.
    ///
    /// Saves never fail loudly, so callers that must know a change landed
    /// read it back here.
    pub fn is_persisted(&self, id: &str) -> Result<bool> {
        let Some(text) = self.storage.get(&self.storage_key)? else {
            return Ok(false);
        };
        let state = parse_persisted(&text)?;
        Ok(state.records.contains_key(id) || state.retained.contains_key(id))
    }

    /// Currently held keys, sorted.
    pub fn held_keys(&self) -> Vec<String> {
        self.keys.held_keys()
    }

    /// Feed one input event. Ignored once the engine is destroyed.
    pub fn dispatch(&mut self, event: &InputEvent) -> DispatchOutcome {
        if !self.attached {
            return DispatchOutcome::default();
        }

        match event {
            InputEvent::KeyDown(key_event) => self.handle_key_down(key_event),
            InputEvent::KeyUp(key_event) => {
                self.keys.release(&key_event.key);
                DispatchOutcome::default()
            }
            InputEvent::Blur => {
                self.keys.blur();
                DispatchOutcome::default()
            }
            InputEvent::VisibilityChange { hidden } => {
                if self.keys.is_hidden() != *hidden {
                    debug!(
                        event_type = "visibility_changed",
                        hidden = *hidden,
                        "Document visibility changed"
                    );
                }
                self.keys.set_hidden(*hidden);
                DispatchOutcome::default()
            }
        }
    }

    /// Drain `source`, returning how many actions fired.
    pub fn pump<S: EventSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut fired = 0;
        while let Some(event) = source.next_event() {
            fired += self.dispatch(&event).fired.len();
        }
        fired
    }

    fn handle_key_down(&mut self, event: &KeyEvent) -> DispatchOutcome {
        if !self.keys.press(&event.key).should_match() {
            return DispatchOutcome::default();
        }

        // Collect first so every matching action runs against the same state.
        let matches = find_matches(&self.registry, event, &self.keys);
        let mut outcome = DispatchOutcome {
            default_prevented: !matches.is_empty(),
            fired: Vec::with_capacity(matches.len()),
        };

        for (id, action) in matches {
            debug!(event_type = "shortcut_fired", shortcut_id = %id, "Firing shortcut");
            action();
            outcome.fired.push(id);
        }

        outcome
    }

    fn try_save(&self) -> Result<()> {
        let json = serialize_registry(&self.registry)?;
        self.storage.set(&self.storage_key, &json)?;
        debug!(
            storage_key = %self.storage_key,
            entry_count = self.registry.len(),
            restorable = self.registry.iter().filter(|(_, s)| s.is_restorable()).count(),
            bytes = json.len(),
            "Saved shortcuts"
        );
        Ok(())
    }

    /// Persist the registry. Failures are logged; in-memory state stays.
    fn save(&self) {
        self.try_save().log_err();
    }

    fn try_load(&mut self) -> Result<usize> {
        let Some(text) = self.storage.get(&self.storage_key)? else {
            return Ok(0);
        };

        let state = parse_persisted(&text)?;
        let count = state.len();
        for (id, raw) in state.retained {
            self.registry.retain_raw(id, raw);
        }
        for (id, record) in state.records {
            let action = decode(record.action_data.as_ref(), &self.navigator);
            let shortcut = Shortcut::new(record.keys, action, record.action_data)
                .with_unrecognized_action(record.unrecognized_action);
            self.registry.register(id, shortcut);
        }
        Ok(count)
    }

    #[instrument(name = "navigatorx_load", skip(self), fields(storage_key = %self.storage_key))]
    fn load(&mut self) {
        if let Some(count) = self.try_load().log_err() {
            if count > 0 {
                info!(entry_count = count, "Restored persisted shortcuts");
            }
        }
    }
}

impl std::fmt::Debug for NavigatorX {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigatorX")
            .field("storage_key", &self.storage_key)
            .field("registry", &self.registry)
            .field("held", &self.keys.held_keys())
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}
