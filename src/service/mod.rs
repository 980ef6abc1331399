//! Shortcut service - metadata, registration policy and execution tracking
//!
//! Wraps one `NavigatorX` engine. Registration goes through a stricter
//! policy (disabled configs are skipped, duplicate ids are rejected unless
//! overriding) and every action is wrapped so its executions are counted,
//! kept in a bounded history and broadcast to listeners.

mod helpers;
mod types;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, warn};

use crate::shortcuts::{
    ActionData, DispatchOutcome, EventSource, InputEvent, NavigatorX, Shortcut, ShortcutKeys,
};

pub use helpers::{
    filter_by_category, find_conflicts, format_shortcut, group_by_category, validate_config,
};
pub use types::{
    RegisterOptions, ServiceError, ShortcutCategory, ShortcutConfig, ShortcutEvent, ShortcutStats,
    SubscriptionId,
};

/// Executions kept for `stats().last_executed` and inspection
pub const MAX_TRACKED_EVENTS: usize = 100;

/// Entries reported in `ShortcutStats::most_used`
const MOST_USED_LIMIT: usize = 5;

/// A fallible service-level action
pub type ServiceAction = Box<dyn Fn() -> anyhow::Result<()>>;

type Listener = Rc<dyn Fn(&ShortcutEvent)>;

#[derive(Default)]
struct ExecutionTracker {
    counts: HashMap<String, u64>,
    events: VecDeque<ShortcutEvent>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ExecutionTracker {
    fn record(&mut self, event: ShortcutEvent) {
        *self.counts.entry(event.id.clone()).or_insert(0) += 1;
        self.events.push_back(event);
        while self.events.len() > MAX_TRACKED_EVENTS {
            self.events.pop_front();
        }
    }

    fn reset(&mut self) {
        self.counts.clear();
        self.events.clear();
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub struct ShortcutService {
    engine: NavigatorX,
    tracker: Rc<RefCell<ExecutionTracker>>,
}

impl ShortcutService {
    pub fn new(engine: NavigatorX) -> Self {
        Self {
            engine,
            tracker: Rc::default(),
        }
    }

    pub fn engine(&self) -> &NavigatorX {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut NavigatorX {
        &mut self.engine
    }

    /// Register `config` with policy checks and execution tracking.
    pub fn register(
        &mut self,
        config: &ShortcutConfig,
        action: impl Fn() -> anyhow::Result<()> + 'static,
        action_data: Option<ActionData>,
        options: RegisterOptions,
    ) -> Result<(), ServiceError> {
        if !config.enabled {
            warn!(shortcut_id = %config.id, "Shortcut is disabled, skipping registration");
            return Ok(());
        }

        validate_config(config)?;

        if self.engine.has(&config.id) && !options.override_existing {
            return Err(ServiceError::AlreadyRegistered(config.id.clone()));
        }

        let wrapped = self.wrap_action(config.id.clone(), config.keys.clone(), action);
        let action_data = if options.persist { action_data } else { None };
        self.engine
            .register(config.id.clone(), config.keys.clone(), wrapped, action_data);
        Ok(())
    }

    /// Register an action that only runs while `can_execute` allows it.
    pub fn register_guarded(
        &mut self,
        config: &ShortcutConfig,
        execute: impl Fn() -> anyhow::Result<()> + 'static,
        can_execute: impl Fn() -> bool + 'static,
        action_data: Option<ActionData>,
    ) -> Result<(), ServiceError> {
        let id = config.id.clone();
        let action = move || {
            if !can_execute() {
                warn!(shortcut_id = %id, "Cannot execute shortcut");
                return Ok(());
            }
            execute()
        };
        self.register(config, action, action_data, RegisterOptions::default())
    }

    /// Register many configs; those without an entry in `actions` are skipped.
    pub fn register_batch(
        &mut self,
        configs: &[ShortcutConfig],
        mut actions: HashMap<String, ServiceAction>,
        action_data: &HashMap<String, ActionData>,
    ) -> Result<(), ServiceError> {
        for config in configs {
            let Some(action) = actions.remove(&config.id) else {
                warn!(shortcut_id = %config.id, "No action found for shortcut");
                continue;
            };
            let data = action_data.get(&config.id).cloned();
            self.register(config, action, data, RegisterOptions::default())?;
        }
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) {
        self.engine.unregister(id);
        self.tracker.borrow_mut().counts.remove(id);
    }

    pub fn has(&self, id: &str) -> bool {
        self.engine.has(id)
    }

    pub fn get_all(&self) -> HashMap<String, Shortcut> {
        self.engine.get_all()
    }

    pub fn dispatch(&mut self, event: &InputEvent) -> DispatchOutcome {
        self.engine.dispatch(event)
    }

    pub fn pump<S: EventSource + ?Sized>(&mut self, source: &mut S) -> usize {
        self.engine.pump(source)
    }

    pub fn stats(&self) -> ShortcutStats {
        let tracker = self.tracker.borrow();

        let mut most_used: Vec<(String, u64)> = tracker
            .counts
            .iter()
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        most_used.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        most_used.truncate(MOST_USED_LIMIT);

        ShortcutStats {
            total_registered: self.engine.len(),
            total_executed: tracker.counts.values().sum(),
            most_used,
            last_executed: tracker.events.back().cloned(),
        }
    }

    /// Recent executions, oldest first.
    pub fn recent_events(&self) -> Vec<ShortcutEvent> {
        self.tracker.borrow().events.iter().cloned().collect()
    }

    /// Subscribe to executions.
    pub fn on(&self, listener: impl Fn(&ShortcutEvent) + 'static) -> SubscriptionId {
        let mut tracker = self.tracker.borrow_mut();
        let id = SubscriptionId(tracker.next_subscription);
        tracker.next_subscription += 1;
        tracker.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was subscribed.
    pub fn off(&self, subscription: SubscriptionId) -> bool {
        let mut tracker = self.tracker.borrow_mut();
        let before = tracker.listeners.len();
        tracker.listeners.retain(|(id, _)| *id != subscription);
        tracker.listeners.len() != before
    }

    pub fn clear(&mut self) {
        self.engine.clear();
        self.tracker.borrow_mut().reset();
    }

    pub fn destroy(&mut self) {
        self.engine.destroy();
        let mut tracker = self.tracker.borrow_mut();
        tracker.reset();
        tracker.listeners.clear();
    }

    fn wrap_action(
        &self,
        id: String,
        keys: ShortcutKeys,
        action: impl Fn() -> anyhow::Result<()> + 'static,
    ) -> impl Fn() + 'static {
        let tracker = Rc::clone(&self.tracker);
        move || {
            let result = action();
            let event = ShortcutEvent {
                id: id.clone(),
                keys: keys.clone(),
                timestamp_ms: now_ms(),
                success: result.is_ok(),
                error: result.as_ref().err().map(|e| format!("{:#}", e)),
            };
            if let Err(e) = &result {
                error!(shortcut_id = %id, error = %format!("{:#}", e), "Shortcut action failed");
            }

            // Release the tracker before notifying listeners.
            let listeners: Vec<Listener> = {
                let mut tracker = tracker.borrow_mut();
                tracker.record(event.clone());
                tracker.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
            };
            for listener in listeners {
                listener(&event);
            }
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
