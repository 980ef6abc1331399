use super::*;
use crate::config::NavigatorOptions;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

// Helper: engine over a shared in-memory store at "/"
fn engine_with(storage: &MemoryStorage, key: &str) -> (NavigatorX, HistoryNavigator) {
    let history = HistoryNavigator::new("/");
    let engine = NavigatorX::new(
        NavigatorOptions::with_storage_key(key),
        storage.clone(),
        Rc::new(history.clone()),
    );
    (engine, history)
}

fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    (count, move || inner.set(inner.get() + 1))
}

// Press modifier then key with only that modifier's flag set.
fn chord(modifier: ModifierKey, key: &str) -> Vec<InputEvent> {
    vec![
        InputEvent::key_down(KeyEvent::with_modifier(modifier.name(), modifier)),
        InputEvent::key_down(KeyEvent::with_modifier(key, modifier)),
    ]
}

fn release_all(keys: &[&str]) -> Vec<InputEvent> {
    keys.iter().map(|k| InputEvent::key_up(*k)).collect()
}

fn run(engine: &mut NavigatorX, events: Vec<InputEvent>) -> usize {
    let mut source: VecDeque<InputEvent> = events.into();
    engine.pump(&mut source)
}

#[test]
fn test_exact_chord_fires_once() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("save", ShortcutKeys::new(ModifierKey::Control, "s"), action, None);

    assert_eq!(run(&mut engine, chord(ModifierKey::Control, "s")), 1);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_match_prevents_default_only_when_firing() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    engine.register("k", ShortcutKeys::new(ModifierKey::Shift, "k"), || {}, None);

    let first = engine.dispatch(&InputEvent::key_down(KeyEvent::with_modifier(
        "Shift",
        ModifierKey::Shift,
    )));
    assert!(!first.default_prevented);

    let second = engine.dispatch(&InputEvent::key_down(KeyEvent::with_modifier(
        "K",
        ModifierKey::Shift,
    )));
    assert!(second.default_prevented);
    assert_eq!(second.fired, vec!["k".to_string()]);
}

#[test]
fn test_extra_modifier_never_fires() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("k", ShortcutKeys::new(ModifierKey::Shift, "k"), action, None);

    let events = vec![
        InputEvent::key_down(KeyEvent::with_modifier("Shift", ModifierKey::Shift)),
        InputEvent::key_down(
            KeyEvent::with_modifier("k", ModifierKey::Shift).modifier(ModifierKey::Control),
        ),
    ];
    assert_eq!(run(&mut engine, events), 0);
    assert_eq!(count.get(), 0);
}

#[test]
fn test_third_held_key_never_fires() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("s", ShortcutKeys::new(ModifierKey::Control, "s"), action, None);

    let mut events = vec![InputEvent::key_down(KeyEvent::new("x"))];
    events.extend(chord(ModifierKey::Control, "s"));
    run(&mut engine, events);
    assert_eq!(count.get(), 0);

    // Releasing the stray key and pressing again fires.
    let mut events = release_all(&["x", "s"]);
    events.push(InputEvent::key_down(KeyEvent::with_modifier(
        "s",
        ModifierKey::Control,
    )));
    run(&mut engine, events);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_duplicate_id_overwrites() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (first, first_action) = counter();
    let (second, second_action) = counter();

    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), first_action, None);
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), second_action, None);
    assert_eq!(engine.len(), 1);

    run(&mut engine, chord(ModifierKey::Alt, "x"));
    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn test_identical_chords_both_fire() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (a, a_action) = counter();
    let (b, b_action) = counter();
    engine.register("a", ShortcutKeys::new(ModifierKey::Meta, "k"), a_action, None);
    engine.register("b", ShortcutKeys::new(ModifierKey::Meta, "k"), b_action, None);

    assert_eq!(run(&mut engine, chord(ModifierKey::Meta, "k")), 2);
    assert_eq!((a.get(), b.get()), (1, 1));
}

#[test]
fn test_overflow_clears_and_suppresses_match() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("k", ShortcutKeys::new(ModifierKey::Control, "k"), action, None);

    // Nine unrelated keys plus Control: ten held.
    let mut events: Vec<InputEvent> = ["a", "b", "c", "d", "e", "f", "g", "h", "i"]
        .iter()
        .map(|k| InputEvent::key_down(KeyEvent::new(*k)))
        .collect();
    events.push(InputEvent::key_down(KeyEvent::with_modifier(
        "Control",
        ModifierKey::Control,
    )));
    run(&mut engine, events);
    assert_eq!(engine.held_keys().len(), 10);

    let outcome = engine.dispatch(&InputEvent::key_down(KeyEvent::with_modifier(
        "k",
        ModifierKey::Control,
    )));
    assert_eq!(outcome, DispatchOutcome::default());
    assert!(engine.held_keys().is_empty());
    assert_eq!(count.get(), 0);
}

#[test]
fn test_unregister_stops_firing() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("x", ShortcutKeys::new(ModifierKey::Control, "x"), action, None);
    engine.unregister("x");
    engine.unregister("never-registered");

    run(&mut engine, chord(ModifierKey::Control, "x"));
    assert_eq!(count.get(), 0);
    assert!(!engine.has("x"));
}

#[test]
fn test_blur_between_press_and_release_prevents_stray_match() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("s", ShortcutKeys::new(ModifierKey::Control, "s"), action, None);

    // Hold "x", lose focus, come back and press the chord.
    let mut events = vec![InputEvent::key_down(KeyEvent::new("x")), InputEvent::Blur];
    events.extend(chord(ModifierKey::Control, "s"));
    run(&mut engine, events);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_hidden_document_clears_and_ignores_presses() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    let (count, action) = counter();
    engine.register("s", ShortcutKeys::new(ModifierKey::Control, "s"), action, None);

    let events = vec![
        InputEvent::key_down(KeyEvent::with_modifier("Control", ModifierKey::Control)),
        InputEvent::VisibilityChange { hidden: true },
        InputEvent::key_down(KeyEvent::with_modifier("s", ModifierKey::Control)),
    ];
    run(&mut engine, events);
    assert_eq!(count.get(), 0);
    assert!(engine.held_keys().is_empty());

    // Half-completed chord after refocus: only "s" is newly held.
    run(
        &mut engine,
        vec![
            InputEvent::VisibilityChange { hidden: false },
            InputEvent::key_down(KeyEvent::with_modifier("s", ModifierKey::Control)),
        ],
    );
    assert_eq!(count.get(), 0);
    assert_eq!(engine.held_keys(), vec!["s".to_string()]);
}

#[test]
fn test_get_all_is_a_copy() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "t");
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);

    let mut all = engine.get_all();
    all.clear();
    assert!(engine.has("x"));
    assert_eq!(engine.get_all().len(), 1);
}

#[test]
fn test_custom_action_roundtrip() {
    let storage = MemoryStorage::new();
    {
        let (mut engine, _) = engine_with(&storage, "shared");
        engine.register(
            "save",
            ShortcutKeys::new(ModifierKey::Control, "s"),
            || panic!("live callback must not survive reload"),
            Some(custom_action("saved")),
        );
    }

    let (reloaded, history) = engine_with(&storage, "shared");
    let all = reloaded.get_all();
    let entry = &all["save"];
    assert_eq!(entry.action_data, Some(custom_action("saved")));
    assert_eq!(entry.keys, ShortcutKeys::new(ModifierKey::Control, "s"));

    (entry.action)();
    assert_eq!(history.location(), "/");
}

#[test]
fn test_navigate_action_roundtrip() {
    let storage = MemoryStorage::new();
    {
        let (mut engine, _) = engine_with(&storage, "shared");
        engine.register(
            "go",
            ShortcutKeys::new(ModifierKey::Control, "g"),
            || {},
            Some(navigate_action("/x")),
        );
    }

    let (mut reloaded, history) = engine_with(&storage, "shared");
    run(&mut reloaded, chord(ModifierKey::Control, "g"));
    assert_eq!(history.location(), "/x");
}

#[test]
fn test_back_action_roundtrip_uses_history() {
    let storage = MemoryStorage::new();
    {
        let (mut engine, _) = engine_with(&storage, "shared");
        engine.register(
            "back",
            ShortcutKeys::new(ModifierKey::Alt, "ArrowLeft"),
            || {},
            Some(back_action(Some("/home"))),
        );
    }

    let (mut reloaded, history) = engine_with(&storage, "shared");
    run(&mut reloaded, chord(ModifierKey::Alt, "ArrowLeft"));
    assert_eq!(history.location(), "/home");

    history.assign("/deeper");
    run(&mut reloaded, release_all(&["arrowleft"]));
    run(
        &mut reloaded,
        vec![InputEvent::key_down(KeyEvent::with_modifier(
            "ArrowLeft",
            ModifierKey::Alt,
        ))],
    );
    assert_eq!(history.location(), "/home");
}

#[test]
fn test_undescribed_shortcut_restores_as_noop() {
    let storage = MemoryStorage::new();
    {
        let (mut engine, _) = engine_with(&storage, "shared");
        engine.register("plain", ShortcutKeys::new(ModifierKey::Shift, "p"), || {}, None);
    }

    let (mut reloaded, history) = engine_with(&storage, "shared");
    assert!(reloaded.has("plain"));
    assert_eq!(reloaded.get("plain").unwrap().action_data, None);
    assert_eq!(run(&mut reloaded, chord(ModifierKey::Shift, "p")), 1);
    assert_eq!(history.history(), vec!["/".to_string()]);
}

#[test]
fn test_clear_removes_persisted_record() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "shared");
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);
    assert!(storage.contains("shared"));

    engine.clear();
    assert_eq!(engine.get_all().len(), 0);
    assert!(!storage.contains("shared"));

    let (fresh, _) = engine_with(&storage, "shared");
    assert!(fresh.is_empty());
}

#[test]
fn test_destroy_detaches_but_keeps_storage() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "shared");
    let (count, action) = counter();
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), action, None);

    engine.destroy();
    assert!(!engine.is_attached());
    assert!(engine.is_empty());
    assert_eq!(run(&mut engine, chord(ModifierKey::Alt, "x")), 0);
    assert_eq!(count.get(), 0);
    assert!(engine.held_keys().is_empty());

    let (fresh, _) = engine_with(&storage, "shared");
    assert!(fresh.has("x"));
}

#[test]
fn test_storage_keys_are_isolated() {
    let storage = MemoryStorage::new();
    let (mut a, _) = engine_with(&storage, "a");
    a.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);

    let (b, _) = engine_with(&storage, "b");
    assert!(b.is_empty());
}

#[test]
fn test_default_storage_key() {
    let storage = MemoryStorage::new();
    let mut engine = NavigatorX::new(
        NavigatorOptions::default(),
        storage.clone(),
        Rc::new(HistoryNavigator::default()),
    );
    assert_eq!(engine.storage_key(), "navigatorx_shortcuts");
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);
    assert!(storage.contains("navigatorx_shortcuts"));
}

#[test]
fn test_save_failure_keeps_registration() {
    let storage = MemoryStorage::with_quota(16);
    let (mut engine, _) = engine_with(&storage, "k");
    let (count, action) = counter();
    engine.register(
        "long-identifier",
        ShortcutKeys::new(ModifierKey::Control, "s"),
        action,
        Some(custom_action("this will not fit in the quota")),
    );

    assert!(engine.has("long-identifier"));
    assert!(!storage.contains("k"));
    assert!(!engine.is_persisted("long-identifier").unwrap());
    run(&mut engine, chord(ModifierKey::Control, "s"));
    assert_eq!(count.get(), 1);
}

#[test]
fn test_is_persisted_reads_back_storage() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "k");
    assert!(!engine.is_persisted("x").unwrap());

    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);
    assert!(engine.is_persisted("x").unwrap());

    storage.set("k", "not json").unwrap();
    assert!(matches!(
        engine.is_persisted("x"),
        Err(crate::error::NavigatorError::Serialization(_))
    ));
}

#[test]
fn test_corrupt_storage_starts_empty() {
    let storage = MemoryStorage::new();
    storage.set("k", "{ definitely not json").unwrap();

    let (mut engine, _) = engine_with(&storage, "k");
    assert!(engine.is_empty());

    // Still usable, and the next save overwrites the corrupt record.
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);
    let (fresh, _) = engine_with(&storage, "k");
    assert!(fresh.has("x"));
}

#[test]
fn test_unknown_persisted_tag_degrades_to_noop() {
    let storage = MemoryStorage::new();
    storage
        .set(
            "k",
            r#"{"odd":{"keys":["Control","o"],"actionData":{"type":"teleport","to":"mars"}}}"#,
        )
        .unwrap();

    let (mut engine, history) = engine_with(&storage, "k");
    assert!(engine.has("odd"));
    assert_eq!(run(&mut engine, chord(ModifierKey::Control, "o")), 1);
    assert_eq!(history.location(), "/");
}

#[test]
fn test_unreadable_storage_starts_empty() {
    struct Broken;
    impl Storage for Broken {
        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
        fn remove(&self, _key: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    let mut engine = NavigatorX::new(
        NavigatorOptions::default(),
        Broken,
        Rc::new(HistoryNavigator::default()),
    );
    assert!(engine.is_empty());

    let (count, action) = counter();
    engine.register("x", ShortcutKeys::new(ModifierKey::Meta, "x"), action, None);
    run(&mut engine, chord(ModifierKey::Meta, "x"));
    assert_eq!(count.get(), 1);

    engine.clear();
    assert!(engine.is_empty());
}

#[test]
fn test_file_storage_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut engine = NavigatorX::new(
            NavigatorOptions::with_storage_key("file_keys"),
            FileStorage::new(dir.path()),
            Rc::new(HistoryNavigator::default()),
        );
        engine.register(
            "go",
            ShortcutKeys::new(ModifierKey::Control, "g"),
            || {},
            Some(navigate_action("/docs")),
        );
    }

    let history = HistoryNavigator::default();
    let mut engine = NavigatorX::new(
        NavigatorOptions::with_storage_key("file_keys"),
        FileStorage::new(dir.path()),
        Rc::new(history.clone()),
    );
    run(&mut engine, chord(ModifierKey::Control, "g"));
    assert_eq!(history.location(), "/docs");
}

#[test]
fn test_configured_capacity_applies() {
    let storage = MemoryStorage::new();
    let mut options = NavigatorOptions::with_storage_key("k");
    options.max_held_keys = 2;
    let mut engine = NavigatorX::new(options, storage, Rc::new(HistoryNavigator::default()));

    let (count, action) = counter();
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), action, None);
    run(
        &mut engine,
        vec![
            InputEvent::key_down(KeyEvent::new("q")),
            InputEvent::key_down(KeyEvent::with_modifier("Alt", ModifierKey::Alt)),
            InputEvent::key_down(KeyEvent::with_modifier("x", ModifierKey::Alt)),
        ],
    );
    assert_eq!(count.get(), 0);
    assert!(engine.held_keys().is_empty());
}

#[test]
fn test_unknown_persisted_tag_survives_resave() {
    let storage = MemoryStorage::new();
    storage
        .set(
            "k",
            r#"{"odd":{"keys":["Control","o"],"actionData":{"type":"teleport","to":"mars"}}}"#,
        )
        .unwrap();

    let (mut engine, _) = engine_with(&storage, "k");
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), || {}, None);

    let saved: serde_json::Value = serde_json::from_str(&storage.raw("k").unwrap()).unwrap();
    assert_eq!(
        saved["odd"]["actionData"],
        serde_json::json!({"type": "teleport", "to": "mars"})
    );
    assert!(saved["x"]["actionData"].is_null());
}

#[test]
fn test_unreadable_keys_survive_resave_until_unregistered() {
    let storage = MemoryStorage::new();
    storage
        .set(
            "k",
            r#"{"a":{"keys":["control","s"],"actionData":null},"b":{"keys":["Alt","b"],"actionData":null}}"#,
        )
        .unwrap();

    let (mut engine, _) = engine_with(&storage, "k");
    assert!(!engine.has("a"));
    assert!(engine.has("b"));

    // Never matches, even on the chord it names.
    assert_eq!(run(&mut engine, chord(ModifierKey::Control, "s")), 0);

    engine.register("x", ShortcutKeys::new(ModifierKey::Meta, "x"), || {}, None);
    let saved: serde_json::Value = serde_json::from_str(&storage.raw("k").unwrap()).unwrap();
    assert_eq!(saved["a"]["keys"], serde_json::json!(["control", "s"]));
    assert!(saved.get("b").is_some());
    assert!(saved.get("x").is_some());

    engine.unregister("a");
    let saved: serde_json::Value = serde_json::from_str(&storage.raw("k").unwrap()).unwrap();
    assert!(saved.get("a").is_none());
}

#[test]
fn test_capacity_below_chord_is_raised() {
    let storage = MemoryStorage::new();
    let mut options = NavigatorOptions::with_storage_key("k");
    options.max_held_keys = 1;
    let mut engine = NavigatorX::new(options, storage, Rc::new(HistoryNavigator::default()));

    let (count, action) = counter();
    engine.register("x", ShortcutKeys::new(ModifierKey::Alt, "x"), action, None);
    run(&mut engine, chord(ModifierKey::Alt, "x"));
    assert_eq!(count.get(), 1);
}

#[test]
#[should_panic(expected = "action failed")]
fn test_panicking_action_propagates() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "k");
    engine.register(
        "boom",
        ShortcutKeys::new(ModifierKey::Control, "b"),
        || panic!("action failed"),
        None,
    );
    run(&mut engine, chord(ModifierKey::Control, "b"));
}

#[test]
fn test_panicking_action_leaves_earlier_saves() {
    let storage = MemoryStorage::new();
    let (mut engine, _) = engine_with(&storage, "k");
    engine.register(
        "go",
        ShortcutKeys::new(ModifierKey::Alt, "g"),
        || {},
        Some(navigate_action("/docs")),
    );
    engine.register(
        "boom",
        ShortcutKeys::new(ModifierKey::Control, "b"),
        || panic!("action failed"),
        None,
    );

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        run(&mut engine, chord(ModifierKey::Control, "b"))
    }));
    assert!(result.is_err());

    let (mut fresh, history) = engine_with(&storage, "k");
    assert!(fresh.has("go"));
    assert!(fresh.has("boom"));
    run(&mut fresh, chord(ModifierKey::Alt, "g"));
    assert_eq!(history.location(), "/docs");
}
