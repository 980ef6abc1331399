//! Default configuration values

/// Storage slot used when no key is configured
pub const DEFAULT_STORAGE_KEY: &str = "navigatorx_shortcuts";

/// Held keys allowed before the tracker resets itself
pub const DEFAULT_MAX_HELD_KEYS: usize = crate::shortcuts::MAX_HELD_KEYS;

/// Config file location, tilde-expanded at load time
pub const DEFAULT_CONFIG_PATH: &str = "~/.navigatorx/config.json";
