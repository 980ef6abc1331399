//! Configuration module - engine options and their on-disk form
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - `NavigatorOptions`
//! - `loader` - File system loading and path resolution

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_CONFIG_PATH, DEFAULT_MAX_HELD_KEYS, DEFAULT_STORAGE_KEY};

pub use types::NavigatorOptions;

pub use loader::{default_config_path, default_storage_dir, load_config, load_options, storage_dir};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
