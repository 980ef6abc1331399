//! NavigatorX - keyboard chord shortcuts that survive a reload
//!
//! This library detects modifier + key chords from a raw stream of
//! key/focus/visibility events, fires the registered callbacks, and
//! persists a serializable description of each callback so an equivalent
//! one can be rebuilt on the next start.

pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod shortcuts;

pub use config::NavigatorOptions;
pub use error::{NavigatorError, Result};
pub use shortcuts::NavigatorX;
