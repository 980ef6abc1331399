use thiserror::Error;
use tracing::{error, warn};

use crate::shortcuts::StorageError;

/// Domain-specific errors for the shortcut engine
#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to (de)serialize shortcuts: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid shortcut keys: {0}")]
    InvalidKeys(String),
}

impl NavigatorError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(StorageError::QuotaExceeded { .. }) => {
                "Shortcut storage is full; changes were kept in memory only".to_string()
            }
            Self::Storage(e) => format!("Could not access shortcut storage: {}", e),
            Self::Serialization(e) => format!("Saved shortcuts are unreadable: {}", e),
            Self::InvalidKeys(msg) => format!("Invalid shortcut: {}", msg),
        }
    }
}

impl From<crate::shortcuts::ShortcutParseError> for NavigatorError {
    fn from(e: crate::shortcuts::ShortcutParseError) -> Self {
        Self::InvalidKeys(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavigatorError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use navigatorx::error::ResultExt;
///
/// // Keep the in-memory registry even if the write failed
/// storage.set(key, &json).log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
