//! Unified error types for Stepwise with fail-open philosophy.
//!
//! Nothing in the progression core is fatal. Lookups that miss resolve to
//! safe defaults, validation failures are ordinary outcomes, and storage
//! errors are logged and degrade the session to in-memory operation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Stepwise operations.
#[derive(Error, Debug)]
pub enum StepwiseError {
    /// I/O errors from progress record operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON serialization or deserialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Operation rejected in the current state (e.g. a submission in flight).
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A lesson, level, track or badge is absent from the catalog.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Content catalog loading errors.
    #[error("content error: {message}")]
    Content { message: String },
}

/// A specialized Result type for Stepwise operations.
pub type Result<T> = std::result::Result<T, StepwiseError>;

impl StepwiseError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given entity kind.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a content error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content {
            message: message.into(),
        }
    }

    /// Whether this error came from the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Serde { .. })
    }
}

impl From<io::Error> for StepwiseError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for StepwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and return a safe default instead of propagating it.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the Stepwise CLI.
pub mod exit_codes {
    /// Command completed.
    pub const OK: i32 = 0;

    /// Command ran but did not succeed (locked content, wrong answer, ...).
    pub const ERROR: i32 = 1;

    /// Process panicked.
    pub const CRASH: i32 = 3;
}
