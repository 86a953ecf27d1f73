//! Error types shared across the router.
//!
//! # Taxonomy
//! - `PatternError`: a route pattern could not be compiled
//! - `RouteTableError`: registration failed (startup-fatal)
//! - `GuardError`: a guard callback failed (aborts the navigation)
//! - `HistoryError`: the history adapter could not record an entry
//! - `NavigationError`: everything a `navigate` call can fail with
//!
//! Unmatched paths, denied navigations and superseded navigations are not
//! errors; they are reported through `NavigationOutcome`.

use thiserror::Error;

/// A route pattern that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Patterns are absolute.
    #[error("pattern `{0}` must start with '/'")]
    NotAbsolute(String),

    /// `:` or `*` without a name.
    #[error("pattern `{pattern}` has an unnamed parameter in segment {index}")]
    EmptyParameter { pattern: String, index: usize },

    /// The same parameter name bound twice.
    #[error("pattern `{pattern}` binds parameter `{name}` more than once")]
    DuplicateParameter { pattern: String, name: String },

    /// A catch-all segment followed by more segments.
    #[error("pattern `{pattern}` has a catch-all segment that is not last")]
    CatchAllNotLast { pattern: String },
}

/// Route table registration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    /// Two definitions share an id.
    #[error("duplicate route id `{id}`")]
    DuplicateId { id: String },

    /// Two definitions share a structurally identical pattern.
    #[error("route `{duplicate}` repeats the pattern `{pattern}` already registered by `{existing}`")]
    DuplicatePattern {
        pattern: String,
        existing: String,
        duplicate: String,
    },

    /// A definition's pattern failed to compile.
    #[error("route `{id}`: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: PatternError,
    },
}

/// An error raised from inside a guard callback.
#[derive(Debug, Error)]
#[error("guard failed: {message}")]
pub struct GuardError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GuardError {
    /// Create a guard error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a guard error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The guard's description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure reported by a history adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The environment refused to record the entry.
    #[error("history write failed: {0}")]
    Write(String),

    /// Traversal outside the recorded entries.
    #[error("history traversal by {delta} from index {index} is out of range")]
    OutOfRange { index: usize, delta: isize },

    /// A path could not be mapped onto the adapter's address.
    #[error("invalid address for path `{path}`: {reason}")]
    Address { path: String, reason: String },
}

/// Errors surfaced to the caller of `navigate`.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Redirect chain exceeded the configured depth.
    #[error("redirect limit of {limit} exceeded while navigating to `{path}`")]
    RedirectLoop { limit: usize, path: String },

    /// A guard callback failed.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The history adapter failed during commit; nothing was committed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;
