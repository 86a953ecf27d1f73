//! Navigation state and outcomes.
//!
//! # Phases
//! ```text
//! Idle → Resolving → Guarding → Committing → Idle
//!            │           │
//!            └───────────┴──→ Rejected (not found / denied) → Idle
//! ```
//!
//! # Design Decisions
//! - Only the committed route is state; in-flight navigations are not
//! - The sequence recorded here is the one that committed `current`

use std::sync::Arc;

use crate::routing::ResolvedRoute;

/// The committed navigation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// The current route (`None` before the first commit).
    pub current: Option<Arc<ResolvedRoute>>,
    /// Sequence number of the navigation that committed `current`.
    pub sequence: u64,
}

/// Phase of the most recent navigation.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
    Idle = 0,
    Resolving = 1,
    Guarding = 2,
    Committing = 3,
    /// Not found or denied; nothing will be committed.
    Rejected = 4,
}

impl From<u8> for NavigationPhase {
    fn from(val: u8) -> Self {
        match val {
            1 => NavigationPhase::Resolving,
            2 => NavigationPhase::Guarding,
            3 => NavigationPhase::Committing,
            4 => NavigationPhase::Rejected,
            _ => NavigationPhase::Idle,
        }
    }
}

/// Options for a single navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Overwrite the current history entry instead of pushing.
    pub replace: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// How a navigation ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// State, history and subscribers were updated.
    Committed(Arc<ResolvedRoute>),
    /// The target is already current; nothing changed.
    Duplicated(Arc<ResolvedRoute>),
    /// A guard denied the navigation.
    Denied { path: String },
    /// No route matched and the not-found handler rejected it.
    NotFound { path: String },
    /// A newer navigation started before this one could commit.
    Superseded { sequence: u64 },
}

impl NavigationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, NavigationOutcome::Committed(_))
    }

    /// The route the navigation ended on, if it ended on one.
    pub fn route(&self) -> Option<&Arc<ResolvedRoute>> {
        match self {
            NavigationOutcome::Committed(route) | NavigationOutcome::Duplicated(route) => Some(route),
            _ => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            NavigationOutcome::Committed(_) => "committed",
            NavigationOutcome::Duplicated(_) => "duplicated",
            NavigationOutcome::Denied { .. } => "denied",
            NavigationOutcome::NotFound { .. } => "not_found",
            NavigationOutcome::Superseded { .. } => "superseded",
        }
    }
}
