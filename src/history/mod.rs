//! History synchronization subsystem.
//!
//! # Data Flow
//! ```text
//! Commit (navigation controller):
//!     HistoryEntry { path, navigation_sequence }
//!     → HistoryAdapter::push / replace
//!     → environment address updated
//!
//! Back / forward (environment):
//!     adapter cursor moves
//!     → PopEvent { entry, delta } delivered to listeners
//!     → navigator re-enters navigate(entry.path, replace = true)
//! ```
//!
//! # Design Decisions
//! - The adapter is the only component that touches the environment
//! - Writes are async: a real address bar may suspend
//! - A failed write leaves the adapter unchanged
//! - `memory.rs` backs tests and non-browser hosts; `address.rs` models a
//!   browser address bar in path or hash mode

pub mod address;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

pub use address::{AddressMode, UrlHistory};
pub use memory::MemoryHistory;

/// One record in the environment's history stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Full path (with query) that was committed.
    pub path: String,
    /// Sequence number of the navigation that wrote the entry.
    pub navigation_sequence: u64,
}

/// A back/forward traversal reported by the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopEvent {
    /// The entry now under the cursor.
    pub entry: HistoryEntry,
    /// Signed traversal distance (`-1` for back).
    pub delta: isize,
}

/// Callback fired on pop events.
pub type PopListener = Arc<dyn Fn(PopEvent) + Send + Sync>;

/// Capability interface over the host's address/history mechanism.
#[async_trait]
pub trait HistoryAdapter: Send + Sync + fmt::Debug {
    /// Record a new entry after the current one, discarding forward entries.
    async fn push(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Overwrite the current entry.
    async fn replace(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// The entry under the cursor, if any.
    fn current(&self) -> Option<HistoryEntry>;

    /// Register a pop-event listener.
    fn on_pop_event(&self, listener: PopListener);

    /// Move the cursor by `delta`. Listeners fire only when `notify` is set.
    async fn go(&self, delta: isize, notify: bool) -> Result<(), HistoryError>;
}
