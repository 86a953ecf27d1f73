//! In-memory history.
//!
//! Keeps an entry stack and a cursor, the way a browser tab does, without
//! any environment behind it.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::HistoryError;
use crate::history::{HistoryAdapter, HistoryEntry, PopEvent, PopListener};

#[derive(Debug, Default)]
struct HistoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

/// History adapter for tests and non-browser hosts.
#[derive(Default)]
pub struct MemoryHistory {
    stack: Mutex<HistoryStack>,
    listeners: Mutex<Vec<PopListener>>,
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MemoryHistory")
            .field("entries", &stack.entries)
            .field("index", &stack.index)
            .finish()
    }
}

impl MemoryHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history whose first entry is `path` (sequence 0).
    pub fn with_initial(path: impl Into<String>) -> Self {
        let history = Self::new();
        history.stack().entries.push(HistoryEntry {
            path: path.into(),
            navigation_sequence: 0,
        });
        history
    }

    fn stack(&self) -> std::sync::MutexGuard<'_, HistoryStack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.stack().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack().entries.is_empty()
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.stack().index
    }

    /// Snapshot of all entries.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.stack().entries.clone()
    }

    /// Go back one entry, notifying listeners.
    pub async fn back(&self) -> Result<(), HistoryError> {
        self.go(-1, true).await
    }

    /// Go forward one entry, notifying listeners.
    pub async fn forward(&self) -> Result<(), HistoryError> {
        self.go(1, true).await
    }

    fn emit(&self, event: PopEvent) {
        // Snapshot so a listener may register another listener.
        let listeners: Vec<PopListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

#[async_trait]
impl HistoryAdapter for MemoryHistory {
    async fn push(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut stack = self.stack();
        if stack.entries.is_empty() {
            stack.entries.push(entry);
            stack.index = 0;
        } else {
            let keep = stack.index + 1;
            stack.entries.truncate(keep);
            stack.entries.push(entry);
            stack.index = keep;
        }
        Ok(())
    }

    async fn replace(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut stack = self.stack();
        let index = stack.index;
        match stack.entries.get_mut(index) {
            Some(slot) => *slot = entry,
            None => stack.entries.push(entry),
        }
        Ok(())
    }

    fn current(&self) -> Option<HistoryEntry> {
        let stack = self.stack();
        stack.entries.get(stack.index).cloned()
    }

    fn on_pop_event(&self, listener: PopListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    async fn go(&self, delta: isize, notify: bool) -> Result<(), HistoryError> {
        if delta == 0 {
            return Ok(());
        }

        let entry = {
            let mut stack = self.stack();
            let target = stack.index as isize + delta;
            if target < 0 || target >= stack.entries.len() as isize {
                return Err(HistoryError::OutOfRange {
                    index: stack.index,
                    delta,
                });
            }
            stack.index = target as usize;
            stack.entries[stack.index].clone()
        };

        tracing::debug!(path = %entry.path, delta, notify, "History traversed");
        if notify {
            self.emit(PopEvent { entry, delta });
        }
        Ok(())
    }
}
