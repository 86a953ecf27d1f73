//! Address-bar history.
//!
//! Models what a browser shows while the application navigates: every entry
//! maps to a full URL under a base address, either as a real path
//! (`https://host/app/users`) or as a fragment (`https://host/app/#/users`).

use async_trait::async_trait;
use url::Url;

use crate::error::HistoryError;
use crate::history::memory::MemoryHistory;
use crate::history::{HistoryAdapter, HistoryEntry, PopListener};

/// How application paths are written into the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Path appended to the base path.
    Browser,
    /// Path stored in the fragment.
    Hash,
}

/// History adapter that keeps a URL per entry.
#[derive(Debug)]
pub struct UrlHistory {
    base: Url,
    mode: AddressMode,
    entries: MemoryHistory,
}

impl UrlHistory {
    /// Create an address-bar history under `base`.
    pub fn new(base: Url, mode: AddressMode) -> Result<Self, HistoryError> {
        if base.cannot_be_a_base() {
            return Err(HistoryError::Address {
                path: base.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            });
        }
        Ok(Self {
            base,
            mode,
            entries: MemoryHistory::new(),
        })
    }

    /// Path-mode history.
    pub fn browser(base: Url) -> Result<Self, HistoryError> {
        Self::new(base, AddressMode::Browser)
    }

    /// Fragment-mode history.
    pub fn hash(base: Url) -> Result<Self, HistoryError> {
        Self::new(base, AddressMode::Hash)
    }

    /// Create a history whose first entry is read from the address the
    /// application was loaded at.
    pub fn from_location(base: Url, mode: AddressMode, location: &Url) -> Result<Self, HistoryError> {
        let history = Self::new(base, mode)?;
        let path = history.path_of(location).ok_or_else(|| HistoryError::Address {
            path: location.to_string(),
            reason: "location is outside the base address".to_string(),
        })?;
        Ok(Self {
            entries: MemoryHistory::with_initial(path),
            ..history
        })
    }

    pub fn mode(&self) -> AddressMode {
        self.mode
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn base_path(&self) -> &str {
        self.base.path().trim_end_matches('/')
    }

    /// The full address for an application path (query included).
    pub fn href(&self, path: &str) -> Result<Url, HistoryError> {
        if !path.starts_with('/') {
            return Err(HistoryError::Address {
                path: path.to_string(),
                reason: "application paths are absolute".to_string(),
            });
        }

        let mut url = self.base.clone();
        match self.mode {
            AddressMode::Browser => {
                let (path_part, query) = match path.split_once('?') {
                    Some((p, q)) => (p, Some(q)),
                    None => (path, None),
                };
                url.set_path(&format!("{}{}", self.base_path(), path_part));
                url.set_query(query);
                url.set_fragment(None);
            }
            AddressMode::Hash => {
                url.set_fragment(Some(path));
            }
        }
        Ok(url)
    }

    /// The application path encoded in `location`, if it lies under the base.
    pub fn path_of(&self, location: &Url) -> Option<String> {
        if location.origin() != self.base.origin() {
            return None;
        }
        match self.mode {
            AddressMode::Browser => {
                let rest = location.path().strip_prefix(self.base_path())?;
                let mut path = if rest.is_empty() {
                    "/".to_string()
                } else if rest.starts_with('/') {
                    rest.to_string()
                } else {
                    return None;
                };
                if let Some(query) = location.query() {
                    path.push('?');
                    path.push_str(query);
                }
                Some(path)
            }
            AddressMode::Hash => match location.fragment() {
                Some(fragment) if fragment.starts_with('/') => Some(fragment.to_string()),
                _ => Some("/".to_string()),
            },
        }
    }

    /// What the address bar currently shows.
    pub fn location(&self) -> Url {
        self.entries
            .current()
            .and_then(|entry| self.href(&entry.path).ok())
            .unwrap_or_else(|| self.base.clone())
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn back(&self) -> Result<(), HistoryError> {
        self.entries.back().await
    }

    pub async fn forward(&self) -> Result<(), HistoryError> {
        self.entries.forward().await
    }
}

#[async_trait]
impl HistoryAdapter for UrlHistory {
    async fn push(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let url = self.href(&entry.path)?;
        tracing::debug!(location = %url, "Address pushed");
        self.entries.push(entry).await
    }

    async fn replace(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let url = self.href(&entry.path)?;
        tracing::debug!(location = %url, "Address replaced");
        self.entries.replace(entry).await
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.entries.current()
    }

    fn on_pop_event(&self, listener: PopListener) {
        self.entries.on_pop_event(listener);
    }

    async fn go(&self, delta: isize, notify: bool) -> Result<(), HistoryError> {
        self.entries.go(delta, notify).await
    }
}
