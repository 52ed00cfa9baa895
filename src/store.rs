//! In-memory model of the fetched entry batch.
//!
//! The store is populated exactly once per session from the feed service.
//! Order is the publish order the service returned and never changes; the
//! only mutation after load is flipping an entry's `read` flag.

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by [`EntryStore`].
///
/// Every variant is a caller bug: the navigation layer keeps its cursor
/// inside the loaded range, so none of these should be reachable from
/// user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entry index {index} out of range (store holds {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

// ============================================================================
// Entry
// ============================================================================

/// Identifier assigned by the feed service, stable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub feed_title: String,
    /// Raw HTML, rendered only when the entry is opened.
    pub content: String,
    pub url: Option<String>,
    /// Publish time as unix seconds.
    pub published: Option<i64>,
    read: bool,
}

impl Entry {
    /// Create an unread entry.
    pub fn new(
        id: EntryId,
        title: impl Into<String>,
        feed_title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            feed_title: feed_title.into(),
            content: content.into(),
            url: None,
            published: None,
            read: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_published(mut self, published: i64) -> Self {
        self.published = Some(published);
        self
    }

    /// The read flag can only be set through [`EntryStore::mark_read`].
    pub fn is_read(&self) -> bool {
        self.read
    }
}

// ============================================================================
// EntryStore
// ============================================================================

/// Ordered, fixed-size collection of the session's entries.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    /// Build the store from the service's batch.
    ///
    /// This is the only way to populate a store, so a session loads it
    /// exactly once. Duplicate ids keep their first occurrence.
    pub fn load(entries: Vec<Entry>) -> Self {
        let mut seen = HashSet::with_capacity(entries.len());
        let total = entries.len();
        let entries: Vec<Entry> = entries
            .into_iter()
            .filter(|e| seen.insert(e.id))
            .collect();

        if entries.len() != total {
            tracing::warn!(
                received = total,
                kept = entries.len(),
                "Dropped entries with duplicate ids"
            );
        }
        tracing::debug!(count = entries.len(), "Entry store loaded");

        Self { entries }
    }

    /// Entry at `index` in service order.
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based position in the batch
    ///
    /// # Returns
    ///
    /// The entry, or `StoreError::IndexOutOfRange` when `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use termflux::store::{Entry, EntryId, EntryStore, StoreError};
    ///
    /// let store = EntryStore::load(vec![Entry::new(EntryId(7), "Title", "Feed", "")]);
    /// assert_eq!(store.get(0).unwrap().id, EntryId(7));
    /// assert_eq!(
    ///     store.get(1),
    ///     Err(StoreError::IndexOutOfRange { index: 1, len: 1 })
    /// );
    /// ```
    pub fn get(&self, index: usize) -> Result<&Entry, StoreError> {
        self.entries.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Number of entries, read or not. Fixed after [`EntryStore::load`].
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the service had no unread entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set the read flag at `index`. Marking an already-read entry succeeds
    /// without changing anything.
    pub fn mark_read(&mut self, index: usize) -> Result<(), StoreError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        entry.read = true;
        Ok(())
    }

    /// Read-only snapshot for rendering.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries whose read flag is still clear.
    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.read).count()
    }
}

// ============================================================================
// Tests
// ============================================================================
