//! Memoization of resolved entries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::entry::ResolvedEntry;

/// Resolved entries by ordinal.
///
/// Readers only take the map's read lock, so they never wait on a
/// resolution in progress. Resolutions are serialized by a separate lock and
/// re-check the map after acquiring it, so each ordinal is decoded at most
/// once. Entries are never evicted.
#[derive(Debug, Default)]
pub struct EntryCache {
    entries: RwLock<HashMap<usize, Arc<ResolvedEntry>>>,
    resolving: Mutex<()>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the ordinal has been resolved.
    #[inline]
    pub fn contains(&self, ordinal: usize) -> bool {
        self.entries.read().contains_key(&ordinal)
    }

    /// The cached entry, if resolved.
    #[inline]
    pub fn get(&self, ordinal: usize) -> Option<Arc<ResolvedEntry>> {
        self.entries.read().get(&ordinal).cloned()
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Return the cached entry or run `resolve` and cache its result.
    ///
    /// A failing `resolve` caches nothing; the next call retries.
    pub fn get_or_try_insert_with<E, F>(
        &self,
        ordinal: usize,
        resolve: F,
    ) -> Result<Arc<ResolvedEntry>, E>
    where
        F: FnOnce() -> Result<ResolvedEntry, E>,
    {
        if let Some(entry) = self.get(ordinal) {
            return Ok(entry);
        }

        let _guard = self.resolving.lock();
        if let Some(entry) = self.get(ordinal) {
            return Ok(entry);
        }

        let entry = Arc::new(resolve()?);
        self.entries.write().insert(ordinal, Arc::clone(&entry));
        Ok(entry)
    }
}
