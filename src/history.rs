//! Bounded, persisted list of past generations, newest first.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::models::HistoryEntry;
use crate::storage::KeyValueStore;

pub const HISTORY_KEY: &str = "pixelbloom.history";
/// Only the most recent generations are kept; older ones are evicted.
pub const MAX_ENTRIES: usize = 20;

pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Loads persisted entries; an unparseable blob is discarded rather than
    /// failing startup.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let entries = match kv.get(HISTORY_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unparseable history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self {
            kv,
            entries: RwLock::new(entries),
        }
    }

    /// Prepends the entry and truncates to the retention bound.
    pub fn insert(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write();
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES);
        self.persist(&entries);
    }

    pub fn remove_by_id(&self, id: Uuid) {
        let mut entries = self.entries.write();
        entries.retain(|entry| entry.id != id);
        self.persist(&entries);
    }

    /// Idempotent: clearing an empty store is a no-op.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.clear();
        self.persist(&entries);
    }

    /// Snapshot, newest first.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        match serde_json::to_string(entries) {
            Ok(raw) => self.kv.set(HISTORY_KEY, &raw),
            Err(e) => warn!(error = %e, "failed to serialize history"),
        }
    }
}
