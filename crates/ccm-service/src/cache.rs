// SPDX-License-Identifier: BUSL-1.1
//! Read-through record cache.
//!
//! A whole-record cache in front of the registry: entries are only ever
//! replaced wholesale with whatever the registry last persisted, never
//! patched field-by-field, so a cached record is always some state the
//! registry actually held.

use dashmap::DashMap;

use ccm_core::DocumentId;
use ccm_registry::DocumentRecord;

/// Concurrent map of the registry's current records.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: DashMap<DocumentId, DocumentRecord>,
}

impl RecordCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the cached record, if present.
    pub fn get(&self, id: &DocumentId) -> Option<DocumentRecord> {
        self.records.get(id).map(|r| r.value().clone())
    }

    /// Replace (or insert) the cached record with a freshly persisted one.
    pub fn refresh(&self, record: DocumentRecord) {
        self.records.insert(record.id, record);
    }

    /// Drop the cached record. Idempotent.
    pub fn evict(&self, id: &DocumentId) {
        self.records.remove(id);
    }

    /// Load a batch of records, replacing any cached copies.
    pub fn warm(&self, records: impl IntoIterator<Item = DocumentRecord>) {
        for record in records {
            self.refresh(record);
        }
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
