// SPDX-License-Identifier: BUSL-1.1
//! # In-Memory Registry
//!
//! `DashMap`-backed registry with one map per partition. The per-document
//! update exclusion comes from `DashMap::get_mut`: the entry's shard write
//! lock is held for the whole read-validate-update cycle, so concurrent
//! updates of one document serialize instead of racing.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use ccm_core::DocumentId;

use crate::document::{DocumentKind, DocumentRecord};
use crate::error::RegistryError;
use crate::registry::DocumentRegistry;

/// One partition: records plus their insertion order.
///
/// `DashMap` iteration order is arbitrary, so the order log is what makes
/// `list()` stable across calls.
#[derive(Debug, Default)]
struct Partition {
    records: DashMap<DocumentId, DocumentRecord>,
    order: Mutex<Vec<DocumentId>>,
}

/// An in-memory document registry.
///
/// Cheaply cloneable — all clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    policies: Arc<Partition>,
    guidelines: Arc<Partition>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, kind: DocumentKind) -> &Partition {
        match kind {
            DocumentKind::Policy => &self.policies,
            DocumentKind::Guideline => &self.guidelines,
        }
    }

    /// Find the partition currently holding `id`, checking policies first.
    fn partition_of(&self, id: &DocumentId) -> Option<&Partition> {
        DocumentKind::all()
            .into_iter()
            .map(|kind| self.partition(kind))
            .find(|partition| partition.records.contains_key(id))
    }
}

impl DocumentRegistry for MemoryRegistry {
    fn insert(&self, record: DocumentRecord) -> Result<(), RegistryError> {
        let id = record.id;
        // Cross-partition collision check; ids are random UUIDs so this
        // only trips on caller misuse.
        let other = self.partition(match record.kind {
            DocumentKind::Policy => DocumentKind::Guideline,
            DocumentKind::Guideline => DocumentKind::Policy,
        });
        if other.records.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }

        let partition = self.partition(record.kind);
        match partition.records.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(RegistryError::AlreadyExists(id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record);
                partition.order.lock().push(id);
                Ok(())
            }
        }
    }

    fn get(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        self.partition_of(id)
            .and_then(|partition| partition.records.get(id).map(|r| r.value().clone()))
            .ok_or(RegistryError::NotFound(*id))
    }

    fn update_with(
        &self,
        id: &DocumentId,
        mutate: &mut dyn FnMut(&mut DocumentRecord),
    ) -> Result<DocumentRecord, RegistryError> {
        let partition = self.partition_of(id).ok_or(RegistryError::NotFound(*id))?;
        // Entry lock held across the whole mutation — the TOCTOU-free
        // read-validate-update cycle.
        let mut entry = partition
            .records
            .get_mut(id)
            .ok_or(RegistryError::NotFound(*id))?;
        mutate(entry.value_mut());
        Ok(entry.value().clone())
    }

    fn delete(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        let partition = self.partition_of(id).ok_or(RegistryError::NotFound(*id))?;
        let (_, record) = partition
            .records
            .remove(id)
            .ok_or(RegistryError::NotFound(*id))?;
        partition.order.lock().retain(|held| held != id);
        Ok(record)
    }

    fn list(&self, kind: DocumentKind) -> Result<Vec<DocumentRecord>, RegistryError> {
        let partition = self.partition(kind);
        let order = partition.order.lock();
        Ok(order
            .iter()
            .filter_map(|id| partition.records.get(id).map(|r| r.value().clone()))
            .collect())
    }
}
