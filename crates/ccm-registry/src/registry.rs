// SPDX-License-Identifier: BUSL-1.1
//! The [`DocumentRegistry`] contract.

use ccm_core::DocumentId;

use crate::document::{DocumentKind, DocumentRecord};
use crate::error::RegistryError;

/// Durable collection of document records, partitioned by kind.
///
/// Implementations must be safe to share across request handlers
/// (`Send + Sync`). Identifier lookup spans both partitions — ids are
/// globally unique by construction.
pub trait DocumentRegistry: Send + Sync {
    /// Persist a freshly created record.
    ///
    /// Fails with [`RegistryError::AlreadyExists`] on identifier collision.
    fn insert(&self, record: DocumentRecord) -> Result<(), RegistryError>;

    /// Load a record by identifier.
    fn get(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError>;

    /// Atomically apply a mutation to one record.
    ///
    /// The closure runs inside the per-document exclusion scope: the
    /// record it sees is the current persisted state, and no other update
    /// of the same document can interleave with the load-modify-store
    /// cycle. The updated record is persisted before this returns, and
    /// the persisted copy is returned.
    ///
    /// Updates to *different* documents proceed in parallel.
    fn update_with(
        &self,
        id: &DocumentId,
        mutate: &mut dyn FnMut(&mut DocumentRecord),
    ) -> Result<DocumentRecord, RegistryError>;

    /// Hard-remove a record, returning it.
    ///
    /// Blobs referenced by the record are not touched — whether they
    /// outlive the record is the retention policy's decision, made a
    /// layer above.
    fn delete(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError>;

    /// All records in one partition.
    ///
    /// Order is whatever the backing collection yields; callers must not
    /// read meaning into it (in particular it does not track
    /// `last_updated`).
    fn list(&self, kind: DocumentKind) -> Result<Vec<DocumentRecord>, RegistryError>;

    /// All records across both partitions. Used to warm the service cache.
    fn list_all(&self) -> Result<Vec<DocumentRecord>, RegistryError> {
        let mut all = Vec::new();
        for kind in DocumentKind::all() {
            all.extend(self.list(kind)?);
        }
        Ok(all)
    }
}

impl<T: DocumentRegistry + ?Sized> DocumentRegistry for std::sync::Arc<T> {
    fn insert(&self, record: DocumentRecord) -> Result<(), RegistryError> {
        (**self).insert(record)
    }

    fn get(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        (**self).get(id)
    }

    fn update_with(
        &self,
        id: &DocumentId,
        mutate: &mut dyn FnMut(&mut DocumentRecord),
    ) -> Result<DocumentRecord, RegistryError> {
        (**self).update_with(id, mutate)
    }

    fn delete(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        (**self).delete(id)
    }

    fn list(&self, kind: DocumentKind) -> Result<Vec<DocumentRecord>, RegistryError> {
        (**self).list(kind)
    }

    fn list_all(&self) -> Result<Vec<DocumentRecord>, RegistryError> {
        (**self).list_all()
    }
}
