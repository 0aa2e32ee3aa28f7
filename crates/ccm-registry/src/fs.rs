// SPDX-License-Identifier: BUSL-1.1
//! # Filesystem Registry
//!
//! Durable registry storing one JSON document per record:
//!
//! ```text
//! {root}/policy/{id}.json
//! {root}/guideline/{id}.json
//! {root}/tmp/{uuid}.json      in-flight writes
//! ```
//!
//! Record writes go through a temp file and an atomic rename, so a crash
//! mid-write can never leave a half-serialized record under its final
//! name. The per-document update exclusion is a `parking_lot` lock table
//! keyed by document id.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use ccm_core::DocumentId;

use crate::document::{DocumentKind, DocumentRecord};
use crate::error::RegistryError;
use crate::registry::DocumentRegistry;

/// A document registry persisted as JSON files under a root directory.
///
/// Cheap to clone — clones share the root and the lock table.
#[derive(Debug, Clone)]
pub struct FsRegistry {
    root: PathBuf,
    locks: Arc<DashMap<DocumentId, Arc<Mutex<()>>>>,
}

impl FsRegistry {
    /// Create a registry rooted at the given directory.
    ///
    /// The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// The registry's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, kind: DocumentKind, id: &DocumentId) -> PathBuf {
        self.root.join(kind.as_str()).join(format!("{id}.json"))
    }

    /// Locate the record file for `id`, checking both partitions.
    fn find_path(&self, id: &DocumentId) -> Option<(DocumentKind, PathBuf)> {
        DocumentKind::all().into_iter().find_map(|kind| {
            let path = self.record_path(kind, id);
            path.exists().then_some((kind, path))
        })
    }

    fn document_lock(&self, id: &DocumentId) -> Arc<Mutex<()>> {
        self.locks
            .entry(*id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn read_record(&self, path: &Path) -> Result<DocumentRecord, RegistryError> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::CorruptRecord {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize a record to its final path via temp file + atomic rename.
    fn write_record(&self, record: &DocumentRecord) -> Result<(), RegistryError> {
        let tmp_dir = self.root.join("tmp");
        fs::create_dir_all(&tmp_dir)?;
        fs::create_dir_all(self.root.join(record.kind.as_str()))?;

        let tmp_path = tmp_dir.join(format!("{}.json", Uuid::new_v4()));
        let bytes = serde_json::to_vec_pretty(record)?;
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(&bytes)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, self.record_path(record.kind, &record.id))?;
        Ok(())
    }
}

impl DocumentRegistry for FsRegistry {
    fn insert(&self, record: DocumentRecord) -> Result<(), RegistryError> {
        let lock = self.document_lock(&record.id);
        let _guard = lock.lock();

        if self.find_path(&record.id).is_some() {
            return Err(RegistryError::AlreadyExists(record.id));
        }
        self.write_record(&record)?;
        tracing::debug!(id = %record.id, kind = %record.kind, "record persisted");
        Ok(())
    }

    fn get(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        let (_, path) = self.find_path(id).ok_or(RegistryError::NotFound(*id))?;
        self.read_record(&path)
    }

    fn update_with(
        &self,
        id: &DocumentId,
        mutate: &mut dyn FnMut(&mut DocumentRecord),
    ) -> Result<DocumentRecord, RegistryError> {
        let lock = self.document_lock(id);
        let _guard = lock.lock();

        let (_, path) = self.find_path(id).ok_or(RegistryError::NotFound(*id))?;
        let mut record = self.read_record(&path)?;
        mutate(&mut record);
        self.write_record(&record)?;
        Ok(record)
    }

    fn delete(&self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        let lock = self.document_lock(id);
        let guard = lock.lock();

        let (_, path) = self.find_path(id).ok_or(RegistryError::NotFound(*id))?;
        let record = self.read_record(&path)?;
        fs::remove_file(&path)?;

        drop(guard);
        self.locks.remove(id);
        Ok(record)
    }

    fn list(&self, kind: DocumentKind) -> Result<Vec<DocumentRecord>, RegistryError> {
        let dir = self.root.join(kind.as_str());
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        // Directory order is filesystem-dependent; sort by filename so
        // repeated calls agree with each other.
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read_record(&path) {
                Ok(record) => records.push(record),
                Err(RegistryError::CorruptRecord { path, reason }) => {
                    // One bad file must not hide the rest of the partition.
                    tracing::warn!(%path, %reason, "skipping corrupt record");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision;
    use ccm_core::{sha256_digest, BlobId};
    use chrono::Utc;

    fn registry() -> (tempfile::TempDir, FsRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = FsRegistry::new(dir.path());
        (dir, registry)
    }

    fn record(kind: DocumentKind, title: &str) -> DocumentRecord {
        let blob = BlobId::from_digest(sha256_digest(title.as_bytes()));
        let now = Utc::now();
        DocumentRecord {
            id: DocumentId::new(),
            kind,
            title: title.to_string(),
            description: "desc".to_string(),
            file: revision::initial(blob, "doc.pdf", now),
            last_updated: now,
        }
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let (_dir, registry) = registry();
        let rec = record(DocumentKind::Policy, "Data Retention");
        registry.insert(rec.clone()).unwrap();
        assert_eq!(registry.get(&rec.id).unwrap(), rec);
    }

    #[test]
    fn records_survive_a_new_registry_handle() {
        let (dir, registry) = registry();
        let rec = record(DocumentKind::Guideline, "Durable");
        registry.insert(rec.clone()).unwrap();

        // A fresh handle over the same root sees the same records.
        let reopened = FsRegistry::new(dir.path());
        assert_eq!(reopened.get(&rec.id).unwrap(), rec);
        assert_eq!(reopened.list(DocumentKind::Guideline).unwrap().len(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let (_dir, registry) = registry();
        let rec = record(DocumentKind::Policy, "Dup");
        registry.insert(rec.clone()).unwrap();
        assert!(matches!(
            registry.insert(rec),
            Err(RegistryError::AlreadyExists(_))
        ));
    }

    #[test]
    fn update_with_persists_to_disk() {
        let (dir, registry) = registry();
        let rec = record(DocumentKind::Policy, "Before");
        registry.insert(rec.clone()).unwrap();

        registry
            .update_with(&rec.id, &mut |r| r.title = "After".to_string())
            .unwrap();

        let reopened = FsRegistry::new(dir.path());
        assert_eq!(reopened.get(&rec.id).unwrap().title, "After");
    }

    #[test]
    fn delete_removes_the_file() {
        let (_dir, registry) = registry();
        let rec = record(DocumentKind::Guideline, "Gone");
        registry.insert(rec.clone()).unwrap();

        let removed = registry.delete(&rec.id).unwrap();
        assert_eq!(removed.id, rec.id);
        assert!(matches!(
            registry.get(&rec.id),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn list_skips_corrupt_records() {
        let (dir, registry) = registry();
        registry.insert(record(DocumentKind::Policy, "Good")).unwrap();
        fs::write(
            dir.path().join("policy").join("not-a-record.json"),
            b"{ definitely not a record",
        )
        .unwrap();

        let listed = registry.list(DocumentKind::Policy).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Good");
    }

    #[test]
    fn list_unknown_partition_dir_is_empty() {
        let (_dir, registry) = registry();
        assert!(registry.list(DocumentKind::Policy).unwrap().is_empty());
    }

    #[test]
    fn concurrent_updates_serialize_per_document() {
        use std::sync::Arc;

        let (_dir, registry) = registry();
        let registry = Arc::new(registry);
        let rec = record(DocumentKind::Policy, "Contended");
        registry.insert(rec.clone()).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let id = rec.id;
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        registry
                            .update_with(&id, &mut |r| r.file.version += 1)
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(registry.get(&rec.id).unwrap().file.version, 100);
    }
}
