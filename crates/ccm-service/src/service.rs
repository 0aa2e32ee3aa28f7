// SPDX-License-Identifier: BUSL-1.1
//! # Document Service
//!
//! [`DocumentService`] is the single entry point callers use. It owns the
//! orchestration order for every mutation:
//!
//! 1. authorization gate for updates and deletes (fail-closed, consulted
//!    fresh; creation needs authentication only);
//! 2. input validation;
//! 3. blob write — outside any registry lock, content addressing makes it
//!    safe to do early and idempotent to redo;
//! 4. registry persist through the per-document exclusion scope;
//! 5. cache refresh with the record the registry actually persisted.
//!
//! Reads never touch the gate and never block behind a writer of a
//! different document.

use std::io::Read;

use chrono::Utc;

use ccm_blob::{BlobMeta, BlobStore};
use ccm_core::{sanitize_filename, BlobId, DocumentId, FileUpload, Identity, ValidationError};
use ccm_registry::{revision, DocumentKind, DocumentRecord, DocumentRegistry};

use crate::cache::RecordCache;
use crate::config::{RetentionPolicy, ServiceConfig};
use crate::error::ServiceError;
use crate::gate::{authorize, Decision, RoleGate};

/// Request payload for creating a document.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    /// Partition the new document belongs to.
    pub kind: DocumentKind,
    /// Title. Must not be empty or whitespace-only.
    pub title: String,
    /// Free-text description. May be empty.
    pub description: String,
    /// The initial file. Required — a document without a file does not
    /// exist in this store.
    pub file: FileUpload,
}

/// Request payload for updating a document. Every field is optional;
/// omitted fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocument {
    /// New title, if changing. An empty replacement is rejected.
    pub title: Option<String>,
    /// New description, if changing. An empty replacement is allowed.
    pub description: Option<String>,
    /// Replacement file. An *empty* upload (blank filename or zero
    /// bytes) is treated exactly like `None`: the current file and its
    /// history are untouched.
    pub file: Option<FileUpload>,
}

/// A fetched file: stored metadata plus the verified bytes.
#[derive(Debug, Clone)]
pub struct FileContent {
    /// Metadata recorded when the blob was stored.
    pub meta: BlobMeta,
    /// The blob bytes, integrity-checked against the identifier.
    pub bytes: Vec<u8>,
}

/// The versioned compliance-document store.
///
/// Generic over its three collaborators so tests and deployments pick
/// backends independently: any [`DocumentRegistry`], any [`BlobStore`],
/// any [`RoleGate`].
pub struct DocumentService<R, B, G> {
    registry: R,
    blobs: B,
    gate: G,
    config: ServiceConfig,
    cache: RecordCache,
}

impl<R, B, G> DocumentService<R, B, G>
where
    R: DocumentRegistry,
    B: BlobStore,
    G: RoleGate,
{
    /// Build a service and warm the record cache from the registry.
    ///
    /// # Errors
    ///
    /// Fails with [`ServiceError::Storage`] if the registry cannot be
    /// listed — a service that cannot see its own records should not
    /// start.
    pub fn new(
        registry: R,
        blobs: B,
        gate: G,
        config: ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let cache = RecordCache::new();
        cache.warm(registry.list_all()?);
        tracing::info!(cached = cache.len(), "document service started");
        Ok(Self {
            registry,
            blobs,
            gate,
            config,
            cache,
        })
    }

    fn require_mutation_role(&self, identity: &Identity) -> Result<(), ServiceError> {
        match authorize(&self.gate, identity, &self.config.mutation_role) {
            Decision::Allowed => Ok(()),
            Decision::Denied => Err(ServiceError::Forbidden(format!(
                "{} requires role {:?}",
                identity.subject(),
                self.config.mutation_role.as_str()
            ))),
        }
    }

    /// Create a document with its initial file.
    ///
    /// The first revision is version 0 with an empty history. Creation
    /// needs an authenticated identity but no specific role — the role
    /// gate guards changes to existing documents, not new ones.
    pub fn create(
        &self,
        identity: &Identity,
        request: CreateDocument,
    ) -> Result<DocumentRecord, ServiceError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if request.file.is_empty() {
            return Err(ValidationError::MissingUpload.into());
        }

        let filename = sanitize_filename(&request.file.filename);
        let blob = self.blobs.put(&request.file)?;

        let now = Utc::now();
        let record = DocumentRecord {
            id: DocumentId::new(),
            kind: request.kind,
            title: title.to_string(),
            description: request.description,
            file: revision::initial(blob, filename, now),
            last_updated: now,
        };
        self.registry.insert(record.clone())?;
        self.cache.refresh(record.clone());

        tracing::info!(
            document = %record.id,
            kind = %record.kind,
            subject = %identity.subject(),
            "document created"
        );
        Ok(record)
    }

    /// Load a document, read-through cached.
    pub fn get(&self, id: &DocumentId) -> Result<DocumentRecord, ServiceError> {
        if let Some(record) = self.cache.get(id) {
            return Ok(record);
        }
        let record = self.registry.get(id)?;
        self.cache.refresh(record.clone());
        Ok(record)
    }

    /// All documents in one partition.
    ///
    /// Listing goes straight to the registry; the cache only accelerates
    /// point reads.
    pub fn list(&self, kind: DocumentKind) -> Result<Vec<DocumentRecord>, ServiceError> {
        Ok(self.registry.list(kind)?)
    }

    /// All documents across both partitions.
    pub fn list_all(&self) -> Result<Vec<DocumentRecord>, ServiceError> {
        Ok(self.registry.list_all()?)
    }

    /// Apply a partial update to a document.
    ///
    /// A replacement file advances the version by exactly 1 and appends
    /// the superseded blob to the history; metadata-only updates leave
    /// the file state untouched. Concurrent updates of the same document
    /// are serialized by the registry — none are lost.
    pub fn update(
        &self,
        identity: &Identity,
        id: &DocumentId,
        request: UpdateDocument,
    ) -> Result<DocumentRecord, ServiceError> {
        self.require_mutation_role(identity)?;

        if let Some(title) = &request.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle.into());
            }
        }

        // Existence check before the blob write, so a typo'd identifier
        // does not leave bytes behind. A delete racing past this point is
        // still caught by update_with.
        self.get(id)?;

        let file_change = match &request.file {
            Some(upload) if !upload.is_empty() => {
                let filename = sanitize_filename(&upload.filename);
                let blob = self.blobs.put(upload)?;
                Some((blob, filename))
            }
            _ => None,
        };

        let now = Utc::now();
        let record = self.registry.update_with(id, &mut |record| {
            if let Some(title) = &request.title {
                record.title = title.trim().to_string();
            }
            if let Some(description) = &request.description {
                record.description = description.clone();
            }
            if let Some((blob, filename)) = &file_change {
                record.file = revision::revise(&record.file, blob.clone(), filename.clone(), now);
            }
            record.last_updated = now;
        })?;
        self.cache.refresh(record.clone());

        tracing::info!(
            document = %record.id,
            version = record.file.version,
            file_replaced = file_change.is_some(),
            subject = %identity.subject(),
            "document updated"
        );
        Ok(record)
    }

    /// Delete a document, returning the removed record.
    ///
    /// Blob handling follows the configured [`RetentionPolicy`]: retained
    /// blobs stay resolvable through the store; reclaimed blobs are
    /// deleted best-effort after the record is gone.
    pub fn delete(
        &self,
        identity: &Identity,
        id: &DocumentId,
    ) -> Result<DocumentRecord, ServiceError> {
        self.require_mutation_role(identity)?;

        let record = self.registry.delete(id)?;
        self.cache.evict(id);

        if self.config.retention == RetentionPolicy::ReclaimOnDelete {
            // Reclamation failures never fail the delete: the record is
            // already gone, and a leftover blob is merely unreferenced.
            // Content addressing also means a blob shared with another
            // document's history vanishes for both; reclaim is meant for
            // stores where that sharing cannot occur.
            for blob in record.file.all_blobs() {
                if let Err(err) = self.blobs.delete(blob) {
                    tracing::warn!(
                        document = %id,
                        blob = %blob,
                        error = %err,
                        "blob reclamation failed"
                    );
                }
            }
        }

        tracing::info!(
            document = %id,
            version = record.file.version,
            subject = %identity.subject(),
            "document deleted"
        );
        Ok(record)
    }

    /// Fetch the current file of a document, integrity-verified.
    pub fn fetch_file(&self, id: &DocumentId) -> Result<FileContent, ServiceError> {
        let record = self.get(id)?;
        let meta = self.blobs.meta(&record.file.current_blob)?;
        let bytes = self.blobs.get(&record.file.current_blob)?;
        Ok(FileContent { meta, bytes })
    }

    /// Open a streaming reader over the current file of a document.
    ///
    /// Skips the whole-content integrity check; see
    /// [`BlobStore::open()`].
    pub fn open_file(
        &self,
        id: &DocumentId,
    ) -> Result<(BlobMeta, Box<dyn Read + Send>), ServiceError> {
        let record = self.get(id)?;
        let meta = self.blobs.meta(&record.file.current_blob)?;
        let reader = self.blobs.open(&record.file.current_blob)?;
        Ok((meta, reader))
    }

    /// Fetch raw blob bytes by identifier, integrity-verified.
    ///
    /// Any identifier reachable from a record's current blob or history
    /// resolves here; under the default retention policy, so do the blobs
    /// of deleted documents.
    pub fn fetch_blob(&self, id: &BlobId) -> Result<Vec<u8>, ServiceError> {
        Ok(self.blobs.get(id)?)
    }

    /// Fetch a historical revision by version number.
    ///
    /// Version `record.file.version` is the current file; anything lower
    /// resolves through the history chain.
    pub fn fetch_revision(
        &self,
        id: &DocumentId,
        version: u32,
    ) -> Result<FileContent, ServiceError> {
        let record = self.get(id)?;
        let blob = if version == record.file.version {
            &record.file.current_blob
        } else {
            record.file.history.get(version as usize).ok_or_else(|| {
                ServiceError::NotFound(format!("document {id} has no version {version}"))
            })?
        };
        let meta = self.blobs.meta(blob)?;
        let bytes = self.blobs.get(blob)?;
        Ok(FileContent { meta, bytes })
    }

    /// The blob store backing this service. Read-only access for
    /// inventory tooling.
    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StaticRoleGate;
    use ccm_blob::MemoryBlobStore;
    use ccm_core::Role;
    use ccm_registry::MemoryRegistry;

    type TestService = DocumentService<MemoryRegistry, MemoryBlobStore, StaticRoleGate>;

    fn officer() -> Identity {
        Identity::new("officer@example.com").unwrap()
    }

    fn intern() -> Identity {
        Identity::new("intern@example.com").unwrap()
    }

    fn service() -> TestService {
        service_with(ServiceConfig::default())
    }

    fn service_with(config: ServiceConfig) -> TestService {
        let gate = StaticRoleGate::new()
            .grant("officer@example.com", &Role::data_protection_officer());
        DocumentService::new(MemoryRegistry::new(), MemoryBlobStore::new(), gate, config)
            .unwrap()
    }

    fn pdf(name: &str, content: &[u8]) -> FileUpload {
        FileUpload::new(name, "application/pdf", content.to_vec())
    }

    fn create_policy(svc: &TestService, title: &str, content: &[u8]) -> DocumentRecord {
        svc.create(
            &officer(),
            CreateDocument {
                kind: DocumentKind::Policy,
                title: title.to_string(),
                description: String::new(),
                file: pdf("policy.pdf", content),
            },
        )
        .unwrap()
    }

    #[test]
    fn create_starts_at_version_zero() {
        let svc = service();
        let record = create_policy(&svc, "Data Retention", b"%PDF v1");
        assert_eq!(record.file.version, 0);
        assert!(record.file.history.is_empty());
        assert_eq!(record.file.filename, "policy.pdf");
        assert_eq!(svc.get(&record.id).unwrap(), record);
    }

    #[test]
    fn create_requires_a_title() {
        let svc = service();
        let err = svc
            .create(
                &officer(),
                CreateDocument {
                    kind: DocumentKind::Policy,
                    title: "   ".to_string(),
                    description: String::new(),
                    file: pdf("p.pdf", b"data"),
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmptyTitle)
        ));
    }

    #[test]
    fn create_requires_a_file() {
        let svc = service();
        let err = svc
            .create(
                &officer(),
                CreateDocument {
                    kind: DocumentKind::Policy,
                    title: "Retention".to_string(),
                    description: String::new(),
                    file: pdf("", b""),
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MissingUpload)
        ));
    }

    #[test]
    fn create_sanitizes_the_filename() {
        let svc = service();
        let record = svc
            .create(
                &officer(),
                CreateDocument {
                    kind: DocumentKind::Guideline,
                    title: "Onboarding".to_string(),
                    description: String::new(),
                    file: pdf("../../etc/pass wd.pdf", b"data"),
                },
            )
            .unwrap();
        assert_eq!(record.file.filename, "pass_wd.pdf");
    }

    #[test]
    fn update_with_file_advances_exactly_one_version() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"v0 bytes");

        let updated = svc
            .update(
                &officer(),
                &created.id,
                UpdateDocument {
                    file: Some(pdf("retention-v2.pdf", b"v1 bytes")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.file.version, 1);
        assert_eq!(updated.file.history, vec![created.file.current_blob]);
        assert_eq!(updated.file.filename, "retention-v2.pdf");
        assert!(updated.file.history_is_consistent());
    }

    #[test]
    fn metadata_only_update_leaves_file_state_alone() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"bytes");

        let updated = svc
            .update(
                &officer(),
                &created.id,
                UpdateDocument {
                    title: Some("Data Retention (2026)".to_string()),
                    description: Some("Annual refresh".to_string()),
                    file: None,
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Data Retention (2026)");
        assert_eq!(updated.description, "Annual refresh");
        assert_eq!(updated.file, created.file);
        assert!(updated.last_updated >= created.last_updated);
    }

    #[test]
    fn empty_upload_means_keep_current_file() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"bytes");

        let updated = svc
            .update(
                &officer(),
                &created.id,
                UpdateDocument {
                    title: Some("Renamed".to_string()),
                    file: Some(pdf("", b"")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.file, created.file);
        assert_eq!(updated.title, "Renamed");
    }

    #[test]
    fn update_rejects_empty_replacement_title() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"bytes");
        let err = svc
            .update(
                &officer(),
                &created.id,
                UpdateDocument {
                    title: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmptyTitle)
        ));
    }

    #[test]
    fn update_of_missing_document_is_not_found() {
        let svc = service();
        let err = svc
            .update(
                &officer(),
                &DocumentId::new(),
                UpdateDocument {
                    title: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn update_and_delete_without_the_role_are_forbidden() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"bytes");

        let err = svc
            .update(
                &intern(),
                &created.id,
                UpdateDocument {
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = svc.delete(&intern(), &created.id).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        // The record is untouched.
        assert_eq!(svc.get(&created.id).unwrap(), created);
    }

    #[test]
    fn create_needs_only_authentication() {
        let svc = service();
        let record = svc
            .create(
                &intern(),
                CreateDocument {
                    kind: DocumentKind::Policy,
                    title: "Draft Policy".to_string(),
                    description: String::new(),
                    file: pdf("draft.pdf", b"data"),
                },
            )
            .unwrap();
        assert_eq!(record.title, "Draft Policy");

        // But the same identity cannot touch it afterwards.
        let err = svc.delete(&intern(), &record.id).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn reads_need_no_role() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"bytes");
        assert_eq!(svc.get(&created.id).unwrap(), created);
        assert_eq!(svc.list(DocumentKind::Policy).unwrap().len(), 1);
        assert_eq!(svc.fetch_file(&created.id).unwrap().bytes, b"bytes");
    }

    #[test]
    fn fetch_file_returns_meta_and_verified_bytes() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"the current bytes");
        let file = svc.fetch_file(&created.id).unwrap();
        assert_eq!(file.bytes, b"the current bytes");
        assert_eq!(file.meta.filename, "policy.pdf");
        assert_eq!(file.meta.content_type, "application/pdf");
        assert_eq!(file.meta.length, 17);
    }

    #[test]
    fn open_file_streams_the_current_blob() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"streamed bytes");
        let (meta, mut reader) = svc.open_file(&created.id).unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"streamed bytes");
        assert_eq!(meta.length, 14);
    }

    #[test]
    fn fetch_revision_resolves_the_whole_chain() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"rev 0");
        for content in [b"rev 1".as_slice(), b"rev 2"] {
            svc.update(
                &officer(),
                &created.id,
                UpdateDocument {
                    file: Some(pdf("policy.pdf", content)),
                    ..Default::default()
                },
            )
            .unwrap();
        }

        assert_eq!(svc.fetch_revision(&created.id, 0).unwrap().bytes, b"rev 0");
        assert_eq!(svc.fetch_revision(&created.id, 1).unwrap().bytes, b"rev 1");
        assert_eq!(svc.fetch_revision(&created.id, 2).unwrap().bytes, b"rev 2");
        let err = svc.fetch_revision(&created.id, 3).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn delete_retains_blobs_by_default() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"evidence");
        let blob = created.file.current_blob.clone();

        let removed = svc.delete(&officer(), &created.id).unwrap();
        assert_eq!(removed.id, created.id);
        assert!(matches!(
            svc.get(&created.id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(svc.blobs().contains(&blob).unwrap());
        // The orphaned blob is still served by identifier.
        assert_eq!(svc.fetch_blob(&blob).unwrap(), b"evidence");
    }

    #[test]
    fn fetch_blob_resolves_history_entries() {
        let svc = service();
        let created = create_policy(&svc, "Retention", b"old revision");
        let updated = svc
            .update(
                &officer(),
                &created.id,
                UpdateDocument {
                    file: Some(pdf("policy.pdf", b"new revision")),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(svc.fetch_blob(&updated.file.history[0]).unwrap(), b"old revision");
        let absent = BlobId::from_digest(ccm_core::sha256_digest(b"never stored"));
        assert!(matches!(
            svc.fetch_blob(&absent).unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[test]
    fn delete_reclaims_blobs_when_configured() {
        let svc = service_with(ServiceConfig {
            retention: RetentionPolicy::ReclaimOnDelete,
            ..Default::default()
        });
        let created = create_policy(&svc, "Retention", b"v0");
        let updated = svc
            .update(
                &officer(),
                &created.id,
                UpdateDocument {
                    file: Some(pdf("policy.pdf", b"v1")),
                    ..Default::default()
                },
            )
            .unwrap();

        svc.delete(&officer(), &created.id).unwrap();
        for blob in updated.file.all_blobs() {
            assert!(!svc.blobs().contains(blob).unwrap());
        }
    }

    #[test]
    fn delete_of_missing_document_is_not_found() {
        let svc = service();
        let err = svc.delete(&officer(), &DocumentId::new()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn list_separates_partitions() {
        let svc = service();
        create_policy(&svc, "Policy A", b"a");
        svc.create(
            &officer(),
            CreateDocument {
                kind: DocumentKind::Guideline,
                title: "Guideline B".to_string(),
                description: String::new(),
                file: pdf("g.pdf", b"b"),
            },
        )
        .unwrap();

        assert_eq!(svc.list(DocumentKind::Policy).unwrap().len(), 1);
        assert_eq!(svc.list(DocumentKind::Guideline).unwrap().len(), 1);
        assert_eq!(svc.list_all().unwrap().len(), 2);
    }

    #[test]
    fn new_service_warms_from_existing_registry() {
        use std::sync::Arc;

        let registry = Arc::new(MemoryRegistry::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let gate = StaticRoleGate::new()
            .grant("officer@example.com", &Role::data_protection_officer());

        let id = {
            let svc = DocumentService::new(
                Arc::clone(&registry),
                Arc::clone(&blobs),
                gate.clone(),
                ServiceConfig::default(),
            )
            .unwrap();
            svc.create(
                &officer(),
                CreateDocument {
                    kind: DocumentKind::Policy,
                    title: "Persisted".to_string(),
                    description: String::new(),
                    file: pdf("policy.pdf", b"bytes"),
                },
            )
            .unwrap()
            .id
        };

        let svc =
            DocumentService::new(registry, blobs, gate, ServiceConfig::default()).unwrap();
        let record = svc.get(&id).unwrap();
        assert_eq!(record.title, "Persisted");
        assert_eq!(svc.fetch_file(&id).unwrap().bytes, b"bytes");
    }
}
