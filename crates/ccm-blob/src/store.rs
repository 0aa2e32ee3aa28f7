// SPDX-License-Identifier: BUSL-1.1
//! The [`BlobStore`] contract and blob metadata.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ccm_core::{BlobId, FileUpload};

use crate::error::BlobError;

/// Metadata recorded alongside a blob at write time.
///
/// The filename and content type here describe the *original upload*; a
/// document's display filename lives in its file state and is sanitized
/// separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    /// Filename supplied with the upload.
    pub filename: String,
    /// Client-declared MIME type.
    pub content_type: String,
    /// Blob length in bytes.
    pub length: u64,
    /// When the blob was first stored.
    pub stored_at: DateTime<Utc>,
}

/// Content-addressed storage for raw file bytes.
///
/// Implementations must be safe to share across request handlers
/// (`Send + Sync`) and must treat blobs as immutable: a `put` of content
/// that already exists is a no-op returning the same identifier, never an
/// overwrite.
pub trait BlobStore: Send + Sync {
    /// Store an in-memory upload. Returns the content-derived identifier.
    ///
    /// Convenience over [`put_stream()`](BlobStore::put_stream) for
    /// payloads already buffered in memory.
    fn put(&self, upload: &FileUpload) -> Result<BlobId, BlobError> {
        let mut reader = upload.bytes.as_slice();
        self.put_stream(&mut reader, &upload.filename, &upload.content_type)
    }

    /// Store a blob from a streaming reader.
    ///
    /// Implementations consume the reader in fixed-size chunks, hashing
    /// incrementally, so memory use is bounded regardless of payload size.
    fn put_stream(
        &self,
        reader: &mut dyn Read,
        filename: &str,
        content_type: &str,
    ) -> Result<BlobId, BlobError>;

    /// Fetch a blob's bytes, verifying integrity against the identifier.
    fn get(&self, id: &BlobId) -> Result<Vec<u8>, BlobError>;

    /// Open a streaming reader over a blob.
    ///
    /// Streaming reads skip the whole-content integrity check that
    /// [`get()`](BlobStore::get) performs; callers that need verification
    /// on large payloads can hash while consuming the reader.
    fn open(&self, id: &BlobId) -> Result<Box<dyn Read + Send>, BlobError>;

    /// Fetch the metadata recorded when the blob was stored.
    fn meta(&self, id: &BlobId) -> Result<BlobMeta, BlobError>;

    /// Whether a blob with this identifier exists.
    fn contains(&self, id: &BlobId) -> Result<bool, BlobError>;

    /// Remove a blob and its metadata. Idempotent — deleting an absent
    /// blob succeeds.
    ///
    /// Only the reclaim retention policy calls this; nothing in the store
    /// deletes blobs on its own.
    fn delete(&self, id: &BlobId) -> Result<(), BlobError>;
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn put(&self, upload: &FileUpload) -> Result<BlobId, BlobError> {
        (**self).put(upload)
    }

    fn put_stream(
        &self,
        reader: &mut dyn Read,
        filename: &str,
        content_type: &str,
    ) -> Result<BlobId, BlobError> {
        (**self).put_stream(reader, filename, content_type)
    }

    fn get(&self, id: &BlobId) -> Result<Vec<u8>, BlobError> {
        (**self).get(id)
    }

    fn open(&self, id: &BlobId) -> Result<Box<dyn Read + Send>, BlobError> {
        (**self).open(id)
    }

    fn meta(&self, id: &BlobId) -> Result<BlobMeta, BlobError> {
        (**self).meta(id)
    }

    fn contains(&self, id: &BlobId) -> Result<bool, BlobError> {
        (**self).contains(id)
    }

    fn delete(&self, id: &BlobId) -> Result<(), BlobError> {
        (**self).delete(id)
    }
}
