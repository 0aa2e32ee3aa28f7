// SPDX-License-Identifier: BUSL-1.1
//! # In-Memory Blob Store
//!
//! `DashMap`-backed backend for tests and ephemeral deployments. Buffers
//! whole payloads in memory — the bounded-memory streaming guarantee
//! belongs to the filesystem backend.

use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use subtle::ConstantTimeEq;

use ccm_core::{BlobId, ContentHasher};

use crate::error::BlobError;
use crate::store::{BlobMeta, BlobStore};

#[derive(Debug, Clone)]
struct StoredBlob {
    meta: BlobMeta,
    bytes: Arc<Vec<u8>>,
}

/// An in-memory content-addressed blob store.
///
/// Cheaply cloneable — all clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<BlobId, StoredBlob>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs currently held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put_stream(
        &self,
        reader: &mut dyn Read,
        filename: &str,
        content_type: &str,
    ) -> Result<BlobId, BlobError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let mut hasher = ContentHasher::new();
        hasher.update(&bytes);
        let id = BlobId::from_digest(hasher.finalize());

        // First write wins, matching the filesystem backend.
        self.blobs.entry(id.clone()).or_insert_with(|| StoredBlob {
            meta: BlobMeta {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                length: bytes.len() as u64,
                stored_at: Utc::now(),
            },
            bytes: Arc::new(bytes),
        });
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> Result<Vec<u8>, BlobError> {
        let bytes = self
            .blobs
            .get(id)
            .map(|entry| entry.bytes.as_ref().clone())
            .ok_or_else(|| BlobError::NotFound(id.to_hex()))?;

        // Same integrity check as the filesystem backend: the identifier
        // is the digest, so recompute and compare in constant time.
        let actual = ccm_core::sha256_digest(&bytes);
        if !bool::from(actual.as_bytes().ct_eq(id.digest().as_bytes())) {
            return Err(BlobError::IntegrityViolation {
                id: id.to_hex(),
                actual: actual.to_hex(),
            });
        }
        Ok(bytes)
    }

    fn open(&self, id: &BlobId) -> Result<Box<dyn Read + Send>, BlobError> {
        let bytes = self.get(id)?;
        Ok(Box::new(std::io::Cursor::new(bytes)))
    }

    fn meta(&self, id: &BlobId) -> Result<BlobMeta, BlobError> {
        self.blobs
            .get(id)
            .map(|entry| entry.meta.clone())
            .ok_or_else(|| BlobError::NotFound(id.to_hex()))
    }

    fn contains(&self, id: &BlobId) -> Result<bool, BlobError> {
        Ok(self.blobs.contains_key(id))
    }

    fn delete(&self, id: &BlobId) -> Result<(), BlobError> {
        self.blobs.remove(id);
        Ok(())
    }
}
