// SPDX-License-Identifier: BUSL-1.1
//! # Filesystem Blob Store
//!
//! Durable content-addressed layout:
//!
//! ```text
//! {root}/blobs/{digest}.bin         blob bytes
//! {root}/blobs/{digest}.meta.json  filename, content type, length, stored_at
//! {root}/tmp/{uuid}.partial         in-flight streamed writes
//! ```
//!
//! Writes stream through a temp file while hashing incrementally, then
//! rename into place — a reader can never observe a half-written blob
//! under its final name. Metadata sidecars are written with
//! `create_new(true)`: the first write wins and the TOCTOU race between
//! exists() and write() under concurrent uploads is eliminated.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use ccm_core::{BlobId, ContentHasher};

use crate::error::BlobError;
use crate::store::{BlobMeta, BlobStore};

/// Streamed writes are consumed in chunks of this size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Deletes `path` on drop while `armed`. Disarmed once the partial file
/// has been renamed into place or already removed.
struct CleanupGuard {
    path: PathBuf,
    armed: bool,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// A content-addressed blob store backed by the filesystem.
///
/// Cheap to clone — clones share the same root directory. Directories are
/// created lazily on the first write.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, id: &BlobId) -> PathBuf {
        self.root.join("blobs").join(format!("{}.bin", id.to_hex()))
    }

    fn meta_path(&self, id: &BlobId) -> PathBuf {
        self.root
            .join("blobs")
            .join(format!("{}.meta.json", id.to_hex()))
    }

    fn write_meta(&self, id: &BlobId, meta: &BlobMeta) -> Result<(), BlobError> {
        let path = self.meta_path(id);
        // First write wins: metadata is as immutable as the blob it
        // describes. AlreadyExists means another writer got there first
        // with identical content.
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut f) => {
                let bytes = serde_json::to_vec_pretty(meta).map_err(|e| BlobError::CorruptMeta {
                    id: id.to_hex(),
                    reason: format!("metadata serialization failed: {e}"),
                })?;
                f.write_all(&bytes)?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl BlobStore for FsBlobStore {
    fn put_stream(
        &self,
        reader: &mut dyn Read,
        filename: &str,
        content_type: &str,
    ) -> Result<BlobId, BlobError> {
        let blobs_dir = self.root.join("blobs");
        let tmp_dir = self.root.join("tmp");
        fs::create_dir_all(&blobs_dir)?;
        fs::create_dir_all(&tmp_dir)?;

        let tmp_path = tmp_dir.join(format!("{}.partial", Uuid::new_v4()));
        // Removes the partial file on any failure before the rename below
        // — a failed upload must not leave bytes behind.
        let mut cleanup = CleanupGuard {
            path: tmp_path.clone(),
            armed: true,
        };
        let mut tmp_file = fs::File::create(&tmp_path)?;

        let mut hasher = ContentHasher::new();
        let mut length: u64 = 0;
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = match reader.read(&mut buf)? {
                0 => break,
                n => n,
            };
            hasher.update(&buf[..n]);
            tmp_file.write_all(&buf[..n])?;
            length += n as u64;
        }
        tmp_file.sync_all()?;
        drop(tmp_file);

        let id = BlobId::from_digest(hasher.finalize());
        let final_path = self.blob_path(&id);

        if final_path.exists() {
            // Identical content already stored; the upload is a no-op.
            fs::remove_file(&tmp_path)?;
        } else {
            fs::rename(&tmp_path, &final_path)?;
        }
        cleanup.armed = false;

        self.write_meta(
            &id,
            &BlobMeta {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                length,
                stored_at: Utc::now(),
            },
        )?;

        tracing::debug!(blob = %id, length, "blob stored");
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> Result<Vec<u8>, BlobError> {
        let path = self.blob_path(id);
        if !path.exists() {
            return Err(BlobError::NotFound(id.to_hex()));
        }
        let bytes = fs::read(&path)?;

        // Recompute the digest from the stored bytes. Constant-time
        // comparison of the raw 32-byte digests.
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
        let path = self.blob_path(id);
        match fs::File::open(&path) {
            Ok(f) => Ok(Box::new(f)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(id.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn meta(&self, id: &BlobId) -> Result<BlobMeta, BlobError> {
        if !self.blob_path(id).exists() {
            return Err(BlobError::NotFound(id.to_hex()));
        }
        let bytes = fs::read(self.meta_path(id)).map_err(|e| BlobError::CorruptMeta {
            id: id.to_hex(),
            reason: format!("metadata sidecar unreadable: {e}"),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| BlobError::CorruptMeta {
            id: id.to_hex(),
            reason: format!("metadata sidecar is not valid JSON: {e}"),
        })
    }

    fn contains(&self, id: &BlobId) -> Result<bool, BlobError> {
        Ok(self.blob_path(id).exists())
    }

    fn delete(&self, id: &BlobId) -> Result<(), BlobError> {
        for path in [self.blob_path(id), self.meta_path(id)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
