// SPDX-License-Identifier: BUSL-1.1
//! # ccm-blob — Content-Addressed Blob Storage
//!
//! Raw file bytes for document revisions live here, addressed by their
//! SHA-256 digest. The store is append-only from the caller's point of
//! view: blobs are immutable once written, writes of identical content are
//! idempotent, and nothing is ever garbage-collected implicitly — a blob
//! referenced by any document's history stays resolvable until someone
//! explicitly deletes it.
//!
//! ## Integrity Invariant
//!
//! A [`BlobId`](ccm_core::BlobId) *is* the content digest. On every
//! buffered read the digest is recomputed from the stored bytes and
//! compared (in constant time) against the identifier. Corruption or
//! tampering surfaces as [`BlobError::IntegrityViolation`] at read time,
//! never as silently wrong bytes.
//!
//! ## Backends
//!
//! - [`FsBlobStore`] — durable filesystem layout, streamed writes for
//!   bounded memory use under concurrent uploads.
//! - [`MemoryBlobStore`] — `DashMap`-backed, for tests and ephemeral
//!   deployments.

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use error::BlobError;
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use store::{BlobMeta, BlobStore};
