// SPDX-License-Identifier: BUSL-1.1
#![deny(missing_docs)]

//! # ccm-core — Foundational Types for the CCM Document Store
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`,
//! `uuid`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`BlobId`] where a [`DocumentId`] is
//!    expected.
//!
//! 2. **Blob identifiers are content digests.** A [`BlobId`] is the SHA-256
//!    digest of the blob bytes, so a well-formed identifier can never point
//!    at different content, and stores can verify integrity on read.
//!
//! 3. **Validated construction.** Constrained values ([`Role`],
//!    [`Identity`], [`BlobId`]) validate at construction time and again at
//!    deserialization — invalid values are rejected, never silently
//!    accepted.
//!
//! 4. **[`ValidationError`] hierarchy.** Structured errors with `thiserror`
//!    — no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod filename;
pub mod identity;
pub mod upload;

// Re-export primary types at crate root for ergonomic imports.
pub use digest::{sha256_digest, ContentDigest, ContentHasher};
pub use error::ValidationError;
pub use filename::sanitize_filename;
pub use identity::{BlobId, DocumentId, Identity, Role};
pub use upload::FileUpload;
