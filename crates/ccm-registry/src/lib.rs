// SPDX-License-Identifier: BUSL-1.1
//! # ccm-registry — Document Records and Version History
//!
//! The durable collection of compliance documents. Each record is a policy
//! or guideline with descriptive metadata and a [`FileState`]: the current
//! file blob plus the complete, append-only chain of every prior revision.
//!
//! ## Versioning Invariants
//!
//! - `version` starts at 0 and increases by exactly 1 per file revision;
//!   it is never decremented, reused, or reset.
//! - `history` holds prior blob references oldest-first and never shrinks;
//!   its length always equals `version`.
//! - metadata-only edits touch neither `version` nor `history`.
//!
//! ## Update Serialization
//!
//! Every backend funnels the load-modify-store cycle of
//! [`DocumentRegistry::update_with`] through a per-document exclusion
//! scope. Two concurrent revisions of the same document can therefore
//! never both read the same `version` and silently lose one of the file
//! uploads.

pub mod document;
pub mod error;
pub mod fs;
pub mod memory;
pub mod registry;
pub mod revision;

pub use document::{DocumentKind, DocumentRecord, FileState};
pub use error::RegistryError;
pub use fs::FsRegistry;
pub use memory::MemoryRegistry;
pub use registry::DocumentRegistry;
