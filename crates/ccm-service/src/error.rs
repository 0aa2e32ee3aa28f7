// SPDX-License-Identifier: BUSL-1.1
//! # Service Error Taxonomy
//!
//! The four outcomes a caller can see from this core, per the error
//! contract: `Validation` (caller's fault, don't retry), `NotFound`,
//! `Forbidden` (role check failed or gate unreachable — fail-closed), and
//! `Storage` (transient; safe to retry the whole operation, which re-reads
//! current state rather than reusing a stale version).

use thiserror::Error;

use ccm_blob::BlobError;
use ccm_core::ValidationError;
use ccm_registry::RegistryError;

/// Errors returned by the document service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed or missing required input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Document or blob identifier does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller does not hold the required role, or the gate could not
    /// be reached (fail-closed).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Registry or blob store failure — transient, safe to retry the
    /// whole operation.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => Self::NotFound(format!("document {id}")),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<BlobError> for ServiceError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(id) => Self::NotFound(format!("blob {id}")),
            other => Self::Storage(other.to_string()),
        }
    }
}
