// SPDX-License-Identifier: BUSL-1.1
//! Blob store error types.

use thiserror::Error;

/// Errors from blob store operations.
#[derive(Error, Debug)]
pub enum BlobError {
    /// No blob with the given identifier exists in the store.
    #[error("blob {0} not found")]
    NotFound(String),

    /// Stored bytes no longer match the identifier's digest.
    ///
    /// This means on-disk corruption or tampering — the store refuses to
    /// return the bytes.
    #[error("integrity violation: blob {id} hashes to {actual}")]
    IntegrityViolation {
        /// The identifier that was requested.
        id: String,
        /// The digest the stored bytes actually hash to.
        actual: String,
    },

    /// The blob's metadata sidecar is missing or unreadable.
    #[error("blob {id} has corrupt metadata: {reason}")]
    CorruptMeta {
        /// The identifier whose metadata failed to load.
        id: String,
        /// Why the metadata could not be used.
        reason: String,
    },

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
