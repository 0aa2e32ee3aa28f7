// SPDX-License-Identifier: BUSL-1.1
//! Registry error types.

use thiserror::Error;

use ccm_core::DocumentId;

/// Errors from document registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No record with the given identifier exists in either partition.
    #[error("document {0} not found")]
    NotFound(DocumentId),

    /// A record with this identifier already exists.
    #[error("document {0} already exists")]
    AlreadyExists(DocumentId),

    /// A persisted record could not be read back.
    #[error("corrupt record at {path}: {reason}")]
    CorruptRecord {
        /// Path of the unreadable record file.
        path: String,
        /// Why it could not be parsed.
        reason: String,
    },

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
