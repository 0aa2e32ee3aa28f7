// SPDX-License-Identifier: BUSL-1.1
//! # Validation Errors
//!
//! Structured validation errors for domain primitives and request inputs,
//! built with `thiserror`. Each variant carries enough context to tell the
//! caller exactly which input was rejected and why.

use thiserror::Error;

/// Errors raised when a domain primitive or request input fails validation.
///
/// Validation failures are always the caller's fault: they are returned
/// synchronously and are never worth retrying with the same input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A document title was missing or contained only whitespace.
    #[error("document title must not be empty")]
    EmptyTitle,

    /// A create request arrived without a usable file upload.
    ///
    /// An upload with an empty filename or zero bytes counts as absent —
    /// browsers submit an empty multipart field when the user picks no file.
    #[error("a file upload is required to create a document")]
    MissingUpload,

    /// An identity was constructed with an empty subject.
    #[error("identity subject must not be empty")]
    EmptySubject,

    /// A role was constructed with an empty name.
    #[error("role name must not be empty")]
    EmptyRoleName,

    /// A blob identifier was not a 64-character lowercase hex digest.
    #[error("invalid blob identifier {value:?}: {reason}")]
    InvalidBlobId {
        /// The rejected input, truncated by the caller if oversized.
        value: String,
        /// Why the input was rejected.
        reason: String,
    },
}
