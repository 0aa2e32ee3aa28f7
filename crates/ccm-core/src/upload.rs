// SPDX-License-Identifier: BUSL-1.1
//! # Upload Payloads
//!
//! [`FileUpload`] is the boundary type for file submissions: raw bytes plus
//! the client-supplied filename and content type. The emptiness rule lives
//! here because it is the most error-prone branch in the whole store:
//! browsers submit an *empty* multipart field when the user picks no file,
//! and that must mean "keep the current file", never "wipe the history".

use serde::{Deserialize, Serialize};

/// A file submitted alongside a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    /// Client-supplied display name. Sanitized before persisting.
    pub filename: String,
    /// Client-declared MIME type (e.g. `application/pdf`). Not verified.
    pub content_type: String,
    /// The raw file bytes.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Build an upload from its parts.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether this upload counts as "no file was provided".
    ///
    /// An empty filename or a zero-byte payload both count: either is what
    /// an untouched file input produces. Callers treat an empty upload
    /// exactly like an absent one.
    pub fn is_empty(&self) -> bool {
        self.filename.trim().is_empty() || self.bytes.is_empty()
    }
}
