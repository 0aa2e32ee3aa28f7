// SPDX-License-Identifier: BUSL-1.1
//! # Version History Engine
//!
//! Pure functions that compute the next [`FileState`] of a document. The
//! blob bytes are written by the caller *before* these run (blobs are
//! immutable and independently addressable, so those writes need no lock);
//! what happens here is only the bookkeeping — and the bookkeeping is
//! where the invariants live.
//!
//! These functions are deliberately the only code in the workspace that
//! constructs or advances a `FileState`. If an update carries no file, the
//! engine is simply not invoked and the state is untouched.

use chrono::{DateTime, Utc};

use ccm_core::BlobId;

use crate::document::FileState;

/// Build the file state for a freshly created document.
///
/// The first stored file is version 0 with an empty history — creation is
/// not a "revision" of anything.
pub fn initial(blob: BlobId, filename: impl Into<String>, now: DateTime<Utc>) -> FileState {
    FileState {
        current_blob: blob,
        filename: filename.into(),
        version: 0,
        history: Vec::new(),
        timestamp: now,
    }
}

/// Compute the file state after replacing the file with a new revision.
///
/// The outgoing `current_blob` is appended to the history (oldest first),
/// the version advances by exactly 1, and the file timestamp is refreshed.
/// The previous state is untouched — callers persist the returned state
/// atomically or not at all.
pub fn revise(
    current: &FileState,
    new_blob: BlobId,
    filename: impl Into<String>,
    now: DateTime<Utc>,
) -> FileState {
    let mut history = current.history.clone();
    history.push(current.current_blob.clone());
    FileState {
        current_blob: new_blob,
        filename: filename.into(),
        version: current.version + 1,
        history,
        timestamp: now,
    }
}
