// SPDX-License-Identifier: BUSL-1.1
//! Document record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ccm_core::{BlobId, DocumentId};

/// The two kinds of compliance document, each owning a registry partition.
///
/// The kind is fixed at creation — a record never moves between the
/// `Policy` and `Guideline` partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A binding company policy.
    Policy,
    /// A non-binding guideline.
    Guideline,
}

impl DocumentKind {
    /// The canonical partition name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Guideline => "guideline",
        }
    }

    /// Both kinds, in partition order.
    pub fn all() -> [DocumentKind; 2] {
        [Self::Policy, Self::Guideline]
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current file revision of a document plus its full revision chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Blob reference for the active revision. Always resolvable.
    pub current_blob: BlobId,
    /// Sanitized display name of the active revision.
    pub filename: String,
    /// Revision counter. 0 for a freshly created document.
    pub version: u32,
    /// Blob references of all prior revisions, oldest first. Append-only.
    pub history: Vec<BlobId>,
    /// When the file itself last changed (metadata-only edits do not
    /// touch this; see [`DocumentRecord::last_updated`]).
    pub timestamp: DateTime<Utc>,
}

impl FileState {
    /// Whether the revision-chain bookkeeping is consistent:
    /// `history.len() == version`.
    pub fn history_is_consistent(&self) -> bool {
        self.history.len() == self.version as usize
    }

    /// All blob references held by this state: every history entry, oldest
    /// first, then the current blob.
    pub fn all_blobs(&self) -> impl Iterator<Item = &BlobId> {
        self.history.iter().chain(std::iter::once(&self.current_blob))
    }
}

/// One compliance document: metadata plus its file-version chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Registry-assigned identifier, immutable for the record's life.
    pub id: DocumentId,
    /// Partition the record lives in. Never changes after creation.
    pub kind: DocumentKind,
    /// Free-text title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Current file and revision history.
    pub file: FileState,
    /// Refreshed on every mutation, metadata-only edits included.
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccm_core::sha256_digest;

    fn blob(data: &[u8]) -> BlobId {
        BlobId::from_digest(sha256_digest(data))
    }

    fn sample_state() -> FileState {
        FileState {
            current_blob: blob(b"v2"),
            filename: "policy.pdf".to_string(),
            version: 2,
            history: vec![blob(b"v0"), blob(b"v1")],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn kind_partition_names() {
        assert_eq!(DocumentKind::Policy.as_str(), "policy");
        assert_eq!(DocumentKind::Guideline.as_str(), "guideline");
    }

    #[test]
    fn history_consistency_check() {
        let mut state = sample_state();
        assert!(state.history_is_consistent());
        state.version = 3;
        assert!(!state.history_is_consistent());
    }

    #[test]
    fn all_blobs_yields_history_then_current() {
        let state = sample_state();
        let blobs: Vec<_> = state.all_blobs().cloned().collect();
        assert_eq!(blobs, vec![blob(b"v0"), blob(b"v1"), blob(b"v2")]);
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = DocumentRecord {
            id: DocumentId::new(),
            kind: DocumentKind::Policy,
            title: "Data Retention".to_string(),
            description: "How long we keep things".to_string(),
            file: sample_state(),
            last_updated: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::Guideline).unwrap(),
            "\"guideline\""
        );
    }
}
