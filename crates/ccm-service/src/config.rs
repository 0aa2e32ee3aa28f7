// SPDX-License-Identifier: BUSL-1.1
//! Service configuration.

use ccm_core::Role;

/// What happens to a document's blobs when the document is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Leave every blob in place. Historical evidence survives record
    /// deletion and can be reached through an out-of-band inventory.
    ///
    /// The default: compliance artifacts usually must outlive the records
    /// that referenced them.
    #[default]
    Retain,

    /// Delete the current blob and the full revision history when the
    /// record is deleted. Reclamation is best-effort; a blob that fails
    /// to delete is logged and left behind, never surfaced as an error.
    ReclaimOnDelete,
}

/// Configuration for [`DocumentService`](crate::DocumentService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The role required for update and delete. Creation and reads need
    /// only an authenticated identity.
    pub mutation_role: Role,
    /// Blob handling on document deletion.
    pub retention: RetentionPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mutation_role: Role::data_protection_officer(),
            retention: RetentionPolicy::Retain,
        }
    }
}
