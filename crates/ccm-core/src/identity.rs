// SPDX-License-Identifier: BUSL-1.1
//! # Identifier and Principal Newtypes
//!
//! Domain-primitive newtypes for the document store. Each identifier is a
//! distinct type — you cannot pass a [`BlobId`] where a [`DocumentId`] is
//! expected.
//!
//! ## Validation
//!
//! String-based types ([`BlobId`], [`Role`], [`Identity`]) validate at
//! construction time. The UUID-based [`DocumentId`] is always valid by
//! construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::ContentDigest;
use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// DocumentId
// ---------------------------------------------------------------------------

/// A unique identifier for a document record (policy or guideline).
///
/// Assigned by the registry at creation and stable for the life of the
/// record. Random v4 UUIDs make identifiers unique across partitions, not
/// just within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random document identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a document identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// BlobId
// ---------------------------------------------------------------------------

/// An opaque reference into the blob store.
///
/// A `BlobId` is the SHA-256 digest of the blob's bytes, rendered as
/// lowercase hex on the wire. Identifiers are therefore self-verifying:
/// a store can recompute the digest on read and detect corruption.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobId(ContentDigest);

impl BlobId {
    /// Build a blob identifier from a content digest.
    pub fn from_digest(digest: ContentDigest) -> Self {
        Self(digest)
    }

    /// Parse a blob identifier from its 64-character hex form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        ContentDigest::from_hex(input).map(Self)
    }

    /// The underlying content digest.
    pub fn digest(&self) -> &ContentDigest {
        &self.0
    }

    /// Render the identifier as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BlobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Identity and Role
// ---------------------------------------------------------------------------

/// An authenticated principal, as handed over by the login layer.
///
/// The login flow itself (OAuth, sessions, cookies) is outside this core;
/// what arrives here is only the fact "this subject is authenticated".
/// Holding an `Identity` value is the type-level proof of authentication —
/// unauthenticated callers cannot construct a service request at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    subject: String,
}

impl_validating_deserialize!(Identity);

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.subject)
    }
}

impl Identity {
    /// Create an identity from an authenticated subject string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySubject`] if the subject is empty or
    /// whitespace-only.
    pub fn new(subject: impl Into<String>) -> Result<Self, ValidationError> {
        let s = subject.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        Ok(Self {
            subject: trimmed.to_string(),
        })
    }

    /// The authenticated subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subject)
    }
}

/// A named role granted to identities by the external authorization system.
///
/// Role names are opaque to this core — the gate decides what they mean.
/// The one role this store cares about by default is
/// [`Role::data_protection_officer()`], required for mutations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Role(String);

impl_validating_deserialize!(Role);

/// The role required for document mutations, exactly as the authorization
/// system spells it.
const DATA_PROTECTION_OFFICER: &str = "Data Protection Officer";

impl Role {
    /// Create a role from a name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRoleName`] if the name is empty or
    /// whitespace-only.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let s = name.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyRoleName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The role required to update or delete documents.
    pub fn data_protection_officer() -> Self {
        Self(DATA_PROTECTION_OFFICER.to_string())
    }

    /// The role name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
