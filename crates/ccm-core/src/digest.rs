// SPDX-License-Identifier: BUSL-1.1
//! # Content Digests
//!
//! SHA-256 content digests for the blob store. A digest doubles as the
//! blob's identifier, so every well-formed reference is also a checksum:
//! stores recompute the digest on read and reject corrupted content.
//!
//! [`ContentHasher`] supports incremental hashing so large uploads can be
//! digested chunk-by-chunk while streaming to disk, without buffering the
//! whole payload in memory.

use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// A raw SHA-256 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap a raw 32-byte digest value.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from a 64-character hex string.
    ///
    /// Hex digits are accepted in either case. Parsing works over raw
    /// bytes — arbitrary (including non-ASCII) input is rejected with an
    /// error, never a panic.
    pub fn from_hex(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.len() != 64 {
            return Err(ValidationError::InvalidBlobId {
                value: truncate_for_error(input),
                reason: format!("expected 64 hex chars, got {}", s.len()),
            });
        }
        let raw = s.as_bytes();
        let mut bytes = [0u8; 32];
        for (i, out) in bytes.iter_mut().enumerate() {
            let hi = hex_nibble(raw[2 * i]);
            let lo = hex_nibble(raw[2 * i + 1]);
            *out = match (hi, lo) {
                (Some(hi), Some(lo)) => (hi << 4) | lo,
                _ => {
                    return Err(ValidationError::InvalidBlobId {
                        value: truncate_for_error(input),
                        reason: format!("non-hex characters at offset {}", 2 * i),
                    })
                }
            };
        }
        Ok(Self(bytes))
    }
}

/// Value of one hex digit, case-insensitive. `None` for anything else.
fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the SHA-256 digest of a byte slice in one call.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(bytes)
}

/// Incremental SHA-256 hasher for streamed content.
///
/// Feed chunks with [`update()`](ContentHasher::update) as they arrive,
/// then call [`finalize()`](ContentHasher::finalize) for the digest.
#[derive(Debug, Default)]
pub struct ContentHasher(Sha256);

impl ContentHasher {
    /// Create a fresh hasher.
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Feed a chunk of content into the hasher.
    pub fn update(&mut self, chunk: &[u8]) {
        self.0.update(chunk);
    }

    /// Consume the hasher and return the digest of everything fed so far.
    pub fn finalize(self) -> ContentDigest {
        let hash = self.0.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest::new(bytes)
    }
}

/// Keep rejected inputs short in error messages.
fn truncate_for_error(input: &str) -> String {
    const MAX: usize = 80;
    if input.len() <= MAX {
        return input.to_string();
    }
    let mut end = MAX;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &input[..end])
}
