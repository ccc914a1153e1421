//! Group and host identities
//!
//! Names never travel on the wire; only their 16-byte MD5 digests do. Two
//! independently built peers must derive bit-identical fingerprints from the
//! same name, which is why the digest algorithm is fixed by the protocol.

use std::fmt;

use md5::{Digest, Md5};

/// 16-byte fingerprint of a human-readable group or host name
///
/// Fingerprints compare and order byte-lexicographically; two fingerprints
/// are equal iff their source names hash to the same digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Fingerprint a name
    #[must_use]
    pub fn of(name: &str) -> Self {
        Self(Md5::digest(name.as_bytes()).into())
    }

    /// Create from raw digest bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Render as 32 lowercase hex characters
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
