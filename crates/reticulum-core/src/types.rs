//! Newtype wrappers for announce addressing fields.
//!
//! Destination hashes arrive from the transport layer already validated as
//! 16-byte truncated hashes; wrapping them keeps them from being mixed up with
//! other opaque byte fields (public keys, app_data) on the ingestion path.

use core::fmt;

/// Length of a truncated Reticulum hash in bytes.
pub const TRUNCATED_HASH_LEN: usize = 16;

/// Helper to write lowercase hex without the `hex` crate.
fn fmt_hex(bytes: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

/// A destination hash (16-byte truncated hash).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct DestinationHash([u8; TRUNCATED_HASH_LEN]);

impl DestinationHash {
    pub const fn new(bytes: [u8; TRUNCATED_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw hash bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; TRUNCATED_HASH_LEN] {
        self.0
    }
}

impl AsRef<[u8]> for DestinationHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; TRUNCATED_HASH_LEN]> for DestinationHash {
    fn from(bytes: [u8; TRUNCATED_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for DestinationHash {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; TRUNCATED_HASH_LEN] = bytes.try_into().map_err(|_| InvalidLength {
            expected: TRUNCATED_HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for DestinationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_hex(&self.0, f)
    }
}

impl fmt::Debug for DestinationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DestinationHash(")?;
        fmt_hex(&self.0[..4], f)?;
        write!(f, "..)")
    }
}

/// Error returned when a byte slice has the wrong length for a newtype.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid length: expected {expected} bytes, got {actual}")]
pub struct InvalidLength {
    pub expected: usize,
    pub actual: usize,
}
