//! Contains the definition of [`Digest`].

use std::fmt;

use derive_more::{AsRef, From, Into};
use serde::{Deserialize, Serialize};

/// The 16-byte output of the MurmurHash3 x64-128 function.
///
/// The bytes are laid out as the little-endian encoding of the first
/// accumulator followed by the little-endian encoding of the second one, the
/// same layout produced by reference implementations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    AsRef,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct Digest([u8; 16]);

impl Digest {
    #[allow(clippy::cast_lossless)]
    pub(crate) const fn from_words(h1: u64, h2: u64) -> Self {
        Self((h1 as u128 | ((h2 as u128) << 64)).to_le_bytes())
    }

    /// Gets the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] { &self.0 }

    /// Consumes the digest and returns its raw bytes.
    #[must_use]
    pub const fn into_bytes(self) -> [u8; 16] { self.0 }

    /// Gets the first 64-bit half of the digest.
    #[must_use]
    pub const fn h1(&self) -> u64 {
        let [a, b, c, d, e, f, g, h, ..] = self.0;
        u64::from_le_bytes([a, b, c, d, e, f, g, h])
    }

    /// Gets the second 64-bit half of the digest.
    #[must_use]
    pub const fn h2(&self) -> u64 {
        let [.., a, b, c, d, e, f, g, h] = self.0;
        u64::from_le_bytes([a, b, c, d, e, f, g, h])
    }

    /// Reads the whole digest as a little-endian 128-bit integer, i.e.
    /// `h1 | h2 << 64`.
    #[must_use]
    pub const fn as_u128(&self) -> u128 { u128::from_le_bytes(self.0) }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl fmt::UpperHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}
