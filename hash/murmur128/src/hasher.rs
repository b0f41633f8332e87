//! Adapters for using the engine with [`std::hash`] collections.

use std::hash::{BuildHasher, Hasher};

use getset::CopyGetters;
use serde::{Deserialize, Serialize};

use crate::Murmur128;

/// A [`Hasher`] backed by the MurmurHash3 x64-128 engine.
///
/// [`Hasher::finish`] returns the first 64-bit half of the digest of all the
/// bytes written so far. It doesn't consume the state, so more bytes can be
/// written afterwards.
#[derive(Debug, Clone, Default)]
#[allow(missing_copy_implementations)]
pub struct Murmur128Hasher {
    engine: Murmur128,
}

impl Murmur128Hasher {
    /// Creates a new hasher with the given seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self { Self { engine: Murmur128::new(seed) } }
}

impl Hasher for Murmur128Hasher {
    fn finish(&self) -> u64 { self.engine.fold().h1() }

    fn write(&mut self, bytes: &[u8]) { self.engine.absorb(bytes); }
}

/// Builds [`Murmur128Hasher`]s sharing the same seed.
///
/// This is also the configuration format of the engine; a missing `seed`
/// field deserializes to zero.
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
    CopyGetters,
    Serialize,
    Deserialize,
)]
pub struct BuildMurmur128Hasher {
    /// Gets the seed handed to every built hasher.
    #[get_copy = "pub"]
    #[serde(default)]
    seed: u32,
}

impl BuildMurmur128Hasher {
    /// Creates a new builder with the given seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self { Self { seed } }
}

impl BuildHasher for BuildMurmur128Hasher {
    type Hasher = Murmur128Hasher;

    fn build_hasher(&self) -> Self::Hasher { Murmur128Hasher::new(self.seed) }
}
