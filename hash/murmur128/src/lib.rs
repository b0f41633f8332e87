//! An incremental implementation of the MurmurHash3 x64-128 hash function.
//!
//! The digests are bit-compatible with Austin Appleby's reference
//! `MurmurHash3_x64_128`. The hash is fast and well distributed, but it is
//! **not** cryptographically secure.
//!
//! ```
//! use murmur128::Murmur128;
//!
//! let mut engine = Murmur128::new(0);
//! engine.update(b"The quick brown fox ").unwrap();
//! engine.update(b"jumps over the lazy dog").unwrap();
//!
//! let digest = engine.finalize().unwrap();
//! assert_eq!(digest.to_string(), "6c1b07bc7bbc4be347939ac4a93c437a");
//! ```

use getset::CopyGetters;
use thiserror::Error;

pub mod digest;
pub mod hasher;

pub use digest::Digest;
pub use hasher::{BuildMurmur128Hasher, Murmur128Hasher};

/// The number of bytes consumed by a single block-mixing round.
pub const BLOCK_SIZE: usize = 16;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Represents a misuse of the [`Murmur128`] engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// Data was fed to an engine that has already produced its digest.
    #[error(
        "cannot update an engine that has been finalized; call `initialize` \
         first"
    )]
    Finalized,

    /// The digest was requested twice without re-initializing the engine.
    #[error(
        "the engine has already been finalized; call `initialize` before \
         finalizing again"
    )]
    AlreadyFinalized,

    /// The requested sub-range doesn't lie within the input buffer.
    #[error(
        "range of {count} bytes at offset {offset} is out of bounds for a \
         buffer of {len} bytes"
    )]
    #[allow(missing_docs)]
    OutOfRange { offset: usize, count: usize, len: usize },
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        Self::new(std::io::ErrorKind::InvalidInput, error)
    }
}

/// The MurmurHash3 x64-128 hashing engine.
///
/// The engine accepts input in arbitrarily sized pieces through
/// [`update`](Self::update) and produces the same digest as hashing the
/// concatenated input at once. Bytes that don't complete a 16-byte block are
/// carried over to the next call and folded into the state only when
/// [`finalize`](Self::finalize) runs.
///
/// Once finalized, the engine rejects further input until
/// [`initialize`](Self::initialize) is called.
#[derive(Debug, Clone, Eq, CopyGetters)]
#[allow(missing_copy_implementations)]
pub struct Murmur128 {
    /// Gets the seed the accumulators are reset to on initialization.
    #[get_copy = "pub"]
    seed: u32,

    /// Gets the total number of bytes fed since the last initialization.
    #[get_copy = "pub"]
    length: u64,

    h1: u64,
    h2: u64,

    carry: [u8; BLOCK_SIZE],
    carry_len: usize,

    finalized: bool,
}

// bytes past `carry_len` are stale leftovers of earlier blocks
impl PartialEq for Murmur128 {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
            && self.length == other.length
            && self.h1 == other.h1
            && self.h2 == other.h2
            && self.finalized == other.finalized
            && self.carry[..self.carry_len] == other.carry[..other.carry_len]
    }
}

impl Default for Murmur128 {
    fn default() -> Self { Self::new(0) }
}

impl Murmur128 {
    /// Creates a new engine that is ready to accept input.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn new(seed: u32) -> Self {
        Self {
            seed,
            length: 0,
            h1: seed as u64,
            h2: seed as u64,
            carry: [0; BLOCK_SIZE],
            carry_len: 0,
            finalized: false,
        }
    }

    /// Resets the engine to its freshly seeded state, discarding any input
    /// fed so far.
    pub fn initialize(&mut self) {
        log::trace!("initializing murmur128 engine with seed {}", self.seed);

        *self = Self::new(self.seed);
    }

    /// Returns `true` if [`finalize`](Self::finalize) has run since the last
    /// initialization.
    #[must_use]
    pub const fn is_finalized(&self) -> bool { self.finalized }

    /// Feeds `bytes` into the hash state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Finalized`] if the engine has already been finalized.
    /// The state is left untouched in that case.
    pub fn update(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.finalized {
            log::debug!(
                "rejected {} bytes fed to a finalized murmur128 engine",
                bytes.len()
            );
            return Err(Error::Finalized);
        }

        self.absorb(bytes);
        Ok(())
    }

    /// Feeds `count` bytes of `buffer` starting at `offset` into the hash
    /// state.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if `offset..offset + count` doesn't lie within
    ///   `buffer`; nothing is hashed.
    /// - [`Error::Finalized`] if the engine has already been finalized.
    pub fn update_range(
        &mut self,
        buffer: &[u8],
        offset: usize,
        count: usize,
    ) -> Result<(), Error> {
        let bytes = checked_range(buffer, offset, count)?;
        self.update(bytes)
    }

    /// Finishes the hash computation and returns the digest.
    ///
    /// The engine must be re-[`initialize`](Self::initialize)d before it can
    /// be used again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyFinalized`] if this engine has already been
    /// finalized since the last initialization.
    pub fn finalize(&mut self) -> Result<Digest, Error> {
        if self.finalized {
            log::debug!("rejected repeated finalization of murmur128 engine");
            return Err(Error::AlreadyFinalized);
        }

        log::trace!("finalizing murmur128 digest over {} bytes", self.length);

        self.finalized = true;
        Ok(self.fold())
    }

    pub(crate) fn absorb(&mut self, mut bytes: &[u8]) {
        self.length = self.length.wrapping_add(bytes.len() as u64);

        if self.carry_len > 0 {
            let take = (BLOCK_SIZE - self.carry_len).min(bytes.len());
            let (head, rest) = bytes.split_at(take);

            self.carry[self.carry_len..self.carry_len + take]
                .copy_from_slice(head);
            self.carry_len += take;
            bytes = rest;

            if self.carry_len < BLOCK_SIZE {
                return;
            }

            let block = self.carry;
            self.mix_block(&block);
            self.carry_len = 0;
        }

        while let Some((block, rest)) =
            bytes.split_first_chunk::<BLOCK_SIZE>()
        {
            self.mix_block(block);
            bytes = rest;
        }

        self.carry[..bytes.len()].copy_from_slice(bytes);
        self.carry_len = bytes.len();
    }

    /// Computes the digest of everything absorbed so far without touching the
    /// running state.
    pub(crate) const fn fold(&self) -> Digest {
        let mut h1 = self.h1;
        let mut h2 = self.h2;

        if self.carry_len > 0 {
            let (k1, k2) = split_tail(&self.carry, self.carry_len);

            h2 ^= mix_k2(k2);
            h1 ^= mix_k1(k1);
        }

        h1 ^= self.length;
        h2 ^= self.length;

        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);

        h1 = fmix64(h1);
        h2 = fmix64(h2);

        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);

        Digest::from_words(h1, h2)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn mix_block(&mut self, block: &[u8; BLOCK_SIZE]) {
        let block = u128::from_le_bytes(*block);
        let k1 = block as u64;
        let k2 = (block >> 64) as u64;

        self.h1 ^= mix_k1(k1);
        self.h1 = self
            .h1
            .rotate_left(27)
            .wrapping_add(self.h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);

        self.h2 ^= mix_k2(k2);
        self.h2 = self
            .h2
            .rotate_left(31)
            .wrapping_add(self.h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }
}

impl std::io::Write for Murmur128 {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

/// Computes the MurmurHash3 x64-128 digest of `bytes` in one call.
#[must_use]
pub fn hash(bytes: &[u8], seed: u32) -> Digest {
    let mut engine = Murmur128::new(seed);
    engine.absorb(bytes);
    engine.fold()
}

/// Computes the MurmurHash3 x64-128 digest of `count` bytes of `buffer`
/// starting at `offset`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] if `offset..offset + count` doesn't lie
/// within `buffer`.
pub fn hash_range(
    buffer: &[u8],
    offset: usize,
    count: usize,
    seed: u32,
) -> Result<Digest, Error> {
    checked_range(buffer, offset, count).map(|bytes| hash(bytes, seed))
}

fn checked_range(
    buffer: &[u8],
    offset: usize,
    count: usize,
) -> Result<&[u8], Error> {
    offset
        .checked_add(count)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            log::debug!(
                "rejected out of range murmur128 input: offset {offset}, \
                 count {count}, buffer length {}",
                buffer.len()
            );

            Error::OutOfRange { offset, count, len: buffer.len() }
        })
}

/// Splits the leftover bytes of the final partial block into the two key
/// words; bytes past `len` contribute zero.
#[allow(clippy::cast_lossless)]
const fn split_tail(carry: &[u8; BLOCK_SIZE], len: usize) -> (u64, u64) {
    let mut k1 = 0;
    let mut k2 = 0;

    let mut i = 0;
    while i < len {
        let byte = carry[i] as u64;

        if i < BLOCK_SIZE / 2 {
            k1 |= byte << (8 * i);
        } else {
            k2 |= byte << (8 * (i - BLOCK_SIZE / 2));
        }

        i += 1;
    }

    (k1, k2)
}

const fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

const fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

/// The avalanche finalizer; forces every input bit to affect every output
/// bit.
const fn fmix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}
