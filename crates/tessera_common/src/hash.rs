//! Fingerprints of region images.
//!
//! The firmware loads regions as streams of little-endian 32-bit words. A
//! fingerprint is XXH3-128 over exactly those bytes, so it can be computed
//! while the image is being laid out, from words or from already encoded
//! region bytes, and still match a hash of the finished image.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit XXH3 fingerprint of a loadable image.
///
/// Two images with the same fingerprint are taken to be byte-identical, which
/// lets repeated compile passes be compared for deterministic output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Fingerprints a complete byte image.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// The first word of the fingerprint, for log lines.
    pub fn short(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", self.short())
    }
}

/// Incremental fingerprinting of an image assembled piece by piece.
pub struct ImageHasher(Xxh3);

impl ImageHasher {
    /// Starts an empty image.
    pub fn new() -> Self {
        Self(Xxh3::new())
    }

    /// Appends words in their little-endian load order.
    pub fn words(&mut self, words: &[u32]) -> &mut Self {
        for word in words {
            self.0.update(&word.to_le_bytes());
        }
        self
    }

    /// Appends already encoded bytes.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update(bytes);
        self
    }

    /// Fingerprint of everything appended so far.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.0.digest128().to_le_bytes())
    }
}

impl Default for ImageHasher {
    fn default() -> Self {
        Self::new()
    }
}
