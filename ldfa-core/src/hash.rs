//! The stable 256-bit content hash that identifies an LDFA's accepted set
//! (`spec.md` §4.1, invariant 5), plus the 128-bit per-state hash used by
//! minimization (`spec.md` §4.2 step 3). Both ride on the same `sha2`
//! dependency so the crate does not pull in two hashing families.
use sha2::{Digest, Sha256};
use std::fmt;

/// A 256-bit digest, stable across process runs, identifying the accepted
/// language of a finalized [`crate::ldfa::Ldfa`] up to state ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incrementally hashes a canonically-ordered sequence of byte chunks (the
/// shape, then each layer's transition array in layer order) into one
/// [`Hash256`].
#[derive(Default)]
pub struct ContentHasher(Sha256);

impl ContentHasher {
    pub fn new() -> Self {
        ContentHasher(Sha256::new())
    }

    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.update(bytes);
        self
    }

    pub fn update_u32_slice(&mut self, words: &[u32]) -> &mut Self {
        for w in words {
            self.0.update(w.to_le_bytes());
        }
        self
    }

    pub fn finish(self) -> Hash256 {
        let digest = self.0.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Hash256(out)
    }
}

/// Packs an image vector directly into a 128-bit key (spec.md §4.2 step 3,
/// fast path) when `width * 32 <= 128` bits, i.e. width <= 4, zero padded.
/// The key holds the image alone — `old_id` must never enter it, since
/// minimization sorts on this key and relies on equal images producing
/// equal keys regardless of which old state produced them (spec.md §4.2
/// step 5, §3 invariant 5).
pub fn pack_image_128(image: &[u32]) -> Option<u128> {
    if image.len() > 4 {
        return None;
    }
    let mut words = [0u32; 4];
    words[..image.len()].copy_from_slice(image);
    Some(u128::from_le_bytes(
        words
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect::<Vec<u8>>()
            .try_into()
            .unwrap(),
    ))
}

/// SHA-256 of the image alone, first 128 bits (spec.md §4.2 step 3, slow
/// path for wide layers). `old_id` must not be folded in here for the same
/// reason as [`pack_image_128`]: the key is a function of the image only.
pub fn hash_image_128(image: &[u32]) -> u128 {
    let mut hasher = Sha256::new();
    for w in image {
        hasher.update(w.to_le_bytes());
    }
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    u128::from_le_bytes(bytes)
}
