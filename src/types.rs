//! Fixed-size newtypes over the byte arrays in §3's data model, so the
//! "header is exactly 32 bytes" / "target is 32 bytes" invariants are
//! enforced by construction instead of re-checked on every call.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{KawPowError, Result};

/// A 32-byte immutable block preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header(pub [u8; 32]);

impl Header {
    /// Builds a `Header` from a raw byte slice of unknown length, the §7
    /// host-side precondition check (`header_len == 32`) applied to bytes
    /// arriving from an external source (job dispatcher, wire format)
    /// rather than already sized as `[u8; 32]`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| KawPowError::InvalidHeaderLength {
            got: bytes.len(),
        })?;
        Ok(Header(arr))
    }

    /// The header reinterpreted as 8 little-endian 32-bit words.
    pub fn words(&self) -> [u32; 8] {
        let mut words = [0u32; 8];
        LittleEndian::read_u32_into(&self.0, &mut words);
        words
    }
}

/// A 256-bit difficulty target, interpreted MSB-first for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target(pub [u8; 32]);

impl Target {
    pub fn words(&self) -> [u32; 8] {
        let mut words = [0u32; 8];
        LittleEndian::read_u32_into(&self.0, &mut words);
        words
    }

    /// True iff `digest` is lexicographically ≤ `self` under big-endian
    /// ordering of the 8 little-endian-packed words, compared index 7 down
    /// to 0 as §4.5 specifies.
    pub fn admits(&self, digest: &Digest) -> bool {
        let target_words = self.words();
        let digest_words = digest.words();
        for i in (0..8).rev() {
            if digest_words[i] < target_words[i] {
                return true;
            }
            if digest_words[i] > target_words[i] {
                return false;
            }
        }
        true // equal
    }
}

/// The 256-bit final digest produced by the hash pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digest(pub [u32; 8]);

impl Digest {
    pub fn words(&self) -> [u32; 8] {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        LittleEndian::write_u32_into(&self.0, &mut out);
        out
    }
}

/// The mix hash (the reduced, pre-final-Keccak mix state) reported
/// alongside a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixHash(pub [u32; 8]);

impl MixHash {
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        LittleEndian::write_u32_into(&self.0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_accepts_exactly_32_bytes() {
        let bytes = [7u8; 32];
        let header = Header::from_slice(&bytes).unwrap();
        assert_eq!(header.0, bytes);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(matches!(
            Header::from_slice(&[0u8; 31]),
            Err(KawPowError::InvalidHeaderLength { got: 31 })
        ));
        assert!(matches!(
            Header::from_slice(&[0u8; 33]),
            Err(KawPowError::InvalidHeaderLength { got: 33 })
        ));
    }

    /// Target monotonicity (§8 property 3): if a nonce validates against
    /// `T`, it also validates against any `T' >= T`.
    #[test]
    fn target_monotonicity() {
        let digest = Digest([5, 0, 0, 0, 0, 0, 0, 0]);
        let tight = Target({
            let mut b = [0u8; 32];
            b[0] = 5;
            b
        });
        let loose = Target({
            let mut b = [0u8; 32];
            b[0] = 200;
            b
        });
        assert!(tight.admits(&digest));
        assert!(loose.admits(&digest));
    }

    #[test]
    fn all_zero_target_only_admits_zero_digest() {
        let target = Target([0u8; 32]);
        assert!(target.admits(&Digest([0u32; 8])));
        assert!(!target.admits(&Digest([0, 0, 0, 0, 0, 0, 0, 1])));
    }

    #[test]
    fn all_ff_target_admits_everything() {
        let target = Target([0xFFu8; 32]);
        assert!(target.admits(&Digest([u32::MAX; 8])));
        assert!(target.admits(&Digest([0u32; 8])));
    }
}
