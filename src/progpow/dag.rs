//! The DAG: a byte-addressed, read-only table of 64-byte items (16
//! little-endian 32-bit words each). Externally built and owned (§3); this
//! module only defines the read contract every mix-loop caller needs,
//! cheaply satisfiable by an in-memory buffer (tests, CPU reference) or a
//! GPU-resident buffer (the `device` backend).

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{KawPowError, Result};

/// Bytes in the shared-memory/`c_dag` hot cache: the first 16 KiB of the
/// DAG, read as 4096 32-bit words.
pub const CACHE_BYTES: usize = 16 * 1024;
/// Words in the hot cache.
pub const CACHE_WORDS: usize = CACHE_BYTES / 4;
/// Bytes per DAG item.
pub const ITEM_BYTES: usize = 64;
/// Words per DAG item.
pub const ITEM_WORDS: usize = ITEM_BYTES / 4;

/// Read-only access to a DAG: item lookup and the hot-cache view of its
/// first 16 KiB, both index-reduced by the caller so no implementation here
/// can be asked for an out-of-range word.
pub trait Dag {
    /// Total DAG size in bytes. Always a multiple of 64.
    fn size_bytes(&self) -> u64;

    /// Number of 64-byte items: `size_bytes() / 64`.
    fn item_count(&self) -> u64 {
        self.size_bytes() / ITEM_BYTES as u64
    }

    /// The 16 little-endian 32-bit words of item `index`.
    ///
    /// Callers reduce `index` modulo `item_count()` before calling, per the
    /// mix loop's "every index is reduced modulo a derived capacity"
    /// invariant; implementations may assume `index < item_count()`.
    fn item(&self, index: u64) -> [u32; ITEM_WORDS];

    /// One word of the first-16-KiB hot cache.
    ///
    /// Callers reduce `word` modulo `CACHE_WORDS` before calling.
    fn cache_word(&self, word: usize) -> u32;
}

/// An in-memory, `Vec<u8>`-backed DAG: the test oracle and the CPU
/// reference dispatcher's data source.
pub struct InMemoryDag {
    bytes: Vec<u8>,
}

impl InMemoryDag {
    /// Wraps `bytes` as a DAG, enforcing the §3 invariants: size is a
    /// multiple of 64 and at least 16 KiB (so the hot-cache preload is
    /// well-defined).
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        let size = bytes.len() as u64;
        if size % ITEM_BYTES as u64 != 0 || size < CACHE_BYTES as u64 {
            return Err(KawPowError::InvalidDagSize { size });
        }
        Ok(InMemoryDag { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Dag for InMemoryDag {
    fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn item(&self, index: u64) -> [u32; ITEM_WORDS] {
        let start = (index as usize) * ITEM_BYTES;
        let mut item = [0u32; ITEM_WORDS];
        LittleEndian::read_u32_into(&self.bytes[start..start + ITEM_BYTES], &mut item);
        item
    }

    fn cache_word(&self, word: usize) -> u32 {
        LittleEndian::read_u32(&self.bytes[word * 4..word * 4 + 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_dag(bytes: usize) -> InMemoryDag {
        let buf: Vec<u8> = (0..bytes).map(|i| (i % 256) as u8).collect();
        InMemoryDag::new(buf).unwrap()
    }

    #[test]
    fn rejects_sizes_not_multiple_of_64() {
        assert!(InMemoryDag::new(vec![0u8; CACHE_BYTES + 1]).is_err());
    }

    #[test]
    fn rejects_sizes_below_cache() {
        assert!(InMemoryDag::new(vec![0u8; 64]).is_err());
    }

    #[test]
    fn item_reads_little_endian_words() {
        let dag = filled_dag(CACHE_BYTES);
        let item = dag.item(0);
        assert_eq!(item[0], u32::from_le_bytes([0, 1, 2, 3]));
    }

    #[test]
    fn item_count_matches_size() {
        let dag = filled_dag(CACHE_BYTES * 2);
        assert_eq!(dag.item_count(), (CACHE_BYTES * 2) as u64 / ITEM_BYTES as u64);
    }
}
