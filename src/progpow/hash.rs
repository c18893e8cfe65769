//! Top-level hash pipeline: seed Keccak → mix loop → final reduction →
//! final Keccak. The single function every test oracle and search
//! dispatcher calls per nonce.

use crate::keccak::f800::{final_keccak, seed_keccak};
use crate::progpow::dag::Dag;
use crate::progpow::mix::{fill_mix, mix_loop, reduce_final_mix};
use crate::types::{Digest, Header, MixHash};

/// Computes the KawPow hash of `(header, nonce, dag)`.
///
/// Pure function of its arguments (§3 invariant): two calls with identical
/// inputs always produce identical output (§8 property 1).
pub fn progpow_hash(header: &Header, nonce: u64, dag: &dyn Dag) -> (Digest, MixHash) {
    let (seed, seed_state) = seed_keccak(&header.words(), nonce);

    let mut lane_mixes = fill_mix(seed);
    mix_loop(seed, &mut lane_mixes, dag);

    let final_mix = reduce_final_mix(&lane_mixes);
    let digest_words = final_keccak(&final_mix, &seed_state);

    (Digest(digest_words), MixHash(final_mix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progpow::dag::InMemoryDag;

    fn test_dag() -> InMemoryDag {
        let bytes: Vec<u8> = (0..(1024 * 1024usize))
            .map(|i| ((i as u32).wrapping_mul(0x0100_0193)) as u8)
            .collect();
        InMemoryDag::new(bytes).unwrap()
    }

    /// §8 property 1: determinism.
    #[test]
    fn determinism_is_stable() {
        let dag = test_dag();
        let header = Header([0u8; 32]);
        let (d1, m1) = progpow_hash(&header, 0x1234_5678_9abc_def0, &dag);
        let (d2, m2) = progpow_hash(&header, 0x1234_5678_9abc_def0, &dag);
        assert_eq!(d1, d2);
        assert_eq!(m1, m2);
    }

    #[test]
    fn different_nonces_produce_different_digests() {
        let dag = test_dag();
        let header = Header([0u8; 32]);
        let (d1, _) = progpow_hash(&header, 1, &dag);
        let (d2, _) = progpow_hash(&header, 2, &dag);
        assert_ne!(d1, d2);
    }

    #[test]
    fn different_headers_produce_different_digests() {
        let dag = test_dag();
        let (d1, _) = progpow_hash(&Header([0u8; 32]), 1, &dag);
        let (d2, _) = progpow_hash(&Header([1u8; 32]), 1, &dag);
        assert_ne!(d1, d2);
    }
}
