//! The two Keccak-f[800] invocations the hash pipeline makes per nonce: the
//! seed compressor (header ‖ nonce ‖ zero-pad) and the final compressor
//! (mix ‖ seed-state ‖ zero-pad).

use crate::keccak::round::keccak_f800;
use crate::primitives::{higher32, lower32};

/// Packs `header[0..8]`, `low32(nonce)`, `high32(nonce)`, and zero-pads the
/// rest, runs the full 22-round permutation, and returns both the 64-bit
/// seed (`state[0] << 32 | state[1]`) and the resulting 25-word state (the
/// latter is reused verbatim as the second half of the final-Keccak input).
pub fn seed_keccak(header_words: &[u32; 8], nonce: u64) -> (u64, [u32; 25]) {
    let mut st = [0u32; 25];
    st[0..8].copy_from_slice(header_words);
    st[8] = lower32(nonce);
    st[9] = higher32(nonce);

    keccak_f800(&mut st);

    let seed = ((st[0] as u64) << 32) | (st[1] as u64);
    (seed, st)
}

/// Packs `final_mix[0..8]`, `seed_state[0..8]`, and zero-pads the rest, runs
/// the full 22-round permutation, and returns the first 8 words of the
/// resulting state — the 256-bit digest, little-endian word order.
pub fn final_keccak(final_mix: &[u32; 8], seed_state: &[u32; 25]) -> [u32; 8] {
    let mut st = [0u32; 25];
    st[0..8].copy_from_slice(final_mix);
    st[8..16].copy_from_slice(&seed_state[0..8]);

    keccak_f800(&mut st);

    let mut digest = [0u32; 8];
    digest.copy_from_slice(&st[0..8]);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_keccak_is_deterministic() {
        let header = [1, 2, 3, 4, 5, 6, 7, 8];
        let (seed_a, _) = seed_keccak(&header, 42);
        let (seed_b, _) = seed_keccak(&header, 42);
        assert_eq!(seed_a, seed_b);
    }

    #[test]
    fn different_nonces_diverge() {
        let header = [0u32; 8];
        let (seed_a, _) = seed_keccak(&header, 1);
        let (seed_b, _) = seed_keccak(&header, 2);
        assert_ne!(seed_a, seed_b);
    }

    #[test]
    fn final_keccak_is_deterministic() {
        let (_, seed_state) = seed_keccak(&[0u32; 8], 7);
        let mix = [9u32; 8];
        let a = final_keccak(&mix, &seed_state);
        let b = final_keccak(&mix, &seed_state);
        assert_eq!(a, b);
    }
}
