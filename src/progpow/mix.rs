//! The per-nonce mix loop: 64 outer iterations over a 16-lane × 32-register
//! mix state, each performing cache mixes, random math, and DAG mixes.
//!
//! This is the hard part of the pipeline (§4.4) and the one place the
//! reference spec's variant diverges from historical ProgPoW/KawPow
//! revisions: the per-lane scalar folding in step (a)/(f) below and the
//! 9-way `random_math` / 5-way `random_merge` tables are this crate's
//! mandated forms, not the upstream 11-way/4-way ones. See DESIGN.md.

use crate::kiss99::Kiss99State;
use crate::primitives::{clz32, fnv1a, popcount32, rotl32, rotr32, umulhi, FNV_OFFSET_BASIS};
use crate::progpow::dag::{Dag, CACHE_WORDS};

/// Parallel mix lanes.
pub const LANES: usize = 16;
/// Registers per lane.
pub const REGS: usize = 32;
/// Outer loop iterations per nonce.
pub const CNT_DAG_LOOPS: usize = 64;
/// Cache mixes per outer iteration.
pub const CNT_CACHE: usize = 11;
/// Random math ops per outer iteration.
pub const CNT_MATH: usize = 18;
/// DAG mixes per outer iteration (also the inner iteration count of step e).
pub const CNT_DAG: usize = 64;
/// DAG words consumed per DAG mix item.
pub const DAG_LOADS: usize = 4;

/// `lane_mixes[lane][reg]`, the 512-word persistent per-nonce mix state.
pub type LaneMixes = [[u32; REGS]; LANES];

/// Selects one of 9 math operations by `r % 9`.
fn random_math(a: u32, b: u32, r: u32) -> u32 {
    match r % 9 {
        0 => a.wrapping_add(b),
        1 => a.wrapping_sub(b),
        2 => a.wrapping_mul(b),
        3 => umulhi(a, b),
        4 => a ^ b,
        5 => rotl32(a, b & 31),
        6 => rotr32(a, b & 31),
        7 => popcount32(a),
        8 => clz32(a),
        _ => unreachable!(),
    }
}

/// Selects one of 5 merge operations by `r % 5`.
fn random_merge(a: u32, b: u32, r: u32) -> u32 {
    match r % 5 {
        0 => a.wrapping_add(b),
        1 => a.wrapping_mul(b),
        2 => a & b,
        3 => a | b,
        4 => a ^ b,
        _ => unreachable!(),
    }
}

/// Seeds `lane_mixes` by filling each lane's 32 registers from its own
/// KISS99 stream, seeded from `(seed, lane_id)`.
pub fn fill_mix(seed: u64) -> LaneMixes {
    let mut lane_mixes = [[0u32; REGS]; LANES];
    for (lane, regs) in lane_mixes.iter_mut().enumerate() {
        let mut rng = Kiss99State::seeded(seed, lane as u32);
        for reg in regs.iter_mut() {
            *reg = rng.next_u32();
        }
    }
    lane_mixes
}

/// Runs the 64 outer iterations of the mix loop over `lane_mixes` in place.
pub fn mix_loop(seed: u64, lane_mixes: &mut LaneMixes, dag: &dyn Dag) {
    let item_count = dag.item_count();

    for loop_idx in 0..CNT_DAG_LOOPS as u32 {
        // (a) per-lane scalar folded from that lane's registers.
        let mut mix = [0u32; LANES];
        for (lane, scalar) in mix.iter_mut().enumerate() {
            let mut h = FNV_OFFSET_BASIS;
            for reg in lane_mixes[lane] {
                fnv1a(&mut h, reg);
            }
            *scalar = h;
        }

        // (b) loop-local KISS99 stream.
        let mut rng = Kiss99State::seeded(seed, loop_idx);

        // (c) cache mixes.
        for _ in 0..CNT_CACHE {
            let lane = (rng.next_u32() as usize) % LANES;
            let cache_val = dag.cache_word((mix[lane] as usize) % CACHE_WORDS);
            mix[lane] = random_merge(mix[lane], cache_val, rng.next_u32());
        }

        // (d) random math ops.
        for _ in 0..CNT_MATH {
            let src1 = (rng.next_u32() as usize) % LANES;
            let src2 = (rng.next_u32() as usize) % LANES;
            let dst = (rng.next_u32() as usize) % LANES;
            let r = random_math(mix[src1], mix[src2], rng.next_u32());
            mix[dst] = random_merge(mix[dst], r, rng.next_u32());
        }

        // (e) DAG mixes.
        for i in 0..CNT_DAG as u32 {
            let lane = i as usize % LANES;
            let mut h = loop_idx;
            fnv1a(&mut h, mix[lane]);
            let item_index = (h as u64) % item_count;
            let item = dag.item(item_index);
            for k in 0..LANES {
                let dst_lane = (lane + k) % LANES;
                mix[dst_lane] = random_merge(mix[dst_lane], item[k], rng.next_u32());
            }
        }

        // (f) fold the per-lane scalar back into every register.
        for (lane, regs) in lane_mixes.iter_mut().enumerate() {
            for reg in regs.iter_mut() {
                *reg = fnv1a(reg, mix[lane]);
            }
        }
    }
}

/// Final reduction: fold register 0 of every lane into 8 running FNV hashes.
pub fn reduce_final_mix(lane_mixes: &LaneMixes) -> [u32; 8] {
    let mut final_mix = [FNV_OFFSET_BASIS; 8];
    for (lane, regs) in lane_mixes.iter().enumerate() {
        let slot = lane % 8;
        fnv1a(&mut final_mix[slot], regs[0]);
    }
    final_mix
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

    #[test]
    fn fill_mix_distinguishes_lanes() {
        let lane_mixes = fill_mix(0x1234_5678_9abc_def0);
        assert_ne!(lane_mixes[0], lane_mixes[1]);
    }

    #[test]
    fn mix_loop_is_deterministic() {
        let dag = test_dag();
        let mut a = fill_mix(7);
        let mut b = fill_mix(7);
        mix_loop(7, &mut a, &dag);
        mix_loop(7, &mut b, &dag);
        assert_eq!(a, b);
    }

    #[test]
    fn mix_loop_changes_state() {
        let dag = test_dag();
        let mut lane_mixes = fill_mix(7);
        let before = lane_mixes;
        mix_loop(7, &mut lane_mixes, &dag);
        assert_ne!(lane_mixes, before);
    }

    #[test]
    fn random_math_table_has_nine_arms() {
        // every residue 0..9 must be reachable and the table must not panic
        for r in 0..9u32 {
            let _ = random_math(1, 2, r);
        }
    }

    #[test]
    fn random_merge_table_has_five_arms() {
        for r in 0..5u32 {
            let _ = random_merge(1, 2, r);
        }
    }
}
