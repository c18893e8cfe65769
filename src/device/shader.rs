//! The WGSL compute shader implementing §4.5's search dispatcher: the same
//! Keccak-f[800] + mix-loop pipeline as `crate::progpow`, run once per GPU
//! invocation instead of once per host call.
//!
//! Mirrors the CPU reference module-for-module (primitives, KISS99,
//! Keccak-f[800], mix loop, final reduction) so a change to one must be
//! mirrored in the other; `tests/vectors.rs` pins the CPU side, this shader
//! has no toolchain in this environment to compile and run against it (see
//! DESIGN.md).

/// Threads per workgroup, matching `device::REFERENCE_THREADS_PER_BLOCK`.
pub const WORKGROUP_SIZE: u32 = 128;

pub const KAWPOW_SEARCH_SHADER: &str = r#"
const LANES: u32 = 16u;
const REGS: u32 = 32u;
const CNT_CACHE: u32 = 11u;
const CNT_MATH: u32 = 18u;
const CNT_DAG: u32 = 64u;
const CNT_DAG_LOOPS: u32 = 64u;
const CACHE_WORDS: u32 = 4096u;
const FNV_OFFSET_BASIS: u32 = 0x811c9dc5u;
const WORKGROUP_SIZE: u32 = 128u;
const CACHE_WORDS_PER_THREAD: u32 = 32u; // CACHE_WORDS / WORKGROUP_SIZE

struct Params {
    header: array<u32, 8>,
    target: array<u32, 8>,
    start_nonce_lo: u32,
    start_nonce_hi: u32,
    nonces_per_thread: u32,
    dag_item_count: u32,
    range_len: u32,
}

struct SearchResult {
    found: atomic<u32>,
    nonce_lo: u32,
    nonce_hi: u32,
    hash: array<u32, 8>,
    mix: array<u32, 8>,
}

@group(0) @binding(0) var<storage, read> params: Params;
@group(0) @binding(1) var<storage, read_write> result: SearchResult;
@group(0) @binding(2) var<storage, read> dag: array<u32>;

var<workgroup> cache: array<u32, 4096>;

// ---- 64-bit nonce arithmetic (two u32 words, low first) -------------------

fn add_u64(lo: u32, hi: u32, addend: u32) -> vec2<u32> {
    let new_lo = lo + addend;
    let carry = select(0u, 1u, new_lo < lo);
    return vec2<u32>(new_lo, hi + carry);
}

// ---- primitives -------------------------------------------------------------

fn fnv1a(h: u32, d: u32) -> u32 {
    return (h ^ d) * 0x01000193u;
}

fn rotl32(x: u32, n: u32) -> u32 {
    let nn = n & 31u;
    if (nn == 0u) { return x; }
    return (x << nn) | (x >> (32u - nn));
}

fn rotr32(x: u32, n: u32) -> u32 {
    let nn = n & 31u;
    if (nn == 0u) { return x; }
    return (x >> nn) | (x << (32u - nn));
}

// 32x32 -> high 32 bits of the 64-bit unsigned product, via 16-bit limbs
// (WGSL has no native 64-bit integer multiply).
fn umulhi(a: u32, b: u32) -> u32 {
    let a_lo = a & 0xFFFFu;
    let a_hi = a >> 16u;
    let b_lo = b & 0xFFFFu;
    let b_hi = b >> 16u;
    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;
    let cross = (lo_lo >> 16u) + (lo_hi & 0xFFFFu) + (hi_lo & 0xFFFFu);
    return hi_hi + (lo_hi >> 16u) + (hi_lo >> 16u) + (cross >> 16u);
}

fn random_math(a: u32, b: u32, r: u32) -> u32 {
    switch (r % 9u) {
        case 0u: { return a + b; }
        case 1u: { return a - b; }
        case 2u: { return a * b; }
        case 3u: { return umulhi(a, b); }
        case 4u: { return a ^ b; }
        case 5u: { return rotl32(a, b & 31u); }
        case 6u: { return rotr32(a, b & 31u); }
        case 7u: { return countOneBits(a); }
        default: { return countLeadingZeros(a); }
    }
}

fn random_merge(a: u32, b: u32, r: u32) -> u32 {
    switch (r % 5u) {
        case 0u: { return a + b; }
        case 1u: { return a * b; }
        case 2u: { return a & b; }
        case 3u: { return a | b; }
        default: { return a ^ b; }
    }
}

// ---- KISS99 -------------------------------------------------------------

struct Kiss99 {
    z: u32,
    w: u32,
    jsr: u32,
    jcong: u32,
}

fn kiss99_seeded(seed_lo: u32, seed_hi: u32, id: u32) -> Kiss99 {
    var h = FNV_OFFSET_BASIS;
    let z = fnv1a(h, seed_lo);
    h = z;
    let w = fnv1a(h, seed_hi);
    h = w;
    let jsr = fnv1a(h, id);
    h = jsr;
    let jcong = fnv1a(h, id + 1u);
    var st: Kiss99;
    st.z = z;
    st.w = w;
    st.jsr = jsr;
    st.jcong = jcong;
    return st;
}

fn kiss99_next(st: ptr<function, Kiss99>) -> u32 {
    (*st).z = 36969u * ((*st).z & 0xFFFFu) + ((*st).z >> 16u);
    (*st).w = 18000u * ((*st).w & 0xFFFFu) + ((*st).w >> 16u);
    (*st).jsr = (*st).jsr ^ ((*st).jsr << 17u);
    (*st).jsr = (*st).jsr ^ ((*st).jsr >> 13u);
    (*st).jsr = (*st).jsr ^ ((*st).jsr << 5u);
    (*st).jcong = (*st).jcong * 69069u + 1234567u;
    let mwc = ((*st).z << 16u) + (*st).w;
    return mwc ^ (*st).jcong ^ (*st).jsr;
}

// ---- Keccak-f[800] -------------------------------------------------------

fn keccakf_rndc() -> array<u32, 22> {
    var rc: array<u32, 22>;
    rc[0] = 0x00000001u;  rc[1] = 0x00008082u;  rc[2] = 0x0000808au;  rc[3] = 0x80008000u;
    rc[4] = 0x0000808bu;  rc[5] = 0x80000001u;  rc[6] = 0x80008081u;  rc[7] = 0x80008009u;
    rc[8] = 0x0000008au;  rc[9] = 0x00000088u;  rc[10] = 0x80008009u; rc[11] = 0x8000000au;
    rc[12] = 0x80008002u; rc[13] = 0x80008003u; rc[14] = 0x80008002u; rc[15] = 0x80000080u;
    rc[16] = 0x0000800au; rc[17] = 0x8000000au; rc[18] = 0x80008081u; rc[19] = 0x80008080u;
    rc[20] = 0x80000001u; rc[21] = 0x80008008u;
    return rc;
}

fn keccakf_rotc() -> array<u32, 24> {
    var rotc: array<u32, 24>;
    rotc[0]=1u;  rotc[1]=3u;  rotc[2]=6u;  rotc[3]=10u; rotc[4]=15u; rotc[5]=21u;
    rotc[6]=28u; rotc[7]=36u; rotc[8]=45u; rotc[9]=55u; rotc[10]=2u; rotc[11]=14u;
    rotc[12]=27u;rotc[13]=41u;rotc[14]=56u;rotc[15]=8u; rotc[16]=25u;rotc[17]=43u;
    rotc[18]=62u;rotc[19]=18u;rotc[20]=39u;rotc[21]=61u;rotc[22]=20u;rotc[23]=44u;
    return rotc;
}

fn keccakf_piln() -> array<u32, 24> {
    var piln: array<u32, 24>;
    piln[0]=10u; piln[1]=7u;  piln[2]=11u; piln[3]=17u; piln[4]=18u; piln[5]=3u;
    piln[6]=5u;  piln[7]=16u; piln[8]=8u;  piln[9]=21u; piln[10]=24u;piln[11]=4u;
    piln[12]=15u;piln[13]=23u;piln[14]=19u;piln[15]=13u;piln[16]=12u;piln[17]=2u;
    piln[18]=20u;piln[19]=14u;piln[20]=22u;piln[21]=9u; piln[22]=6u; piln[23]=1u;
    return piln;
}

fn keccak_f800_round(st: ptr<function, array<u32, 25>>, r: u32) {
    let rndc = keccakf_rndc();
    let rotc = keccakf_rotc();
    let piln = keccakf_piln();
    var bc: array<u32, 5>;

    for (var i = 0u; i < 5u; i = i + 1u) {
        bc[i] = (*st)[i] ^ (*st)[i + 5u] ^ (*st)[i + 10u] ^ (*st)[i + 15u] ^ (*st)[i + 20u];
    }
    for (var i = 0u; i < 5u; i = i + 1u) {
        let t = bc[(i + 4u) % 5u] ^ rotl32(bc[(i + 1u) % 5u], 1u);
        var j = 0u;
        loop {
            if (j >= 25u) { break; }
            (*st)[j + i] = (*st)[j + i] ^ t;
            j = j + 5u;
        }
    }

    var t = (*st)[1];
    for (var i = 0u; i < 24u; i = i + 1u) {
        let j = piln[i];
        let tmp = (*st)[j];
        (*st)[j] = rotl32(t, rotc[i]);
        t = tmp;
    }

    var j = 0u;
    loop {
        if (j >= 25u) { break; }
        bc[0] = (*st)[j];
        bc[1] = (*st)[j + 1u];
        bc[2] = (*st)[j + 2u];
        bc[3] = (*st)[j + 3u];
        bc[4] = (*st)[j + 4u];
        (*st)[j]      = (*st)[j]      ^ ((~bc[1]) & bc[2]);
        (*st)[j + 1u] = (*st)[j + 1u] ^ ((~bc[2]) & bc[3]);
        (*st)[j + 2u] = (*st)[j + 2u] ^ ((~bc[3]) & bc[4]);
        (*st)[j + 3u] = (*st)[j + 3u] ^ ((~bc[4]) & bc[0]);
        (*st)[j + 4u] = (*st)[j + 4u] ^ ((~bc[0]) & bc[1]);
        j = j + 5u;
    }

    (*st)[0] = (*st)[0] ^ rndc[r];
}

fn keccak_f800(st: ptr<function, array<u32, 25>>) {
    for (var r = 0u; r < 22u; r = r + 1u) {
        keccak_f800_round(st, r);
    }
}

// ---- mix loop -------------------------------------------------------------

fn fill_mix(seed_lo: u32, seed_hi: u32, lane_mixes: ptr<function, array<array<u32, 32>, 16>>) {
    for (var lane = 0u; lane < LANES; lane = lane + 1u) {
        var rng = kiss99_seeded(seed_lo, seed_hi, lane);
        for (var reg = 0u; reg < REGS; reg = reg + 1u) {
            (*lane_mixes)[lane][reg] = kiss99_next(&rng);
        }
    }
}

fn mix_loop(seed_lo: u32, seed_hi: u32, lane_mixes: ptr<function, array<array<u32, 32>, 16>>, dag_item_count: u32) {
    for (var loop_idx = 0u; loop_idx < CNT_DAG_LOOPS; loop_idx = loop_idx + 1u) {
        var mix: array<u32, 16>;
        for (var lane = 0u; lane < LANES; lane = lane + 1u) {
            var h = FNV_OFFSET_BASIS;
            for (var reg = 0u; reg < REGS; reg = reg + 1u) {
                h = fnv1a(h, (*lane_mixes)[lane][reg]);
            }
            mix[lane] = h;
        }

        var rng = kiss99_seeded(seed_lo, seed_hi, loop_idx);

        for (var c = 0u; c < CNT_CACHE; c = c + 1u) {
            let lane = kiss99_next(&rng) % LANES;
            let cache_idx = mix[lane] % CACHE_WORDS;
            let cache_val = cache[cache_idx];
            mix[lane] = random_merge(mix[lane], cache_val, kiss99_next(&rng));
        }

        for (var m = 0u; m < CNT_MATH; m = m + 1u) {
            let src1 = kiss99_next(&rng) % LANES;
            let src2 = kiss99_next(&rng) % LANES;
            let dst = kiss99_next(&rng) % LANES;
            let r = random_math(mix[src1], mix[src2], kiss99_next(&rng));
            mix[dst] = random_merge(mix[dst], r, kiss99_next(&rng));
        }

        for (var i = 0u; i < CNT_DAG; i = i + 1u) {
            let lane = i % LANES;
            let item_index = fnv1a(loop_idx, mix[lane]) % dag_item_count;
            let base = item_index * 16u;
            for (var k = 0u; k < LANES; k = k + 1u) {
                let word = dag[base + k];
                let dst_lane = (lane + k) % LANES;
                mix[dst_lane] = random_merge(mix[dst_lane], word, kiss99_next(&rng));
            }
        }

        for (var lane = 0u; lane < LANES; lane = lane + 1u) {
            for (var reg = 0u; reg < REGS; reg = reg + 1u) {
                (*lane_mixes)[lane][reg] = fnv1a((*lane_mixes)[lane][reg], mix[lane]);
            }
        }
    }
}

fn reduce_final_mix(lane_mixes: ptr<function, array<array<u32, 32>, 16>>) -> array<u32, 8> {
    var final_mix: array<u32, 8>;
    for (var i = 0u; i < 8u; i = i + 1u) {
        final_mix[i] = FNV_OFFSET_BASIS;
    }
    for (var lane = 0u; lane < LANES; lane = lane + 1u) {
        let slot = lane % 8u;
        final_mix[slot] = fnv1a(final_mix[slot], (*lane_mixes)[lane][0]);
    }
    return final_mix;
}

// ---- entry point -------------------------------------------------------------

@compute @workgroup_size(128)
fn kawpow_search(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(local_invocation_id) lid: vec3<u32>,
) {
    // Cooperative hot-cache preload: every thread in the block loads its
    // share of the first 16 KiB of DAG, then a barrier before any thread
    // reads the cache (§4.5, §5).
    for (var i = 0u; i < CACHE_WORDS_PER_THREAD; i = i + 1u) {
        let idx = lid.x * CACHE_WORDS_PER_THREAD + i;
        cache[idx] = dag[idx];
    }
    workgroupBarrier();

    let thread_id = gid.x;

    for (var k = 0u; k < params.nonces_per_thread; k = k + 1u) {
        // Warp-vote-style early exit: once any invocation has reported a
        // hit, stop issuing further work for this dispatch.
        if (atomicLoad(&result.found) != 0u) {
            return;
        }

        let thread_offset = thread_id * params.nonces_per_thread + k;
        if (thread_offset >= params.range_len) {
            return;
        }
        let nonce = add_u64(params.start_nonce_lo, params.start_nonce_hi, thread_offset);
        let nonce_lo = nonce.x;
        let nonce_hi = nonce.y;

        var st: array<u32, 25>;
        for (var i = 0u; i < 25u; i = i + 1u) {
            st[i] = 0u;
        }
        for (var i = 0u; i < 8u; i = i + 1u) {
            st[i] = params.header[i];
        }
        st[8] = nonce_lo;
        st[9] = nonce_hi;
        keccak_f800(&st);
        let seed_lo = st[0];
        let seed_hi = st[1];
        let seed_state = st;

        var lane_mixes: array<array<u32, 32>, 16>;
        fill_mix(seed_lo, seed_hi, &lane_mixes);
        mix_loop(seed_lo, seed_hi, &lane_mixes, params.dag_item_count);
        let final_mix = reduce_final_mix(&lane_mixes);

        var st2: array<u32, 25>;
        for (var i = 0u; i < 25u; i = i + 1u) {
            st2[i] = 0u;
        }
        for (var i = 0u; i < 8u; i = i + 1u) {
            st2[i] = final_mix[i];
        }
        for (var i = 0u; i < 8u; i = i + 1u) {
            st2[8u + i] = seed_state[i];
        }
        keccak_f800(&st2);

        var below = true;
        for (var idx = 0u; idx < 8u; idx = idx + 1u) {
            let i = 7u - idx;
            if (st2[i] < params.target[i]) {
                below = true;
                break;
            }
            if (st2[i] > params.target[i]) {
                below = false;
                break;
            }
        }

        if (below) {
            let won = atomicCompareExchangeWeak(&result.found, 0u, 1u);
            if (won.exchanged) {
                result.nonce_lo = nonce_lo;
                result.nonce_hi = nonce_hi;
                for (var i = 0u; i < 8u; i = i + 1u) {
                    result.hash[i] = st2[i];
                }
                for (var i = 0u; i < 8u; i = i + 1u) {
                    result.mix[i] = final_mix[i];
                }
            }
        }
    }
}
"#;
