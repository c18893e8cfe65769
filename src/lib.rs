//! # kawpow_core
//!
//! The core of a GPU-accelerated KawPow/ProgPoW proof-of-work search
//! engine: the KISS99 PRNG, the Keccak-f\[800\] permutation, the ProgPoW
//! mix loop, and a `wgpu` search dispatcher that runs all three over a
//! nonce range and reports the first hit against a target.
//!
//! ## Scope
//! This crate owns the hash pipeline and the device dispatch. DAG
//! generation, job scheduling across multiple launches, and result
//! persistence are external collaborators (see [`search`] and [`device`]
//! for the byte layout and polling contract they integrate against).
//!
//! ## Layout
//! - [`primitives`] — FNV-1a folding, rotations, bit counts.
//! - [`kiss99`] — the per-lane PRNG the mix loop draws sequences from.
//! - [`keccak`] — Keccak-f\[800\], used for both the seed and the final hash.
//! - [`progpow`] — the DAG abstraction, the mix loop, and the hash pipeline
//!   tying the above together.
//! - [`search`] — launch parameters and the CPU reference dispatcher.
//! - [`device`] — the `Backend` trait and the `wgpu` GPU implementation.
//! - [`types`] — fixed-size newtypes for headers, targets, and digests.
//! - [`error`] — the host-side precondition error type.

pub mod device;
pub mod error;
pub mod keccak;
pub mod kiss99;
pub mod primitives;
pub mod progpow;
pub mod search;
pub mod types;

pub use device::{Backend, WgpuBackend};
pub use error::{KawPowError, Result};
pub use progpow::{progpow_hash, Dag, InMemoryDag};
pub use search::{search_range_cpu, split_range, SearchHit, SearchOutcome, SearchParams};
pub use types::{Digest, Header, MixHash, Target};
