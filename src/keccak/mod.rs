//! Keccak-f[800], the 25-word/32-bit-lane permutation used as both the
//! header-absorbing seed compressor and the digest-producing final
//! compressor.

pub mod f800;
pub mod round;

pub use f800::{final_keccak, seed_keccak};
pub use round::keccak_f800;
