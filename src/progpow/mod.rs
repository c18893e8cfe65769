//! The ProgPoW/KawPow mix loop and its supporting DAG abstraction, and the
//! top-level hash pipeline that ties it to Keccak-f[800].

pub mod dag;
pub mod hash;
pub mod mix;

pub use dag::{Dag, InMemoryDag};
pub use hash::progpow_hash;
