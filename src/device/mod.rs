//! The device abstraction (§9 design note): an opaque compute backend that
//! can run the §4.5 search dispatcher, plus the one concrete backend this
//! crate ships (`wgpu_backend::WgpuBackend`). A CUDA or OpenCL backend would
//! implement the same `Backend` trait without touching `progpow`/`search`.

pub mod shader;
pub mod wgpu_backend;

pub use wgpu_backend::WgpuBackend;

use crate::error::{KawPowError, Result};
use crate::progpow::dag::{CACHE_BYTES, ITEM_BYTES};
use crate::search::{SearchOutcome, SearchParams};

/// Reference launch shape (§6): 128 threads per block.
pub const REFERENCE_THREADS_PER_BLOCK: u32 = shader::WORKGROUP_SIZE;
/// Reference launch shape (§6): 3 nonces per thread.
pub const REFERENCE_NONCES_PER_THREAD: u32 = 3;

/// Validates the DAG-size precondition shared by every backend (§7):
/// `dag_size` must be a multiple of 64 bytes and at least 16 KiB, so the
/// hot-cache preload (§4.5, §5) is well-defined.
pub fn validate_dag_size(size_bytes: u64) -> Result<()> {
    if size_bytes % ITEM_BYTES as u64 != 0 || size_bytes < CACHE_BYTES as u64 {
        return Err(KawPowError::InvalidDagSize { size: size_bytes });
    }
    Ok(())
}

/// Anything capable of running the §4.5 search dispatcher on a device.
pub trait Backend {
    /// Runs one launch over `[params.start_nonce, params.start_nonce +
    /// params.range_len)` against `dag_bytes`, returning the first hit the
    /// device's CAS arbitration reports, or `None` if nothing in the range
    /// validated.
    fn search(&mut self, params: &SearchParams, dag_bytes: &[u8]) -> Result<SearchOutcome>;
}
