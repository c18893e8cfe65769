//! Host-side precondition errors.
//!
//! The hash pipeline and mix loop (`primitives`, `kiss99`, `keccak`,
//! `progpow`) have no recoverable error states of their own: every index is
//! reduced modulo a derived capacity before use, so nothing in those modules
//! can go out of bounds. Everything in this enum is a precondition that the
//! host-side launcher (`search`, `device`) checks before handing inputs to
//! the pipeline.

use thiserror::Error;

/// Errors surfaced at the host/device boundary, never from inside the mix
/// loop itself.
#[derive(Debug, Error)]
pub enum KawPowError {
    /// `header_len != 32`.
    #[error("header must be exactly 32 bytes, got {got}")]
    InvalidHeaderLength { got: usize },

    /// `dag_size` is not a multiple of 64, or is smaller than the 16 KiB
    /// hot-cache preload requires.
    #[error("dag_size {size} must be a multiple of 64 and at least 16384 bytes")]
    InvalidDagSize { size: u64 },

    /// Device-memory allocation or host<->device transfer failed.
    #[error("device memory error: {0}")]
    DeviceMemory(String),

    /// Kernel launch was refused (adapter/device acquisition, shader
    /// compilation, or queue submission failure).
    #[error("launch failure: {0}")]
    LaunchFailure(String),
}

pub type Result<T> = std::result::Result<T, KawPowError>;
