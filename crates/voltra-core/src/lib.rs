//! # voltra-core
//!
//! GPU vector-compute harness built on `cudarc`.
//!
//! Provides:
//! - Device context management and precompiled PTX module loading
//! - Typed device buffers with explicit host↔device transfer
//! - Blocking kernel dispatch with fixed launch geometry
//! - Serial host reference implementations of every device operation
//! - A benchmark runner that times paired device/host runs and checks
//!   they agree within tolerance
//!
//! The CUDA backend is behind the `cuda` feature; the host path, launch
//! geometry math, and benchmark runner build everywhere.

pub mod bench;
pub mod error;
pub mod host;
pub mod launch;

#[cfg(feature = "cuda")]
pub mod cuda;

pub use bench::{BenchmarkRunner, Comparison};
pub use error::GpuError;
pub use launch::LaunchGeometry;

pub type Result<T> = std::result::Result<T, GpuError>;
