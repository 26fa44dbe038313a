//! CUDA backend for the harness.
//!
//! Provides:
//! - Device context management (`cudarc` driver API)
//! - Precompiled PTX module loading and entry-point resolution
//! - Typed device buffers with explicit host↔device transfer
//! - Blocking kernel dispatch and the five vector operations

pub mod buffer;
pub mod context;
pub mod invoke;
pub mod ops;
pub mod registry;

pub use buffer::DeviceBuffer;
pub use context::DeviceContext;
pub use invoke::KernelInvoker;
pub use ops::VectorKernels;
pub use registry::{KernelHandle, KernelModule};
