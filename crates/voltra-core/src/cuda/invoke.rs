//! Blocking kernel dispatch.
//!
//! One dispatch in flight at a time: `run` launches the kernel and then
//! synchronizes, so on return every output buffer referenced by the
//! argument tuple holds its new values. Argument binding order must match
//! the entry point's declared parameter order; kinds and count are checked
//! by the type system at the call site via the `LaunchAsync` tuple impls.

use std::sync::Arc;

use cudarc::driver::{CudaDevice, CudaFunction, LaunchAsync};

use super::context::DeviceContext;
use super::registry::KernelHandle;
use crate::{GpuError, Result};

/// Dispatches resolved kernels against device buffers and scalars.
#[derive(Debug, Clone)]
pub struct KernelInvoker {
    dev: Arc<CudaDevice>,
}

impl KernelInvoker {
    pub fn new(ctx: &DeviceContext) -> Self {
        Self {
            dev: Arc::clone(ctx.device()),
        }
    }

    /// Launch `kernel` with its fixed geometry and block until the device
    /// signals completion.
    ///
    /// A rejected launch is `Launch`; a fault surfacing during execution is
    /// `DeviceExecution`, after which the context should be treated as
    /// failed and re-created.
    pub fn run<Params>(&self, kernel: &KernelHandle, params: Params) -> Result<()>
    where
        CudaFunction: LaunchAsync<Params>,
    {
        let cfg = kernel.geometry.to_launch_config();
        // Safety: the argument tuple matches the entry point's declared
        // parameter order, and every buffer argument outlives the
        // synchronize below.
        unsafe { kernel.func.clone().launch(cfg, params) }.map_err(|e| GpuError::Launch {
            kernel: kernel.name.clone(),
            msg: e.to_string(),
        })?;
        self.dev
            .synchronize()
            .map_err(|e| GpuError::DeviceExecution {
                kernel: kernel.name.clone(),
                msg: e.to_string(),
            })
    }
}
