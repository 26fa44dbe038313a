//! CUDA device context management.
//!
//! One `DeviceContext` per process owns the connection to the accelerator.
//! Kernels and buffers created through it each hold their own `Arc` to the
//! underlying device, so teardown is safe on every exit path regardless of
//! drop order. Uses `cudarc` for safe CUDA driver API access.

use std::sync::Arc;

use cudarc::driver::CudaDevice;

use crate::{GpuError, Result};

/// Open connection to a CUDA device.
#[derive(Debug)]
pub struct DeviceContext {
    dev: Arc<CudaDevice>,
    ordinal: usize,
}

impl DeviceContext {
    /// Open the default device (ordinal 0).
    pub fn open() -> Result<Self> {
        Self::open_ordinal(0)
    }

    /// Open a specific device by ordinal.
    pub fn open_ordinal(ordinal: usize) -> Result<Self> {
        let dev = CudaDevice::new(ordinal)
            .map_err(|e| GpuError::DeviceUnavailable(format!("device {ordinal}: {e}")))?;
        Ok(Self { dev, ordinal })
    }

    /// Whether any CUDA device can be initialized.
    pub fn is_available() -> bool {
        CudaDevice::new(0).is_ok()
    }

    /// Number of usable CUDA devices.
    pub fn device_count() -> usize {
        (0..16).take_while(|&i| CudaDevice::new(i).is_ok()).count()
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Device name as reported by the driver.
    pub fn name(&self) -> Result<String> {
        self.dev
            .name()
            .map_err(|e| GpuError::DeviceUnavailable(e.to_string()))
    }

    /// Block until all work issued to the device has completed.
    pub fn synchronize(&self) -> Result<()> {
        self.dev.synchronize().map_err(|e| GpuError::DeviceExecution {
            kernel: String::new(),
            msg: e.to_string(),
        })
    }

    /// Release the context. Consuming, so a closed context cannot be used
    /// again; resources that hold their own device handle outlive it safely.
    pub fn close(self) {}

    pub(crate) fn device(&self) -> &Arc<CudaDevice> {
        &self.dev
    }
}
