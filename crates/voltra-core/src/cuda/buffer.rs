//! Device-resident buffers and host↔device transfer.
//!
//! A `DeviceBuffer<T>` owns its device storage exclusively; length is fixed
//! at construction. Storage is freed when the buffer drops, on every exit
//! path, and move semantics make use-after-release a compile error.
//! Transfer cost dominates for large vectors, so each harness operation
//! performs exactly one upload and one download.

use std::sync::Arc;

use cudarc::driver::{CudaDevice, CudaSlice, DevicePtr, DeviceRepr, ValidAsZeroBits};

use super::context::DeviceContext;
use crate::{GpuError, Result};

/// A fixed-length, contiguous device-resident array of `T`.
#[derive(Debug)]
pub struct DeviceBuffer<T> {
    dev: Arc<CudaDevice>,
    slice: CudaSlice<T>,
    len: usize,
}

impl<T: DeviceRepr + Unpin> DeviceBuffer<T> {
    /// Copy a host array into a new device buffer (one H2D copy).
    pub fn upload(ctx: &DeviceContext, host: &[T]) -> Result<Self> {
        let slice = ctx
            .device()
            .htod_sync_copy(host)
            .map_err(|e| GpuError::Transfer {
                op: "upload",
                len: host.len(),
                msg: e.to_string(),
            })?;
        Ok(Self {
            dev: Arc::clone(ctx.device()),
            slice,
            len: host.len(),
        })
    }

    /// Re-fill existing device storage from a host array of identical
    /// length. The buffer's length never changes.
    pub fn refill(&mut self, host: &[T]) -> Result<()> {
        if host.len() != self.len {
            return Err(GpuError::LengthMismatch {
                expected: self.len,
                actual: host.len(),
            });
        }
        self.dev
            .htod_sync_copy_into(host, &mut self.slice)
            .map_err(|e| GpuError::Transfer {
                op: "refill",
                len: self.len,
                msg: e.to_string(),
            })
    }

    /// Copy device storage into `dst` (one D2H copy). On a length mismatch
    /// the destination is left untouched.
    pub fn download_into(&self, dst: &mut [T]) -> Result<()> {
        if dst.len() != self.len {
            return Err(GpuError::LengthMismatch {
                expected: self.len,
                actual: dst.len(),
            });
        }
        self.dev
            .dtoh_sync_copy_into(&self.slice, dst)
            .map_err(|e| GpuError::Transfer {
                op: "download",
                len: self.len,
                msg: e.to_string(),
            })
    }

    /// Copy device storage into a fresh host vector.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.dev
            .dtoh_sync_copy(&self.slice)
            .map_err(|e| GpuError::Transfer {
                op: "download",
                len: self.len,
                msg: e.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying device slice, for kernel launches.
    pub fn as_device_slice(&self) -> &CudaSlice<T> {
        &self.slice
    }

    /// Raw device address. Opaque: valid only while this buffer is alive,
    /// must not be dereferenced host-side, only passed to kernel dispatch.
    pub fn device_ptr(&self) -> u64 {
        *self.slice.device_ptr()
    }

    /// Free device storage now. Consuming, so the address cannot be used
    /// after release.
    pub fn release(self) {}
}

impl<T: DeviceRepr + ValidAsZeroBits + Unpin> DeviceBuffer<T> {
    /// Allocate a zero-filled device buffer without an upload. Used for
    /// kernel outputs.
    pub fn zeroed(ctx: &DeviceContext, len: usize) -> Result<Self> {
        let slice = ctx
            .device()
            .alloc_zeros::<T>(len)
            .map_err(|e| GpuError::Transfer {
                op: "alloc",
                len,
                msg: e.to_string(),
            })?;
        Ok(Self {
            dev: Arc::clone(ctx.device()),
            slice,
            len,
        })
    }
}
