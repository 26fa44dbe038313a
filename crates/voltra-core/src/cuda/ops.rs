//! The five vector operations, dispatched through resolved kernel handles.
//!
//! `VectorKernels` resolves every entry point once at load time and reuses
//! the handles across dispatches. Geometry is derived from the bound vector
//! length with ceiling division; kernels bounds-check their global index
//! against the true element count, so the final partial block is harmless.
//!
//! Each operation performs exactly one upload per input and one download.

use std::path::Path;

use super::buffer::DeviceBuffer;
use super::context::DeviceContext;
use super::invoke::KernelInvoker;
use super::registry::{KernelHandle, KernelModule};
use crate::{GpuError, LaunchGeometry, Result};

/// Entry points the precompiled module must export, by exact name.
pub const FILL_ENTRY: &str = "fill_i32";
pub const SCALE_ENTRY: &str = "scale_i32";
pub const ADD_SCALAR_ENTRY: &str = "add_scalar_i32";
pub const DOT_ENTRY: &str = "dot_partial_f32";
pub const SUM_ENTRY: &str = "sum_partial_f32";

pub const ENTRY_POINTS: &[&str] = &[
    FILL_ENTRY,
    SCALE_ENTRY,
    ADD_SCALAR_ENTRY,
    DOT_ENTRY,
    SUM_ENTRY,
];

pub const DEFAULT_THREADS_PER_BLOCK: u32 = 1024;

/// The harness kernels, resolved once against a fixed vector length.
pub struct VectorKernels {
    invoker: KernelInvoker,
    fill: KernelHandle,
    scale: KernelHandle,
    add_scalar: KernelHandle,
    dot: KernelHandle,
    sum: KernelHandle,
    len: usize,
    /// One partial sum per block for the reduction kernels.
    partials: usize,
}

impl VectorKernels {
    /// Load the module at `location` and resolve all five entry points for
    /// vectors of exactly `len` elements.
    ///
    /// The reduction kernels do a shared-memory tree reduction, so
    /// `threads_per_block` must be a power of two no larger than 1024.
    pub fn load(
        ctx: &DeviceContext,
        location: &Path,
        len: usize,
        threads_per_block: u32,
    ) -> Result<Self> {
        if !threads_per_block.is_power_of_two() || threads_per_block > 1024 {
            return Err(GpuError::Launch {
                kernel: String::new(),
                msg: format!(
                    "threads_per_block must be a power of two <= 1024, got {threads_per_block}"
                ),
            });
        }
        let module = KernelModule::load(ctx, location, ENTRY_POINTS)?;
        let geometry = LaunchGeometry::for_len(len, threads_per_block)?;
        Ok(Self {
            invoker: KernelInvoker::new(ctx),
            fill: module.resolve(FILL_ENTRY, geometry)?,
            scale: module.resolve(SCALE_ENTRY, geometry)?,
            add_scalar: module.resolve(ADD_SCALAR_ENTRY, geometry)?,
            dot: module.resolve(DOT_ENTRY, geometry)?,
            sum: module.resolve(SUM_ENTRY, geometry)?,
            len,
            partials: geometry.blocks_per_grid as usize,
        })
    }

    /// Vector length these kernels are bound to.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.len {
            return Err(GpuError::LengthMismatch {
                expected: self.len,
                actual,
            });
        }
        Ok(())
    }

    /// Device fill: every element set to `value`. No upload needed; the
    /// output buffer is allocated on device and downloaded once.
    pub fn fill(&self, ctx: &DeviceContext, value: i32) -> Result<Vec<i32>> {
        let out = DeviceBuffer::<i32>::zeroed(ctx, self.len)?;
        self.invoker.run(
            &self.fill,
            (self.len as u32, out.as_device_slice(), value),
        )?;
        out.to_vec()
    }

    /// Device element-wise multiply by `factor`.
    pub fn scale(&self, ctx: &DeviceContext, v: &[i32], factor: i32) -> Result<Vec<i32>> {
        self.check_len(v.len())?;
        let buf = DeviceBuffer::upload(ctx, v)?;
        self.invoker.run(
            &self.scale,
            (self.len as u32, buf.as_device_slice(), factor),
        )?;
        buf.to_vec()
    }

    /// Device element-wise add of `addend`.
    pub fn add_scalar(&self, ctx: &DeviceContext, v: &[i32], addend: i32) -> Result<Vec<i32>> {
        self.check_len(v.len())?;
        let buf = DeviceBuffer::upload(ctx, v)?;
        self.invoker.run(
            &self.add_scalar,
            (self.len as u32, buf.as_device_slice(), addend),
        )?;
        buf.to_vec()
    }

    /// Device dot product. The kernel writes one partial sum per block;
    /// the short partial vector is finished on the host.
    pub fn dot(&self, ctx: &DeviceContext, a: &[f32], b: &[f32]) -> Result<f32> {
        self.check_len(a.len())?;
        self.check_len(b.len())?;
        let da = DeviceBuffer::upload(ctx, a)?;
        let db = DeviceBuffer::upload(ctx, b)?;
        let partial = DeviceBuffer::<f32>::zeroed(ctx, self.partials)?;
        self.invoker.run(
            &self.dot,
            (
                self.len as u32,
                da.as_device_slice(),
                db.as_device_slice(),
                partial.as_device_slice(),
            ),
        )?;
        Ok(partial.to_vec()?.iter().sum())
    }

    /// Device reduction sum, finished on the host like `dot`.
    pub fn sum(&self, ctx: &DeviceContext, v: &[f32]) -> Result<f32> {
        self.check_len(v.len())?;
        let buf = DeviceBuffer::upload(ctx, v)?;
        let partial = DeviceBuffer::<f32>::zeroed(ctx, self.partials)?;
        self.invoker.run(
            &self.sum,
            (
                self.len as u32,
                buf.as_device_slice(),
                partial.as_device_slice(),
            ),
        )?;
        Ok(partial.to_vec()?.iter().sum())
    }
}
