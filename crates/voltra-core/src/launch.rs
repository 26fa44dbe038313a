//! Launch geometry for 1D kernel dispatch.
//!
//! The grid is fixed when a kernel is resolved and never retuned. The host
//! side guarantees the grid covers the vector (ceiling division, including
//! a partial final block); kernels bounds-check their global index against
//! the true element count, so an overshooting grid is harmless.

use crate::{GpuError, Result};

/// (threads-per-block, blocks-per-grid) pair for a 1D dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub threads_per_block: u32,
    pub blocks_per_grid: u32,
}

impl LaunchGeometry {
    /// Both dimensions must be positive.
    pub fn new(threads_per_block: u32, blocks_per_grid: u32) -> Result<Self> {
        if threads_per_block == 0 || blocks_per_grid == 0 {
            return Err(GpuError::Launch {
                kernel: String::new(),
                msg: format!(
                    "launch geometry must be positive, got {threads_per_block}x{blocks_per_grid}"
                ),
            });
        }
        Ok(Self {
            threads_per_block,
            blocks_per_grid,
        })
    }

    /// Smallest grid of `threads_per_block`-sized blocks covering `len`
    /// elements. A zero-length vector still gets one block so the dispatch
    /// is valid.
    pub fn for_len(len: usize, threads_per_block: u32) -> Result<Self> {
        if threads_per_block == 0 {
            return Err(GpuError::Launch {
                kernel: String::new(),
                msg: "threads_per_block must be positive".to_string(),
            });
        }
        let blocks = len.div_ceil(threads_per_block as usize).max(1);
        Ok(Self {
            threads_per_block,
            blocks_per_grid: blocks as u32,
        })
    }

    /// Total threads issued by one dispatch.
    pub fn total_threads(&self) -> usize {
        self.threads_per_block as usize * self.blocks_per_grid as usize
    }

    /// Whether the grid issues at least one thread per element.
    pub fn covers(&self, len: usize) -> bool {
        self.total_threads() >= len
    }

    #[cfg(feature = "cuda")]
    pub(crate) fn to_launch_config(self) -> cudarc::driver::LaunchConfig {
        cudarc::driver::LaunchConfig {
            grid_dim: (self.blocks_per_grid, 1, 1),
            block_dim: (self.threads_per_block, 1, 1),
            shared_mem_bytes: 0,
        }
    }
}
