//! Precompiled kernel module loading and entry-point resolution.
//!
//! The module location points at a PTX file produced by a separate
//! compilation step (`nvcc --ptx`); no source compilation happens here.
//! Entry points are declared at load time and resolved by name afterwards.
//! Resolution allocates driver-internal state, so resolved functions are
//! cached and reused across dispatches.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use cudarc::driver::{CudaDevice, CudaFunction};
use cudarc::nvrtc::Ptx;
use parking_lot::Mutex;

use super::context::DeviceContext;
use crate::{GpuError, LaunchGeometry, Result};

/// A named entry point bound to fixed launch geometry.
///
/// Immutable after resolution; owns no device memory. Cheap to clone — the
/// underlying function handle is reference-counted by the driver wrapper.
#[derive(Debug, Clone)]
pub struct KernelHandle {
    pub(crate) name: String,
    pub(crate) func: CudaFunction,
    pub(crate) geometry: LaunchGeometry,
}

impl KernelHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> LaunchGeometry {
        self.geometry
    }
}

/// A loaded PTX module and its resolvable entry points.
pub struct KernelModule {
    dev: Arc<CudaDevice>,
    name: String,
    entries: Vec<&'static str>,
    resolved: Mutex<HashMap<String, CudaFunction>>,
}

impl KernelModule {
    /// Load a precompiled PTX file and register its entry points.
    ///
    /// A declared entry point missing from the binary is a load-time
    /// failure, not a runtime one.
    pub fn load(
        ctx: &DeviceContext,
        location: &Path,
        entries: &[&'static str],
    ) -> Result<Self> {
        let name = location.display().to_string();
        let src = std::fs::read_to_string(location).map_err(|e| GpuError::ModuleLoad {
            location: name.clone(),
            msg: e.to_string(),
        })?;
        ctx.device()
            .load_ptx(Ptx::from_src(src), &name, entries)
            .map_err(|e| GpuError::ModuleLoad {
                location: name.clone(),
                msg: e.to_string(),
            })?;
        Ok(Self {
            dev: Arc::clone(ctx.device()),
            name,
            entries: entries.to_vec(),
            resolved: Mutex::new(HashMap::new()),
        })
    }

    /// Module identifier (the location it was loaded from).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry points declared at load time.
    pub fn entries(&self) -> &[&'static str] {
        &self.entries
    }

    /// Resolve a declared entry point into an invocable handle with fixed
    /// launch geometry.
    ///
    /// An unknown name fails with `SymbolNotFound`; the module stays usable
    /// for its other entry points.
    pub fn resolve(&self, entry: &str, geometry: LaunchGeometry) -> Result<KernelHandle> {
        let mut cache = self.resolved.lock();
        let func = match cache.get(entry) {
            Some(f) => f.clone(),
            None => {
                let f = self.dev.get_func(&self.name, entry).ok_or_else(|| {
                    GpuError::SymbolNotFound {
                        module: self.name.clone(),
                        entry: entry.to_string(),
                    }
                })?;
                cache.insert(entry.to_string(), f.clone());
                f
            }
        };
        Ok(KernelHandle {
            name: entry.to_string(),
            func,
            geometry,
        })
    }
}
