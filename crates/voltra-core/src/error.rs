//! Error taxonomy for the harness.
//!
//! Every variant names the failing resource or operation so a benchmark
//! failure can be diagnosed from the error alone.

/// Errors surfaced by the device layer and the harness around it.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// No compatible accelerator, or driver/runtime init failed. Fatal.
    #[error("no CUDA device available: {0}")]
    DeviceUnavailable(String),

    /// The kernel module could not be read, parsed, or loaded — including
    /// a declared entry point missing from the binary.
    #[error("failed to load kernel module '{location}': {msg}")]
    ModuleLoad { location: String, msg: String },

    /// The named entry point was not declared in the loaded module. The
    /// module stays usable for its other entry points.
    #[error("kernel '{entry}' not found in module '{module}'")]
    SymbolNotFound { module: String, entry: String },

    /// Host↔device copy or device allocation failed (typically OOM).
    #[error("{op} failed for {len} elements: {msg}")]
    Transfer {
        op: &'static str,
        len: usize,
        msg: String,
    },

    /// Caller passed a host array whose length does not match the device
    /// buffer. Always a programming error; never retried.
    #[error("length mismatch: device side holds {expected} elements, host side has {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The dispatch itself was rejected (bad geometry, driver error).
    #[error("launch of kernel '{kernel}' failed: {msg}")]
    Launch { kernel: String, msg: String },

    /// The device reported a fault while executing the kernel. The context
    /// is not guaranteed valid afterwards; callers should re-create it.
    #[error("device fault while executing '{kernel}': {msg}")]
    DeviceExecution { kernel: String, msg: String },
}
