//! Paired device/host benchmark runs.
//!
//! The runner times the device closure and the host closure over identical
//! inputs and reports both results with wall-clock durations. Only the
//! operation's critical path is inside the timed window; module loading and
//! kernel resolution happen once per process, before any comparison.
//!
//! A failing device path propagates its error. There is no retry and no
//! silent fallback to the host result.

use std::time::{Duration, Instant};

use crate::Result;

/// Result agreement check with relative tolerance.
///
/// Integer results must match exactly; floating-point results compare with
/// `|a - b| <= tol * max(1, |b|)`, taking the host value as reference.
pub trait ResultTolerance {
    fn within(&self, reference: &Self, tol: f64) -> bool;
}

impl ResultTolerance for i32 {
    fn within(&self, reference: &Self, _tol: f64) -> bool {
        self == reference
    }
}

impl ResultTolerance for f32 {
    fn within(&self, reference: &Self, tol: f64) -> bool {
        let a = f64::from(*self);
        let b = f64::from(*reference);
        (a - b).abs() <= tol * b.abs().max(1.0)
    }
}

impl<T: ResultTolerance> ResultTolerance for Vec<T> {
    fn within(&self, reference: &Self, tol: f64) -> bool {
        self.len() == reference.len()
            && self
                .iter()
                .zip(reference.iter())
                .all(|(a, b)| a.within(b, tol))
    }
}

/// Outcome of one device-vs-host comparison.
#[derive(Debug, Clone)]
pub struct Comparison<R> {
    pub operation: String,
    pub device_result: R,
    pub host_result: R,
    pub device_time: Duration,
    pub host_time: Duration,
    /// Whether the two results agree within the runner's tolerance.
    pub agreed: bool,
}

impl<R> Comparison<R> {
    /// Host time over device time. Above 1.0 means the device won.
    pub fn speedup(&self) -> f64 {
        self.host_time.as_secs_f64() / self.device_time.as_secs_f64().max(f64::EPSILON)
    }
}

/// Drives paired device/host computations over identical inputs.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkRunner {
    tolerance: f64,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRunner {
    /// Runner with the default 1e-4 relative tolerance.
    pub fn new() -> Self {
        Self { tolerance: 1e-4 }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Run the device path and the host path, timing each.
    ///
    /// `device_op` is expected to upload inputs, dispatch, and download —
    /// exactly one round-trip; `host_op` computes the same result with host
    /// arithmetic only. Both must be deterministic for identical inputs.
    pub fn compare<R, D, H>(&self, operation: &str, device_op: D, host_op: H) -> Result<Comparison<R>>
    where
        R: ResultTolerance,
        D: FnOnce() -> Result<R>,
        H: FnOnce() -> R,
    {
        let start = Instant::now();
        let device_result = device_op()?;
        let device_time = start.elapsed();

        let start = Instant::now();
        let host_result = host_op();
        let host_time = start.elapsed();

        let agreed = device_result.within(&host_result, self.tolerance);
        Ok(Comparison {
            operation: operation.to_string(),
            device_result,
            host_result,
            device_time,
            host_time,
            agreed,
        })
    }
}
