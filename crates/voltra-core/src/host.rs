//! Serial host reference implementations.
//!
//! One function per device kernel, computing the same result with plain
//! loops. The benchmark runner pits these against the device path; the
//! GPU tests use them as the source of truth.

use crate::{GpuError, Result};

/// Vector of `len` copies of `value`.
pub fn fill(len: usize, value: i32) -> Vec<i32> {
    vec![value; len]
}

/// Element-wise `v * factor`.
pub fn scale(v: &[i32], factor: i32) -> Vec<i32> {
    v.iter().map(|x| x.wrapping_mul(factor)).collect()
}

/// Element-wise `v + addend`.
pub fn add_scalar(v: &[i32], addend: i32) -> Vec<i32> {
    v.iter().map(|x| x.wrapping_add(addend)).collect()
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(GpuError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let mut acc = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        acc += x * y;
    }
    Ok(acc)
}

/// Sum of all elements.
pub fn sum(v: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for x in v {
        acc += x;
    }
    acc
}
