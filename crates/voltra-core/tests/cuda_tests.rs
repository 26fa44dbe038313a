//! GPU integration tests for the voltra CUDA backend.
//! Run with: cargo test -p voltra-core --features cuda -- --nocapture
//!
//! Tests that need the kernel module look for a PTX artifact at
//! `$VOLTRA_PTX` (fallback: `kernels/vector_ops.ptx` in the workspace,
//! produced with `nvcc --ptx kernels/vector_ops.cu`). Each test skips with
//! a message when no device or no artifact is present.

#![cfg(feature = "cuda")]

use std::path::PathBuf;

use voltra_core::cuda::{ops, DeviceBuffer, DeviceContext, KernelModule, VectorKernels};
use voltra_core::{host, BenchmarkRunner, GpuError, LaunchGeometry};

fn gpu() -> Option<DeviceContext> {
    if !DeviceContext::is_available() {
        eprintln!("skipping: no CUDA device");
        return None;
    }
    Some(DeviceContext::open().expect("device probe succeeded but open failed"))
}

fn ptx_path() -> Option<PathBuf> {
    let path = std::env::var_os("VOLTRA_PTX")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../kernels/vector_ops.ptx")
        });
    if path.exists() {
        Some(path)
    } else {
        eprintln!("skipping: no PTX artifact at {}", path.display());
        None
    }
}

fn assert_close(a: f32, b: f32, rel: f32) {
    let tol = rel * b.abs().max(1.0);
    assert!((a - b).abs() <= tol, "{a} vs {b} (tol={tol})");
}

// ============================================================================
// Buffer transfer tests (no kernel module needed)
// ============================================================================

#[test]
fn test_upload_download_roundtrip() {
    let Some(ctx) = gpu() else { return };
    let data: Vec<f32> = (0..4096).map(|i| i as f32 * 0.5 - 7.0).collect();
    let buf = DeviceBuffer::upload(&ctx, &data).unwrap();
    assert_eq!(buf.len(), data.len());
    assert_eq!(buf.to_vec().unwrap(), data);
}

#[test]
fn test_download_length_mismatch_leaves_destination_untouched() {
    let Some(ctx) = gpu() else { return };
    let buf = DeviceBuffer::upload(&ctx, &[1.0f32, 2.0, 3.0]).unwrap();
    let mut dst = vec![9.0f32; 5];
    let err = buf.download_into(&mut dst).unwrap_err();
    assert!(matches!(
        err,
        GpuError::LengthMismatch {
            expected: 3,
            actual: 5
        }
    ));
    assert_eq!(dst, vec![9.0; 5]);
}

#[test]
fn test_refill_reuses_device_storage() {
    let Some(ctx) = gpu() else { return };
    let mut buf = DeviceBuffer::upload(&ctx, &[1i32, 2, 3, 4]).unwrap();
    buf.refill(&[5, 6, 7, 8]).unwrap();
    assert_eq!(buf.to_vec().unwrap(), vec![5, 6, 7, 8]);
    assert!(matches!(
        buf.refill(&[1, 2]),
        Err(GpuError::LengthMismatch { .. })
    ));
}

#[test]
fn test_release_frees_storage_then_context_closes() {
    let Some(ctx) = gpu() else { return };
    let buf = DeviceBuffer::upload(&ctx, &[1i32, 2, 3, 4]).unwrap();
    assert_ne!(buf.device_ptr(), 0);
    buf.release();
    // `buf` is consumed above; its address is gone and the storage can be
    // reacquired through the same context.
    let again = DeviceBuffer::upload(&ctx, &[5i32, 6, 7, 8]).unwrap();
    assert_eq!(again.to_vec().unwrap(), vec![5, 6, 7, 8]);
    again.release();
    ctx.close();
}

// ============================================================================
// Module / registry tests
// ============================================================================

#[test]
fn test_resolve_unknown_entry_leaves_module_usable() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let module = KernelModule::load(&ctx, &ptx, ops::ENTRY_POINTS).unwrap();
    let geom = LaunchGeometry::new(256, 4).unwrap();

    let err = module.resolve("fill_i64", geom).unwrap_err();
    assert!(matches!(err, GpuError::SymbolNotFound { .. }));

    // other entry points still resolve
    let handle = module.resolve(ops::FILL_ENTRY, geom).unwrap();
    assert_eq!(handle.name(), ops::FILL_ENTRY);
    assert_eq!(handle.geometry(), geom);
}

#[test]
fn test_load_missing_module_fails() {
    let Some(ctx) = gpu() else { return };
    let err = KernelModule::load(
        &ctx,
        std::path::Path::new("/nonexistent/vector_ops.ptx"),
        ops::ENTRY_POINTS,
    )
    .unwrap_err();
    assert!(matches!(err, GpuError::ModuleLoad { .. }));
}

// ============================================================================
// Vector operations vs. host reference
// ============================================================================

#[test]
fn test_fill_matches_host_exactly() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let kernels = VectorKernels::load(&ctx, &ptx, 4099, 256).unwrap();
    let device = kernels.fill(&ctx, 13).unwrap();
    assert_eq!(device, host::fill(4099, 13));
}

#[test]
fn test_scale_and_add_match_host() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let v: Vec<i32> = (1..=10_000).collect();
    let kernels = VectorKernels::load(&ctx, &ptx, v.len(), 256).unwrap();
    assert_eq!(kernels.scale(&ctx, &v, 13).unwrap(), host::scale(&v, 13));
    assert_eq!(
        kernels.add_scalar(&ctx, &v, 13).unwrap(),
        host::add_scalar(&v, 13)
    );
}

#[test]
fn test_dot_spiked_fixture_is_16() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let n = 1_048_576;
    let mut v1 = vec![0.0f32; n];
    let mut v2 = vec![0.0f32; n];
    v1[0] = 1.0;
    v2[0] = 1.0;
    v1[4] = 3.0;
    v2[4] = 5.0;

    let kernels = VectorKernels::load(&ctx, &ptx, n, 1024).unwrap();
    let device = kernels.dot(&ctx, &v1, &v2).unwrap();
    let host = host::dot(&v1, &v2).unwrap();
    assert_eq!(host, 16.0);
    assert_close(device, host, 1e-4);
}

#[test]
fn test_fill_five_sevens_then_sum_is_35() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let kernels = VectorKernels::load(&ctx, &ptx, 5, 32).unwrap();
    let filled = kernels.fill(&ctx, 7).unwrap();
    assert_eq!(filled, vec![7; 5]);

    let as_f32: Vec<f32> = filled.iter().map(|&x| x as f32).collect();
    let device_sum = kernels.sum(&ctx, &as_f32).unwrap();
    assert_eq!(device_sum, 35.0);
    assert_eq!(host::sum(&as_f32), 35.0);
}

#[test]
fn test_sum_permutation_invariant_on_device() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let n = 65_537; // exercises the partial final block
    let v: Vec<f32> = (0..n).map(|i| ((i * 7 + 3) % 13) as f32 * 0.25).collect();
    let mut shuffled = v.clone();
    shuffled.reverse();

    let kernels = VectorKernels::load(&ctx, &ptx, n, 512).unwrap();
    let a = kernels.sum(&ctx, &v).unwrap();
    let b = kernels.sum(&ctx, &shuffled).unwrap();
    assert_close(a, b, 1e-4);
    assert_close(a, host::sum(&v), 1e-4);
}

#[test]
fn test_wrong_length_input_rejected() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let kernels = VectorKernels::load(&ctx, &ptx, 1024, 256).unwrap();
    let short = vec![1.0f32; 100];
    assert!(matches!(
        kernels.sum(&ctx, &short),
        Err(GpuError::LengthMismatch { .. })
    ));
}

// ============================================================================
// Benchmark runner over the real device path
// ============================================================================

#[test]
fn test_benchmark_comparison_agrees() {
    let (Some(ctx), Some(ptx)) = (gpu(), ptx_path()) else {
        return;
    };
    let n = 1 << 20;
    let v: Vec<f32> = (0..n).map(|i| ((i % 97) as f32) * 0.125).collect();
    let kernels = VectorKernels::load(&ctx, &ptx, n, 1024).unwrap();

    let runner = BenchmarkRunner::new();
    let cmp = runner
        .compare("reduction-sum", || kernels.sum(&ctx, &v), || host::sum(&v))
        .unwrap();
    assert!(cmp.agreed, "device {} vs host {}", cmp.device_result, cmp.host_result);
}
