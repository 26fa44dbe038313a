//! Benchmark: host reference ops across sizes, and the device path when
//! compiled with `--features cuda` and pointed at a PTX artifact.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use voltra_core::host;

fn time<R>(iters: usize, mut f: impl FnMut() -> R) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        let _ = f();
    }
    start.elapsed().as_secs_f64() / iters as f64
}

fn main() {
    println!("=== voltra host ops ===");
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12}",
        "Size", "fill (ms)", "scale (ms)", "dot (ms)", "sum (ms)"
    );
    println!("{}", "-".repeat(64));

    let mut rng = StdRng::seed_from_u64(42);
    for &n in &[1 << 14, 1 << 17, 1 << 20, 1 << 23] {
        let ints: Vec<i32> = (0..n).map(|_| rng.gen_range(-100..100)).collect();
        let a: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let b: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let iters = if n >= 1 << 23 { 3 } else { 10 };
        let t_fill = time(iters, || host::fill(n, 13));
        let t_scale = time(iters, || host::scale(&ints, 13));
        let t_dot = time(iters, || host::dot(&a, &b).unwrap());
        let t_sum = time(iters, || host::sum(&a));

        println!(
            "{:<12} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
            n,
            t_fill * 1e3,
            t_scale * 1e3,
            t_dot * 1e3,
            t_sum * 1e3
        );
    }

    #[cfg(feature = "cuda")]
    bench_device(&mut rng);
}

#[cfg(feature = "cuda")]
fn bench_device(rng: &mut StdRng) {
    use voltra_core::cuda::{DeviceContext, VectorKernels};

    if !DeviceContext::is_available() {
        println!("\n(no CUDA device; skipping device bench)");
        return;
    }
    let Some(ptx) = std::env::var_os("VOLTRA_PTX") else {
        println!("\n(VOLTRA_PTX not set; skipping device bench)");
        return;
    };

    let ctx = DeviceContext::open().expect("open CUDA device");
    let n = 1 << 23;
    let a: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let b: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let kernels =
        VectorKernels::load(&ctx, ptx.as_ref(), n, 1024).expect("load kernel module");

    println!("\n=== voltra device ops ({} on {} elements) ===", ctx.name().unwrap_or_default(), n);
    let t_dot = time(5, || kernels.dot(&ctx, &a, &b).unwrap());
    let t_sum = time(5, || kernels.sum(&ctx, &a).unwrap());
    let h_dot = time(5, || host::dot(&a, &b).unwrap());
    let h_sum = time(5, || host::sum(&a));
    println!("dot: device {:.3} ms, host {:.3} ms", t_dot * 1e3, h_dot * 1e3);
    println!("sum: device {:.3} ms, host {:.3} ms", t_sum * 1e3, h_sum * 1e3);
}
