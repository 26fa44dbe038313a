#[cfg(feature = "cuda")]
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use voltra_core::host;

#[derive(Parser)]
#[command(
    name = "voltra",
    about = "GPU vector-compute harness",
    long_about = "Loads a precompiled PTX kernel module, dispatches vector operations on \
                  the GPU, and benchmarks each against a serial host implementation.\n\n\
                  The kernel module is external: compile kernels/vector_ops.cu with \
                  `nvcc --ptx` and point the harness at it via --ptx or VOLTRA_PTX.",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show device availability and driver info
    Info,
    /// Benchmark device dot-product and reduction-sum against the host
    Bench {
        /// Vector length
        #[arg(long, default_value = "1048576")]
        size: usize,
        /// Threads per block (power of two, max 1024)
        #[arg(long, default_value = "1024")]
        threads: u32,
        /// Path to the precompiled PTX module (falls back to $VOLTRA_PTX)
        #[arg(long)]
        ptx: Option<PathBuf>,
        /// Relative tolerance for device/host agreement
        #[arg(long, default_value = "1e-4")]
        tolerance: f64,
    },
    /// Run the fill / scale / add kernels and print sample output
    Demo {
        /// Vector length
        #[arg(long, default_value = "65536")]
        size: usize,
        /// Scalar applied by each kernel
        #[arg(long, default_value = "13")]
        value: i32,
        /// Threads per block (power of two, max 1024)
        #[arg(long, default_value = "256")]
        threads: u32,
        /// Path to the precompiled PTX module (falls back to $VOLTRA_PTX)
        #[arg(long)]
        ptx: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Info => {
            cmd_info();
            Ok(())
        }
        Commands::Bench {
            size,
            threads,
            ptx,
            tolerance,
        } => cmd_bench(size, threads, ptx, tolerance),
        Commands::Demo {
            size,
            value,
            threads,
            ptx,
        } => cmd_demo(size, value, threads, ptx),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ============================================================================
// info
// ============================================================================

fn cmd_info() {
    println!("voltra {}", env!("CARGO_PKG_VERSION"));
    #[cfg(feature = "cuda")]
    {
        use voltra_core::cuda::DeviceContext;
        if DeviceContext::is_available() {
            println!("CUDA devices: {}", DeviceContext::device_count());
            if let Ok(ctx) = DeviceContext::open() {
                match ctx.name() {
                    Ok(name) => println!("device 0: {name}"),
                    Err(e) => println!("device 0 query failed: {e}"),
                }
            }
        } else {
            println!("CUDA devices: none");
        }
    }
    #[cfg(not(feature = "cuda"))]
    println!("CUDA support: not compiled (build with --features cuda)");
}

// ============================================================================
// bench
// ============================================================================

/// Mostly-zero vectors with a handful of spiked entries, so the expected
/// results are easy to eyeball. Indices spiked in both vectors contribute
/// to the dot product: 1*1 + 3*5 = 16 from indices 0 and 4, plus the larger
/// spikes when the vector is long enough to hold them.
fn spiked_vectors(size: usize) -> (Vec<f32>, Vec<f32>) {
    let mut v1 = vec![0.0f32; size];
    let mut v2 = vec![0.0f32; size];
    for (idx, a, b) in [
        (0usize, 1.0f32, 1.0f32),
        (1, 1.0, 0.0),
        (2, 0.0, 1.0),
        (4, 3.0, 5.0),
        (100, 100.0, 100.0),
        (1058, 20.0, 100.0),
        (500_000, 1000.0, 3000.0),
    ] {
        if idx < size {
            v1[idx] += a;
            v2[idx] += b;
        }
    }
    (v1, v2)
}

#[cfg(feature = "cuda")]
fn cmd_bench(
    size: usize,
    threads: u32,
    ptx: Option<PathBuf>,
    tolerance: f64,
) -> voltra_core::Result<()> {
    use voltra_core::cuda::{DeviceContext, VectorKernels};
    use voltra_core::BenchmarkRunner;

    let ptx = resolve_ptx(ptx)?;
    let ctx = DeviceContext::open()?;
    let kernels = VectorKernels::load(&ctx, &ptx, size, threads)?;
    let runner = BenchmarkRunner::with_tolerance(tolerance);
    let (v1, v2) = spiked_vectors(size);

    println!("vector length {size}, {threads} threads per block\n");

    let cmp = runner.compare(
        "dot-product",
        || kernels.dot(&ctx, &v1, &v2),
        || host::dot(&v1, &v2).expect("equal lengths"),
    )?;
    print_comparison(&cmp, "device", "host");

    let cmp = runner.compare(
        "reduction-sum",
        || kernels.sum(&ctx, &v1),
        || host::sum(&v1),
    )?;
    print_comparison(&cmp, "device", "host");
    Ok(())
}

#[cfg(not(feature = "cuda"))]
fn cmd_bench(
    size: usize,
    _threads: u32,
    _ptx: Option<PathBuf>,
    tolerance: f64,
) -> voltra_core::Result<()> {
    use voltra_core::BenchmarkRunner;

    println!("(built without CUDA; comparing serial loop against iterator sum)\n");
    let (v1, v2) = spiked_vectors(size);
    let runner = BenchmarkRunner::with_tolerance(tolerance);

    let cmp = runner.compare(
        "dot-product",
        || host::dot(&v1, &v2),
        || v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum::<f32>(),
    )?;
    print_comparison(&cmp, "loop", "iterator");

    let cmp = runner.compare(
        "reduction-sum",
        || Ok(host::sum(&v1)),
        || v1.iter().sum::<f32>(),
    )?;
    print_comparison(&cmp, "loop", "iterator");
    Ok(())
}

fn print_comparison(cmp: &voltra_core::Comparison<f32>, device_label: &str, host_label: &str) {
    println!("{}:", cmp.operation);
    println!(
        "  {:<9} {:>14.4}  ({:.3} ms)",
        format!("{device_label}:"),
        cmp.device_result,
        cmp.device_time.as_secs_f64() * 1e3
    );
    println!(
        "  {:<9} {:>14.4}  ({:.3} ms)",
        format!("{host_label}:"),
        cmp.host_result,
        cmp.host_time.as_secs_f64() * 1e3
    );
    println!(
        "  {} (speedup {:.2}x)\n",
        if cmp.agreed { "agree" } else { "MISMATCH" },
        cmp.speedup()
    );
}

// ============================================================================
// demo
// ============================================================================

#[cfg(feature = "cuda")]
fn cmd_demo(size: usize, value: i32, threads: u32, ptx: Option<PathBuf>) -> voltra_core::Result<()> {
    use voltra_core::cuda::{DeviceContext, VectorKernels};

    let ptx = resolve_ptx(ptx)?;
    let ctx = DeviceContext::open()?;
    let kernels = VectorKernels::load(&ctx, &ptx, size, threads)?;
    let ramp: Vec<i32> = (1..=size as i32).collect();

    let show = |name: &str, out: &[i32]| {
        print_sample(out);
        println!("{name} done");
    };

    println!("\nfill with scalar {value} over {size} elements");
    pause();
    show("fill", &kernels.fill(&ctx, value)?);

    println!("\nscale with scalar {value} over {size} elements");
    pause();
    show("scale", &kernels.scale(&ctx, &ramp, value)?);

    println!("\nadd-scalar with scalar {value} over {size} elements");
    pause();
    show("add-scalar", &kernels.add_scalar(&ctx, &ramp, value)?);
    Ok(())
}

#[cfg(not(feature = "cuda"))]
fn cmd_demo(size: usize, value: i32, _threads: u32, _ptx: Option<PathBuf>) -> voltra_core::Result<()> {
    println!("(built without CUDA; running host reference ops)\n");
    let ramp: Vec<i32> = (1..=size as i32).collect();
    for (name, out) in [
        ("fill", host::fill(size, value)),
        ("scale", host::scale(&ramp, value)),
        ("add-scalar", host::add_scalar(&ramp, value)),
    ] {
        println!("\n{name} with scalar {value} over {size} elements");
        print_sample(&out);
    }
    Ok(())
}

/// First and last 10 elements, enough to spot an uncovered tail.
fn print_sample(v: &[i32]) {
    let head = v.len().min(10);
    for x in &v[..head] {
        print!("{x:>8}");
    }
    println!();
    if v.len() > 20 {
        println!("...");
        for x in &v[v.len() - 10..] {
            print!("{x:>8}");
        }
        println!();
    }
}

#[cfg(feature = "cuda")]
fn pause() {
    print!("press enter to dispatch...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

#[cfg(feature = "cuda")]
fn resolve_ptx(flag: Option<PathBuf>) -> voltra_core::Result<PathBuf> {
    flag.or_else(|| std::env::var_os("VOLTRA_PTX").map(PathBuf::from))
        .ok_or_else(|| voltra_core::GpuError::ModuleLoad {
            location: String::new(),
            msg: "no kernel module given; pass --ptx or set VOLTRA_PTX".to_string(),
        })
}
