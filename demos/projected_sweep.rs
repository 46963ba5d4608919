// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Projected batch-width sweep for a sparse matrix.
//!
//! This example shows how to:
//! - Load a Matrix Market file (or generate a banded matrix)
//! - Split its non-zeros into per-window work with a uniform approximation
//! - Verify one launch through the CPU backend
//! - Project run time and throughput for N = 8..512
//!
//! Run with: `cargo run --example projected_sweep -- [matrix.mtx]`
//! Set `RUST_LOG=debug` to see per-stage logging.

use anyhow::Result;
use sextans_rs::align::{num_windows, PE_GROUP};
use sextans_rs::compare::compare_results;
use sextans_rs::config::AcceleratorConfig;
use sextans_rs::kernel::{execute, CpuBackend, KernelLaunch, KernelScalars, DEFAULT_ALPHA, DEFAULT_BETA};
use sextans_rs::layout::{encode_accumulator_c, encode_operand_b, SparseChannels, SPARSE_CHANNELS};
use sextans_rs::matrix::{read_matrix_market_file, spmm_reference, CsrMatrix, DenseMatrix};
use sextans_rs::metrics::{RunShape, ThroughputMetrics, PROJECTED_BOARD_WATTS};
use sextans_rs::model::{default_batch_widths, ModelInputs, PerformanceModel};
use sextans_rs::window::WindowIndex;

/// Banded test matrix, five diagonals.
fn banded(size: usize) -> Result<CsrMatrix> {
    let mut triplets = Vec::with_capacity(size * 5);
    for r in 0..size {
        for d in [-2i64, -1, 0, 1, 2] {
            let c = r as i64 + d;
            if (0..size as i64).contains(&c) {
                triplets.push((r, c as usize, 1.0 / (1.0 + d.abs() as f32)));
            }
        }
    }
    Ok(CsrMatrix::from_triplets(size, size, triplets)?)
}

/// One cycle per window, each unit carrying one PE group per sparse channel.
fn approximate_index(a: &CsrMatrix, window_size: usize) -> Result<WindowIndex> {
    let windows = num_windows(a.cols(), window_size)?;
    let mut per_window = vec![0usize; windows];
    for &c in a.col_idx() {
        per_window[c / window_size] += 1;
    }
    let unit = PE_GROUP * SPARSE_CHANNELS;
    let work: Vec<u32> = per_window
        .iter()
        .map(|&nnz| u32::try_from(nnz.div_ceil(unit)))
        .collect::<std::result::Result<_, _>>()?;
    Ok(WindowIndex::from_cycle_work(&work)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("=== Projected SpMM Sweep ===\n");

    let a = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading {path}");
            read_matrix_market_file(path)?
        }
        None => {
            println!("No input given, using a banded 20000x20000 matrix");
            banded(20_000)?
        }
    };
    println!("  M={} K={} nnz={}\n", a.rows(), a.cols(), a.nnz());

    let config = AcceleratorConfig::for_u280();
    config.validate()?;
    let index = approximate_index(&a, config.window_size)?;
    println!(
        "Window index: {} cycles, {} work units\n",
        index.num_cycles(),
        index.total_work()
    );

    // Functional check at the smallest width
    let n = 8;
    let b = DenseMatrix::harness_operand_b(a.cols(), n);
    let c = DenseMatrix::harness_accumulator_c(a.rows(), n);
    let words = index.sparse_words_per_channel();
    let sparse = SparseChannels::pack(&vec![vec![0u64; words]; SPARSE_CHANNELS], words, config.dma_chunk)?;
    let b_bufs = encode_operand_b(&b, config.b_channels, config.dma_chunk)?;
    let c_bufs = encode_accumulator_c(&c, config.dma_chunk)?;
    let launch = KernelLaunch {
        scalars: KernelScalars::new(&index, a.rows(), a.cols(), n, 1, DEFAULT_ALPHA, DEFAULT_BETA)?,
        b_channels: config.b_channels,
        window_index: &index,
        sparse: &sparse,
        b: &b_bufs,
        c_in: &c_bufs,
    };
    let device_c = execute(&CpuBackend::new(a.clone()), &launch, config.dma_chunk)?;
    let mut reference = c;
    spmm_reference(DEFAULT_ALPHA, &a, &b, DEFAULT_BETA, &mut reference)?;
    let cmp = compare_results(&reference, &device_c)?;
    println!(
        "CPU backend check: {} / {} mismatched ({:.3}%) -> {}\n",
        cmp.mismatch_count,
        cmp.total,
        cmp.mismatch_percent,
        if cmp.pass { "PASS" } else { "FAIL" }
    );

    let model = PerformanceModel::from_config(&config)?;
    let inputs = ModelInputs::from_config(&config, n, a.rows(), a.cols(), &index);
    println!("{:>5} {:>12} {:>10} {:>14} {:>8}", "N", "time (us)", "GFLOPS", "GFLOP/J", "BW eff");
    for (n, est) in model.sweep_batch_widths(&inputs, default_batch_widths())? {
        let shape = RunShape {
            rows: a.rows(),
            cols: a.cols(),
            nnz: a.nnz(),
            n,
        };
        let m = ThroughputMetrics::from_seconds(&shape, est.seconds, PROJECTED_BOARD_WATTS, 900.0)?;
        println!(
            "{:>5} {:>12.2} {:>10.2} {:>14.3} {:>8.3}",
            n,
            est.seconds * 1e6,
            m.gflops,
            m.energy_efficiency / 1e9,
            m.bandwidth_efficiency
        );
    }

    Ok(())
}
