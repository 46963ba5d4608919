//! Test utilities and fixtures for the SpMM host integration tests.
//!
//! Provides deterministic sparse matrix generation and a tiny window index
//! builder so every test is reproducible without a tiler or a device.

use anyhow::Result;
use sextans_rs::matrix::CsrMatrix;
use sextans_rs::window::WindowIndex;

/// Configuration for a generated sparse operand.
#[derive(Debug, Clone)]
pub struct SparseMatrixConfig {
    /// Matrix shape (rows, cols).
    pub shape: (usize, usize),
    /// Fraction of entries kept (0.0 = empty, 1.0 = dense).
    pub density: f32,
    /// Seed for reproducible values and positions.
    pub seed: u64,
}

impl Default for SparseMatrixConfig {
    fn default() -> Self {
        Self {
            shape: (64, 64),
            density: 0.1,
            seed: 42,
        }
    }
}

/// Deterministic fixtures.
pub struct TestFixtures;

impl TestFixtures {
    /// Hash-based uniform values in `[0, 1)`.
    pub fn uniform(count: usize, seed: u64) -> Vec<f64> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        (0..count)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                (seed, i as u64).hash(&mut hasher);
                (hasher.finish() as f64) / (u64::MAX as f64)
            })
            .collect()
    }

    /// Sparse matrix with roughly `density * rows * cols` entries in [-1, 1].
    pub fn sparse_matrix(config: &SparseMatrixConfig) -> Result<CsrMatrix> {
        let (rows, cols) = config.shape;
        let keep = Self::uniform(rows * cols, config.seed);
        let values = Self::uniform(rows * cols, config.seed + 1000);

        let triplets = (0..rows * cols)
            .filter(|&i| keep[i] < f64::from(config.density))
            .map(|i| (i / cols, i % cols, (values[i] * 2.0 - 1.0) as f32))
            .collect();
        Ok(CsrMatrix::from_triplets(rows, cols, triplets)?)
    }

    /// Shapes covering the interesting padding cases for both layouts.
    pub fn standard_shapes() -> Vec<(&'static str, (usize, usize, usize))> {
        vec![
            ("tiny", (3, 4, 1)),
            ("exact_tiles", (16, 16, 8)),
            ("ragged_rows", (17, 9, 8)),
            ("ragged_batch", (33, 20, 13)),
            ("single_row", (1, 40, 24)),
            ("tall", (130, 7, 16)),
        ]
    }

    /// Window index with `cycles` cycles, each holding `work` units.
    pub fn uniform_index(cycles: usize, work: u32) -> Result<WindowIndex> {
        Ok(WindowIndex::from_cycle_work(&vec![work; cycles])?)
    }
}
