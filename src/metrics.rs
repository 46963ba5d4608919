//! Throughput figures derived from a measured or projected run time.

use crate::error::{Result, SextansError};

/// Board power of the reference build under load, in watts.
pub const MEASURED_BOARD_WATTS: f64 = 52.0;

/// Power assumed for projected (modelled) runs, in watts.
pub const PROJECTED_BOARD_WATTS: f64 = 96.0;

/// Problem dimensions needed for the throughput formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunShape {
    /// Rows of A (M).
    pub rows: usize,
    /// Columns of A (K).
    pub cols: usize,
    /// Non-zeros of A.
    pub nnz: usize,
    /// Batch width (N).
    pub n: usize,
}

impl RunShape {
    /// Floating-point operations: `2 * (nnz + M) * N`.
    ///
    /// The `M` term accounts for the `alpha`/`beta` update of C.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn flops(&self) -> f64 {
        2.0 * (self.nnz + self.rows) as f64 * self.n as f64
    }

    /// Bytes that must move at minimum: `4 * (nnz + N * (2M + K))`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn min_bytes(&self) -> f64 {
        4.0 * (self.nnz as f64 + self.n as f64 * (2.0 * self.rows as f64 + self.cols as f64))
    }
}

/// Derived throughput of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputMetrics {
    /// Billions of floating-point operations per second.
    pub gflops: f64,
    /// FLOP per joule.
    pub energy_efficiency: f64,
    /// Achieved fraction of `peak_gbps` (not a percentage).
    pub bandwidth_efficiency: f64,
}

impl ThroughputMetrics {
    /// Compute metrics for a run that took `seconds`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `seconds`, `watts` or `peak_gbps`
    /// is not positive.
    pub fn from_seconds(shape: &RunShape, seconds: f64, watts: f64, peak_gbps: f64) -> Result<Self> {
        for (name, v) in [("seconds", seconds), ("watts", watts), ("peak_gbps", peak_gbps)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(SextansError::config(format!("{name} must be positive, got {v}")));
            }
        }
        let gflops = shape.flops() / 1e9 / seconds;
        Ok(Self {
            gflops,
            energy_efficiency: gflops / watts * 1e9,
            bandwidth_efficiency: shape.min_bytes() / 1e9 / seconds / peak_gbps,
        })
    }
}
