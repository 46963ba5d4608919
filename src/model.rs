// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Analytical performance model.
//!
//! Projects kernel latency without running on hardware. The pipeline is a
//! sequence of stages; inside a stage memory traffic and compute overlap
//! fully, so each stage costs `max(memory, compute)`. Stages do not overlap
//! with each other.
//!
//! ```text
//! init       ceil(M / 64) / f
//! per window max(4 * w * 8 / bw, w / 16 / f)          w = pad16(cols in window)
//! per cycle  max(64 * len * 8 / bw, (len + 17) / f)    len = work_in_cycle
//! writeback  max(4 * r * 8 / bw, (r / 16 + 21) / f) + 48 / f,   r = pad16(M)
//!
//! total = (init + windows + writeback) * N / 8 + 2000 / f
//! ```
//!
//! The sparse stream is replayed once per 8-column pass of the batch, hence
//! the `N / 8` factor.

use crate::align::{num_windows, pad_to, TILE};
use crate::config::AcceleratorConfig;
use crate::error::{Result, SextansError};
use crate::window::WindowIndex;

/// Bytes per dense element.
const WORD_BYTES: f64 = 4.0;
/// Channels sharing each fetched B / written C element.
const SHARE_FACTOR: f64 = 8.0;
/// Bytes read per sparse work unit.
const SPARSE_UNIT_BYTES: f64 = 64.0;
/// C rows initialised per cycle.
const INIT_ROWS_PER_CYCLE: usize = 64;
/// Pipeline fill latency of the compute stage, in cycles.
const COMPUTE_FILL_CYCLES: f64 = 17.0;
/// Pipeline latency of the writeback stage, in cycles.
const WRITEBACK_FILL_CYCLES: f64 = 21.0;
/// Drain latency after writeback, in cycles.
const DRAIN_CYCLES: f64 = 48.0;
/// Per-invocation startup and drain overhead, in cycles.
const INVOCATION_CYCLES: f64 = 2000.0;
/// Batch columns per pass, as a float divisor.
const PASS_COLUMNS: f64 = 8.0;

/// Shape and tiling of one projected run.
#[derive(Debug, Clone, Copy)]
pub struct ModelInputs<'a> {
    /// Batch width of dense B / C processed together.
    pub n: usize,
    /// Processing elements in the build. Recorded for reports; stage costs
    /// are expressed per PE group and do not scale with it.
    pub num_pes: usize,
    /// Rows of A and C (M).
    pub rows: usize,
    /// Columns of A, rows of B (K).
    pub cols: usize,
    /// Columns of B per window.
    pub window_size: usize,
    /// Sub-window cycles per window.
    pub cycles_per_window: usize,
    /// Validated work partition from the tiler.
    pub window_index: &'a WindowIndex,
}

impl<'a> ModelInputs<'a> {
    /// Inputs taking window size, cycles and PE count from `config`.
    #[must_use]
    pub fn from_config(
        config: &AcceleratorConfig,
        n: usize,
        rows: usize,
        cols: usize,
        window_index: &'a WindowIndex,
    ) -> Self {
        Self {
            n,
            num_pes: config.num_pes,
            rows,
            cols,
            window_size: config.window_size,
            cycles_per_window: config.cycles_per_window,
            window_index,
        }
    }
}

/// Per-stage contributions to an estimate, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageBreakdown {
    /// C initialisation, one pass.
    pub init: f64,
    /// All B fetches, one pass.
    pub b_fetch: f64,
    /// All sparse compute cycles, one pass.
    pub compute: f64,
    /// C writeback including drain, one pass.
    pub writeback: f64,
    /// Multiplier applied to the per-pass sum: `N / 8` as a real number.
    ///
    /// Buffers are sized for `ceil(N / 8)` passes, so for a ragged batch
    /// (e.g. N = 12 gives 1.5 here, 2 passes in memory) this charges only the
    /// occupied fraction of the last pass. Keeps the scaled part exactly
    /// linear in N.
    pub pass_scale: f64,
    /// Fixed per-invocation overhead.
    pub fixed_overhead: f64,
}

impl StageBreakdown {
    /// Cost of a single pass through all stages.
    #[must_use]
    pub fn per_pass(&self) -> f64 {
        self.init + self.b_fetch + self.compute + self.writeback
    }

    /// Batch-scaled portion of the estimate.
    #[must_use]
    pub fn scaled(&self) -> f64 {
        self.per_pass() * self.pass_scale
    }
}

/// Projected execution time of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceEstimate {
    /// Projected wall-clock seconds.
    pub seconds: f64,
    /// Stage contributions.
    pub breakdown: StageBreakdown,
}

/// Analytical latency model of the accelerator.
///
/// # Example
///
/// ```rust
/// use sextans_rs::model::{ModelInputs, PerformanceModel};
/// use sextans_rs::window::WindowIndex;
///
/// let model = PerformanceModel::new(350e6, 8.1e11).unwrap();
/// let index = WindowIndex::new(vec![0, 3]).unwrap();
/// let inputs = ModelInputs {
///     n: 8,
///     num_pes: 64,
///     rows: 4,
///     cols: 4,
///     window_size: 4,
///     cycles_per_window: 1,
///     window_index: &index,
/// };
/// let estimate = model.estimate(&inputs).unwrap();
/// assert!(estimate.seconds > 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PerformanceModel {
    frequency_hz: f64,
    bandwidth: f64,
}

impl PerformanceModel {
    /// Model with the given clock (Hz) and effective bandwidth (B/s).
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if either is not positive and finite.
    pub fn new(frequency_hz: f64, bandwidth: f64) -> Result<Self> {
        if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
            return Err(SextansError::config(format!(
                "frequency {frequency_hz} Hz must be positive"
            )));
        }
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(SextansError::config(format!(
                "bandwidth {bandwidth} B/s must be positive"
            )));
        }
        Ok(Self {
            frequency_hz,
            bandwidth,
        })
    }

    /// Model for a validated accelerator configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration is invalid.
    pub fn from_config(config: &AcceleratorConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.frequency_hz, config.bandwidth_bytes_per_sec)
    }

    /// Clock frequency in Hz.
    #[must_use]
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Effective bandwidth in B/s.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[inline]
    fn stage(&self, bytes: f64, cycles: f64) -> f64 {
        (bytes / self.bandwidth).max(cycles / self.frequency_hz)
    }

    /// Project the execution time of one run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `n`, `window_size`, `num_pes` or
    /// `cycles_per_window` is zero, or if the index cycle count is not a
    /// multiple of `cycles_per_window`.
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, inputs: &ModelInputs<'_>) -> Result<PerformanceEstimate> {
        if inputs.n == 0 {
            return Err(SextansError::config("batch width N must be positive"));
        }
        if inputs.window_size == 0 {
            return Err(SextansError::config("window size must be positive"));
        }
        if inputs.num_pes == 0 {
            return Err(SextansError::config("num_pes must be positive"));
        }
        let cycles = inputs.cycles_per_window;
        let windows = inputs.window_index.total_windows(cycles)?;
        // A span wider than usize covers any K in one window.
        let span = inputs.window_size.saturating_mul(cycles);

        let needed = num_windows(inputs.cols, span)?;
        if windows < needed {
            tracing::warn!(
                "Window index covers {} windows but K={} needs {}",
                windows,
                inputs.cols,
                needed
            );
        }

        let mut breakdown = StageBreakdown {
            init: inputs.rows.div_ceil(INIT_ROWS_PER_CYCLE) as f64 / self.frequency_hz,
            ..StageBreakdown::default()
        };

        for i in 0..windows {
            let remaining = inputs.cols.saturating_sub(i.saturating_mul(span));
            let width = match span.min(remaining) {
                0 => 0,
                w => pad_to(w, TILE)?,
            } as f64;
            breakdown.b_fetch += self.stage(WORD_BYTES * width * SHARE_FACTOR, width / TILE as f64);

            for c in 0..cycles {
                let len = f64::from(inputs.window_index.work_in_cycle(i * cycles + c)?);
                breakdown.compute += self.stage(
                    SPARSE_UNIT_BYTES * len * SHARE_FACTOR,
                    len + COMPUTE_FILL_CYCLES,
                );
            }
        }

        let rows_padded = pad_to(inputs.rows, TILE)? as f64;
        breakdown.writeback = self.stage(
            WORD_BYTES * rows_padded * SHARE_FACTOR,
            rows_padded / TILE as f64 + WRITEBACK_FILL_CYCLES,
        ) + DRAIN_CYCLES / self.frequency_hz;

        breakdown.pass_scale = inputs.n as f64 / PASS_COLUMNS;
        breakdown.fixed_overhead = INVOCATION_CYCLES / self.frequency_hz;

        let seconds = breakdown.scaled() + breakdown.fixed_overhead;
        tracing::debug!(
            "Projected M={} K={} N={} windows={} work={}: {:.3e} s",
            inputs.rows,
            inputs.cols,
            inputs.n,
            windows,
            inputs.window_index.total_work(),
            seconds
        );
        Ok(PerformanceEstimate { seconds, breakdown })
    }

    /// Project every batch width in `widths`, holding the rest of `inputs`.
    ///
    /// # Errors
    ///
    /// Fails on the first width [`estimate`](Self::estimate) rejects.
    pub fn sweep_batch_widths(
        &self,
        inputs: &ModelInputs<'_>,
        widths: impl IntoIterator<Item = usize>,
    ) -> Result<Vec<(usize, PerformanceEstimate)>> {
        widths
            .into_iter()
            .map(|n| {
                let est = self.estimate(&ModelInputs { n, ..*inputs })?;
                Ok((n, est))
            })
            .collect()
    }
}

/// Project a run on the accelerator described by `config`.
///
/// # Errors
///
/// Returns `InvalidConfiguration` for an invalid configuration or inputs.
pub fn estimate_performance(
    config: &AcceleratorConfig,
    inputs: &ModelInputs<'_>,
) -> Result<PerformanceEstimate> {
    PerformanceModel::from_config(config)?.estimate(inputs)
}

/// Batch widths the host harness sweeps: 8, 16, ..., 512.
pub fn default_batch_widths() -> impl Iterator<Item = usize> {
    (3..=9).map(|p| 1usize << p)
}
