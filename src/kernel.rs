// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Kernel launch description and execution backends.
//!
//! The accelerator itself is an external collaborator. A backend receives
//! correctly laid out buffers plus scalar arguments and fills the C output
//! buffers with the same layout. [`CpuBackend`] stands in for the device so
//! the whole encode, run, decode and compare path can run on the host.

use crate::config::BChannelCount;
use crate::error::{Result, SextansError};
use crate::layout::{
    alloc_accumulator_c, decode_operand_b, decode_result_c, encode_accumulator_c_into,
    ChannelBuffers, SparseChannels,
};
use crate::matrix::{spmm_reference, CsrMatrix, DenseMatrix};
use crate::window::WindowIndex;

/// `alpha` used by the host harness.
pub const DEFAULT_ALPHA: f32 = 0.85;

/// `beta` used by the host harness.
pub const DEFAULT_BETA: f32 = -2.06;

/// Kernel repetitions per timed launch in the host harness.
pub const DEFAULT_REPEAT: u32 = 20;

/// Largest value the 16-bit batch width and repeat fields can carry.
const FIELD_MAX: u32 = u16::MAX as u32;

/// Scalar kernel arguments in transport form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelScalars {
    /// Cycles in the window index (entries - 1).
    pub num_cycles: u32,
    /// Last window index entry: total work units.
    pub total_work: u32,
    /// Rows of A and C.
    pub m: u32,
    /// Columns of A, rows of B.
    pub k: u32,
    /// Batch width N.
    pub n: u32,
    /// Back-to-back repetitions inside one launch.
    pub repeat: u32,
    /// Scale on `A * B`.
    pub alpha: f32,
    /// Scale on the incoming C.
    pub beta: f32,
}

fn to_u32(v: usize, what: &str) -> Result<u32> {
    u32::try_from(v).map_err(|_| SextansError::config(format!("{what} {v} exceeds u32")))
}

impl KernelScalars {
    /// Build scalars for `C = alpha * A * B + beta * C`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `n` is zero or exceeds 16 bits,
    /// `repeat` exceeds 16 bits, or `m`/`k` exceed `u32`.
    pub fn new(
        index: &WindowIndex,
        m: usize,
        k: usize,
        n: usize,
        repeat: u32,
        alpha: f32,
        beta: f32,
    ) -> Result<Self> {
        let scalars = Self {
            num_cycles: to_u32(index.num_cycles(), "cycle count")?,
            total_work: index.total_work(),
            m: to_u32(m, "row count")?,
            k: to_u32(k, "column count")?,
            n: to_u32(n, "batch width")?,
            repeat,
            alpha,
            beta,
        };
        scalars.check_fields()?;
        Ok(scalars)
    }

    fn check_fields(&self) -> Result<()> {
        if self.n == 0 || self.n > FIELD_MAX {
            return Err(SextansError::config(format!(
                "batch width {} must be in 1..={FIELD_MAX}",
                self.n
            )));
        }
        if self.repeat > FIELD_MAX {
            return Err(SextansError::config(format!(
                "repeat {} exceeds {FIELD_MAX}",
                self.repeat
            )));
        }
        Ok(())
    }

    /// Same launch with a different batch width.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `n` is zero or exceeds 16 bits.
    pub fn with_batch_width(self, n: usize) -> Result<Self> {
        let scalars = Self {
            n: to_u32(n, "batch width")?,
            ..self
        };
        scalars.check_fields()?;
        Ok(scalars)
    }

    /// `(repeat << 16) | n`.
    #[must_use]
    pub fn packed_n(&self) -> u32 {
        (self.repeat << 16) | self.n
    }

    /// Scalars in argument order, floats reinterpreted bit for bit.
    #[must_use]
    pub fn to_words(&self) -> [u32; 7] {
        [
            self.num_cycles,
            self.total_work,
            self.m,
            self.k,
            self.packed_n(),
            self.alpha.to_bits(),
            self.beta.to_bits(),
        ]
    }

    /// Inverse of [`to_words`](Self::to_words).
    #[must_use]
    pub fn from_words(words: [u32; 7]) -> Self {
        Self {
            num_cycles: words[0],
            total_work: words[1],
            m: words[2],
            k: words[3],
            n: words[4] & FIELD_MAX,
            repeat: words[4] >> 16,
            alpha: f32::from_bits(words[5]),
            beta: f32::from_bits(words[6]),
        }
    }
}

/// Everything one kernel invocation reads.
#[derive(Debug, Clone, Copy)]
pub struct KernelLaunch<'a> {
    /// Scalar arguments.
    pub scalars: KernelScalars,
    /// Channel count B was encoded with.
    pub b_channels: BChannelCount,
    /// Work partition of the sparse operand.
    pub window_index: &'a WindowIndex,
    /// Aligned sparse operand.
    pub sparse: &'a SparseChannels,
    /// Encoded operand B.
    pub b: &'a ChannelBuffers<f32>,
    /// Encoded incoming accumulator C.
    pub c_in: &'a ChannelBuffers<f32>,
}

/// Something that can execute the SpMM kernel.
pub trait KernelBackend {
    /// Run one launch, writing results into `c_out` with the accumulator
    /// layout.
    ///
    /// # Errors
    ///
    /// Backend specific; see implementors.
    fn run(&self, launch: &KernelLaunch<'_>, c_out: &mut ChannelBuffers<f32>) -> Result<()>;
}

/// Host-side stand-in for the accelerator.
///
/// Holds the logical CSR form of A, since the tiled stream format belongs to
/// the external tiler. Decodes B and C from the launch buffers, applies
/// `C = alpha * A * B + beta * C` and encodes the result.
#[derive(Debug, Clone)]
pub struct CpuBackend {
    a: CsrMatrix,
}

impl CpuBackend {
    /// Backend computing with `a`.
    #[must_use]
    pub fn new(a: CsrMatrix) -> Self {
        Self { a }
    }
}

impl KernelBackend for CpuBackend {
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the scalars disagree with the held matrix
    /// or any buffer has the wrong shape.
    fn run(&self, launch: &KernelLaunch<'_>, c_out: &mut ChannelBuffers<f32>) -> Result<()> {
        let s = &launch.scalars;
        let (m, k, n) = (s.m as usize, s.k as usize, s.n as usize);
        if (m, k) != (self.a.rows(), self.a.cols()) {
            return Err(SextansError::ShapeMismatch {
                expected: vec![self.a.rows(), self.a.cols()],
                actual: vec![m, k],
            });
        }
        tracing::debug!(
            "CPU backend: M={} K={} N={} nnz={} cycles={}",
            m,
            k,
            n,
            self.a.nnz(),
            launch.window_index.num_cycles()
        );

        let b = decode_operand_b(launch.b, k, n, launch.b_channels)?;
        let mut c = decode_result_c(launch.c_in, m, n)?;
        spmm_reference(s.alpha, &self.a, &b, s.beta, &mut c)?;
        encode_accumulator_c_into(&c, c_out)
    }
}

/// Allocate output buffers, run `backend` and decode the result.
///
/// # Errors
///
/// Propagates allocation, backend and decode errors.
pub fn execute(
    backend: &dyn KernelBackend,
    launch: &KernelLaunch<'_>,
    dma_chunk: usize,
) -> Result<DenseMatrix> {
    let (m, n) = (launch.scalars.m as usize, launch.scalars.n as usize);
    let mut c_out = alloc_accumulator_c(m, n, dma_chunk)?;
    backend.run(launch, &mut c_out)?;
    decode_result_c(&c_out, m, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{encode_accumulator_c, encode_operand_b};
    use crate::matrix::Layout;

    fn index() -> WindowIndex {
        WindowIndex::new(vec![0, 2, 5]).unwrap()
    }

    #[test]
    fn test_scalar_words() {
        let s = KernelScalars::new(&index(), 100, 200, 512, 20, 0.85, -2.06).unwrap();
        let w = s.to_words();
        assert_eq!(w[0], 2);
        assert_eq!(w[1], 5);
        assert_eq!(w[2], 100);
        assert_eq!(w[3], 200);
        assert_eq!(w[4], (20 << 16) | 512);
        assert_eq!(f32::from_bits(w[5]), 0.85);
        assert_eq!(f32::from_bits(w[6]), -2.06);
        assert_eq!(KernelScalars::from_words(w), s);
    }

    #[test]
    fn test_scalar_limits() {
        assert!(KernelScalars::new(&index(), 1, 1, 0, 1, 1.0, 0.0).is_err());
        assert!(KernelScalars::new(&index(), 1, 1, 65_536, 1, 1.0, 0.0).is_err());
        assert!(KernelScalars::new(&index(), 1, 1, 8, 70_000, 1.0, 0.0).is_err());
        let s = KernelScalars::new(&index(), 1, 1, 8, 1, 1.0, 0.0).unwrap();
        assert_eq!(s.with_batch_width(64).unwrap().n, 64);
        assert!(s.with_batch_width(0).is_err());
    }

    #[test]
    fn test_cpu_backend_end_to_end() {
        let a = CsrMatrix::from_triplets(3, 4, vec![(0, 0, 1.0), (0, 3, 2.0), (2, 1, -1.0)])
            .unwrap();
        let (m, k, n) = (3, 4, 9);
        let b = DenseMatrix::harness_operand_b(k, n);
        let c = DenseMatrix::harness_accumulator_c(m, n);
        let idx = index();
        let sparse = SparseChannels::pack(&vec![vec![0u64; 40]; 8], 40, 1024).unwrap();
        let b_bufs = encode_operand_b(&b, BChannelCount::Four, 1024).unwrap();
        let c_bufs = encode_accumulator_c(&c, 1024).unwrap();

        let launch = KernelLaunch {
            scalars: KernelScalars::new(&idx, m, k, n, 1, 0.5, 2.0).unwrap(),
            b_channels: BChannelCount::Four,
            window_index: &idx,
            sparse: &sparse,
            b: &b_bufs,
            c_in: &c_bufs,
        };
        let out = execute(&CpuBackend::new(a.clone()), &launch, 1024).unwrap();

        let mut expected = c.clone();
        spmm_reference(0.5, &a, &b, 2.0, &mut expected).unwrap();
        assert_eq!(out, expected.to_layout(Layout::ColMajor));
    }

    #[test]
    fn test_cpu_backend_rejects_wrong_shape() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 1.0)]).unwrap();
        let idx = index();
        let sparse = SparseChannels::pack(&vec![vec![0u64; 40]; 8], 40, 1024).unwrap();
        let b = encode_operand_b(&DenseMatrix::zeros(3, 8, Layout::ColMajor), BChannelCount::Four, 1024)
            .unwrap();
        let c = encode_accumulator_c(&DenseMatrix::zeros(3, 8, Layout::ColMajor), 1024).unwrap();
        let launch = KernelLaunch {
            scalars: KernelScalars::new(&idx, 3, 3, 8, 1, 1.0, 0.0).unwrap(),
            b_channels: BChannelCount::Four,
            window_index: &idx,
            sparse: &sparse,
            b: &b,
            c_in: &c,
        };
        assert!(matches!(
            execute(&CpuBackend::new(a), &launch, 1024),
            Err(SextansError::ShapeMismatch { .. })
        ));
    }
}
