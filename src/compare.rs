//! Elementwise comparison of a reference result against accelerator output.

use crate::error::{Result, SextansError};
use crate::matrix::DenseMatrix;

/// Added to the denominator of the relative error.
pub const RELATIVE_EPSILON: f32 = 1e-4;

/// Relative error above which an element counts as a mismatch.
pub const MISMATCH_THRESHOLD: f32 = 1e-4;

/// A run passes while fewer than this percentage of elements mismatch.
pub const PASS_PERCENT: f32 = 2.0;

/// Outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Elements whose relative error exceeds [`MISMATCH_THRESHOLD`].
    pub mismatch_count: usize,
    /// `100 * mismatch_count / total`.
    pub mismatch_percent: f32,
    /// Elements compared.
    pub total: usize,
    /// Largest relative error seen.
    pub max_relative_error: f32,
    /// `mismatch_percent < PASS_PERCENT`.
    pub pass: bool,
}

/// Relative error `|r - c| / (min(|r|, |c|) + eps)`.
#[inline]
#[must_use]
pub fn relative_error(reference: f32, candidate: f32) -> f32 {
    let diff = (reference - candidate).abs();
    diff / (reference.abs().min(candidate.abs()) + RELATIVE_EPSILON)
}

/// Compare two flat value sequences of equal length.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the lengths differ.
#[allow(clippy::cast_precision_loss)]
pub fn compare_slices(reference: &[f32], candidate: &[f32]) -> Result<Comparison> {
    if reference.len() != candidate.len() {
        return Err(SextansError::ShapeMismatch {
            expected: vec![reference.len()],
            actual: vec![candidate.len()],
        });
    }

    let mut mismatch_count = 0usize;
    let mut max_relative_error = 0.0f32;
    for (&r, &c) in reference.iter().zip(candidate) {
        let err = relative_error(r, c);
        // NaN compares false, so it must be counted explicitly.
        if err > MISMATCH_THRESHOLD || err.is_nan() {
            mismatch_count += 1;
        }
        max_relative_error = max_relative_error.max(err);
    }

    let total = reference.len();
    let mismatch_percent = if total == 0 {
        0.0
    } else {
        100.0 * mismatch_count as f32 / total as f32
    };
    let pass = mismatch_percent < PASS_PERCENT;
    if !pass {
        tracing::warn!(
            "Result mismatch: {} of {} elements ({:.2}%)",
            mismatch_count,
            total,
            mismatch_percent
        );
    }
    Ok(Comparison {
        mismatch_count,
        mismatch_percent,
        total,
        max_relative_error,
        pass,
    })
}

/// Compare a reference C against a decoded accelerator C.
///
/// Memory order may differ; elements are matched by `(row, col)`.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the matrices have different dimensions.
pub fn compare_results(reference: &DenseMatrix, candidate: &DenseMatrix) -> Result<Comparison> {
    if reference.dims() != candidate.dims() {
        return Err(SextansError::ShapeMismatch {
            expected: vec![reference.rows(), reference.cols()],
            actual: vec![candidate.rows(), candidate.cols()],
        });
    }
    tracing::debug!(
        "Comparing {}x{} results",
        reference.rows(),
        reference.cols()
    );
    let candidate = candidate.to_layout(reference.layout());
    compare_slices(reference.as_slice(), candidate.as_slice())
}
