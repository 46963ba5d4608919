// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Compressed sparse row matrix and the CPU reference SpMM.

use super::dense::{DenseMatrix, Layout};
use crate::error::{Result, SextansError};

/// Sparse matrix A in CSR form (`rows x cols`, `nnz` stored values).
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f32>,
}

impl CsrMatrix {
    /// Build from raw CSR arrays after checking their structure.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMatrix` if:
    /// - `row_ptr` does not have `rows + 1` entries
    /// - `row_ptr` does not start at 0, decreases, or does not end at `nnz`
    /// - `col_idx` and `values` lengths differ
    /// - any column index is `>= cols`
    pub fn new(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f32>,
    ) -> Result<Self> {
        if row_ptr.len() != rows + 1 {
            return Err(SextansError::MalformedMatrix(format!(
                "row_ptr has {} entries, expected {}",
                row_ptr.len(),
                rows + 1
            )));
        }
        if col_idx.len() != values.len() {
            return Err(SextansError::MalformedMatrix(format!(
                "{} column indices but {} values",
                col_idx.len(),
                values.len()
            )));
        }
        if row_ptr[0] != 0 || row_ptr[rows] != values.len() {
            return Err(SextansError::MalformedMatrix(format!(
                "row_ptr must span [0, {}], got [{}, {}]",
                values.len(),
                row_ptr[0],
                row_ptr[rows]
            )));
        }
        if row_ptr.windows(2).any(|w| w[1] < w[0]) {
            return Err(SextansError::MalformedMatrix(
                "row_ptr is not monotonic".into(),
            ));
        }
        if let Some(&bad) = col_idx.iter().find(|&&c| c >= cols) {
            return Err(SextansError::MalformedMatrix(format!(
                "column index {bad} out of range for {cols} columns"
            )));
        }
        Ok(Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Build from `(row, col, value)` triplets. Duplicates are summed.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMatrix` if any coordinate lies outside the shape.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        mut triplets: Vec<(usize, usize, f32)>,
    ) -> Result<Self> {
        if let Some(&(r, c, _)) = triplets.iter().find(|&&(r, c, _)| r >= rows || c >= cols) {
            return Err(SextansError::MalformedMatrix(format!(
                "entry ({r}, {c}) out of range for {rows}x{cols}"
            )));
        }
        triplets.sort_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values: Vec<f32> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;
        for (r, c, v) in triplets {
            if last == Some((r, c)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            row_ptr[r + 1] += 1;
            col_idx.push(c);
            values.push(v);
            last = Some((r, c));
        }
        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }
        Self::new(rows, cols, row_ptr, col_idx, values)
    }

    /// Row count (M).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count (K).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Stored non-zeros.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Row pointer array (`rows + 1` entries).
    #[must_use]
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    /// Column index array.
    #[must_use]
    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    /// Value array.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Dense copy, mainly for cross-checking.
    #[must_use]
    pub fn to_dense(&self, layout: Layout) -> DenseMatrix {
        let mut dense = DenseMatrix::zeros(self.rows, self.cols, layout);
        for r in 0..self.rows {
            for p in self.row_ptr[r]..self.row_ptr[r + 1] {
                *dense.at_mut(r, self.col_idx[p]) += self.values[p];
            }
        }
        dense
    }
}

/// CPU reference: `C = alpha * A * B + beta * C`, in place.
///
/// `b` is `K x N`, `c` is `M x N`; either memory order is accepted.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the operand shapes are incompatible.
pub fn spmm_reference(
    alpha: f32,
    a: &CsrMatrix,
    b: &DenseMatrix,
    beta: f32,
    c: &mut DenseMatrix,
) -> Result<()> {
    if b.rows() != a.cols() || c.rows() != a.rows() || c.cols() != b.cols() {
        return Err(SextansError::ShapeMismatch {
            expected: vec![a.rows(), a.cols(), b.cols()],
            actual: vec![c.rows(), b.rows(), c.cols()],
        });
    }
    tracing::debug!(
        "Reference SpMM: A {}x{} (nnz={}), N={}",
        a.rows(),
        a.cols(),
        a.nnz(),
        b.cols()
    );

    for n in 0..b.cols() {
        for m in 0..a.rows() {
            let mut acc = 0.0f32;
            for p in a.row_ptr[m]..a.row_ptr[m + 1] {
                acc += a.values[p] * b.at(a.col_idx[p], n);
            }
            let out = c.at_mut(m, n);
            *out = alpha * acc + beta * *out;
        }
    }
    Ok(())
}
