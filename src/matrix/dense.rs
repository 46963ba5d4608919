// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Dense matrices with explicit memory order.
//!
//! Logical values are independent of physical layout; `get`/`set` always
//! take `(row, col)`.

use candle_core::{DType, Device, Tensor};

use crate::error::{Result, SextansError};

/// Memory order of a [`DenseMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `data[row * cols + col]`
    RowMajor,
    /// `data[row + rows * col]`
    #[default]
    ColMajor,
}

/// Dense real-valued matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    layout: Layout,
    data: Vec<f32>,
}

impl DenseMatrix {
    /// Zero-filled matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize, layout: Layout) -> Self {
        Self {
            rows,
            cols,
            layout,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap existing storage.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, layout: Layout, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(SextansError::ShapeMismatch {
                expected: vec![rows * cols],
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            rows,
            cols,
            layout,
            data,
        })
    }

    /// Build a matrix by evaluating `f(row, col)` for every element.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        layout: Layout,
        mut f: impl FnMut(usize, usize) -> f32,
    ) -> Self {
        let mut m = Self::zeros(rows, cols, layout);
        for col in 0..cols {
            for row in 0..rows {
                let pos = m.offset(row, col);
                m.data[pos] = f(row, col);
            }
        }
        m
    }

    /// Row count.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Memory order.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Raw storage in this matrix's layout.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        match self.layout {
            Layout::RowMajor => row * self.cols + col,
            Layout::ColMajor => row + self.rows * col,
        }
    }

    fn check(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(SextansError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Value at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside `[0, rows) x [0, cols)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        self.check(row, col)?;
        Ok(self.data[self.offset(row, col)])
    }

    /// Store `value` at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside `[0, rows) x [0, cols)`.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        self.check(row, col)?;
        let pos = self.offset(row, col);
        self.data[pos] = value;
        Ok(())
    }

    /// Unchecked accessor for callers iterating within bounds.
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> f32 {
        self.data[self.offset(row, col)]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, row: usize, col: usize) -> &mut f32 {
        let pos = self.offset(row, col);
        &mut self.data[pos]
    }

    /// Same values in a different memory order.
    #[must_use]
    pub fn to_layout(&self, layout: Layout) -> Self {
        if layout == self.layout {
            return self.clone();
        }
        Self::from_fn(self.rows, self.cols, layout, |r, c| self.at(r, c))
    }

    /// Build from a 2D candle tensor (converted to `f32`).
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the tensor is not 2D, or a candle error
    /// if the conversion fails.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self> {
        let dims = tensor.dims();
        let &[rows, cols] = dims else {
            return Err(SextansError::ShapeMismatch {
                expected: vec![0, 0],
                actual: dims.to_vec(),
            });
        };
        let data: Vec<f32> = tensor.to_dtype(DType::F32)?.flatten_all()?.to_vec1()?;
        Self::from_vec(rows, cols, Layout::RowMajor, data)
    }

    /// Copy into a 2D candle tensor of shape `(rows, cols)`.
    ///
    /// # Errors
    ///
    /// Returns a candle error if tensor creation fails.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        let row_major = self.to_layout(Layout::RowMajor);
        Ok(Tensor::from_vec(
            row_major.data,
            (self.rows, self.cols),
            device,
        )?)
    }

    /// Deterministic multiplicand used by the host harness:
    /// `B[k, n] = (1 + k) + 0.1 * (1 + n)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn harness_operand_b(k: usize, n: usize) -> Self {
        Self::from_fn(k, n, Layout::ColMajor, |kk, nn| {
            (1.0 + kk as f32) + 0.1 * (1.0 + nn as f32)
        })
    }

    /// Deterministic accumulator used by the host harness:
    /// `C[m, n] = (m + 1) * (n + 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn harness_accumulator_c(m: usize, n: usize) -> Self {
        Self::from_fn(m, n, Layout::ColMajor, |mm, nn| {
            (mm as f32 + 1.0) * (nn as f32 + 1.0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let rm = DenseMatrix::from_vec(2, 3, Layout::RowMajor, vec![1., 2., 3., 4., 5., 6.])
            .unwrap();
        assert_eq!(rm.get(0, 2).unwrap(), 3.0);
        assert_eq!(rm.get(1, 0).unwrap(), 4.0);

        let cm = rm.to_layout(Layout::ColMajor);
        assert_eq!(cm.as_slice(), &[1., 4., 2., 5., 3., 6.]);
        assert_eq!(cm.get(1, 2).unwrap(), 6.0);
    }

    #[test]
    fn test_out_of_range() {
        let mut m = DenseMatrix::zeros(2, 2, Layout::ColMajor);
        assert!(matches!(
            m.get(2, 0),
            Err(SextansError::IndexOutOfRange { row: 2, .. })
        ));
        assert!(m.set(0, 5, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_length_check() {
        assert!(DenseMatrix::from_vec(2, 2, Layout::RowMajor, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_tensor_interop() -> Result<()> {
        let m = DenseMatrix::from_fn(3, 4, Layout::ColMajor, |r, c| (r * 10 + c) as f32);
        let t = m.to_tensor(&Device::Cpu)?;
        assert_eq!(t.dims(), &[3, 4]);
        let back = DenseMatrix::from_tensor(&t)?;
        assert_eq!(back.get(2, 3)?, 23.0);
        assert_eq!(back.layout(), Layout::RowMajor);
        Ok(())
    }

    #[test]
    fn test_harness_generators() {
        let b = DenseMatrix::harness_operand_b(4, 2);
        assert!((b.get(0, 0).unwrap() - 1.1).abs() < 1e-6);
        assert!((b.get(3, 1).unwrap() - 4.2).abs() < 1e-6);
        let c = DenseMatrix::harness_accumulator_c(3, 2);
        assert_eq!(c.get(2, 1).unwrap(), 6.0);
    }
}
