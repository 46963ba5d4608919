// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Encode/decode of dense operands into channel buffers.

use super::buffers::ChannelBuffers;
use super::strategy::ChannelMap;
use crate::config::BChannelCount;
use crate::error::{Result, SextansError};
use crate::matrix::{DenseMatrix, Layout};

fn encode_with(map: &ChannelMap, m: &DenseMatrix, out: &mut ChannelBuffers<f32>) -> Result<()> {
    if m.dims() != map.dims() {
        let (rows, cols) = map.dims();
        return Err(SextansError::ShapeMismatch {
            expected: vec![rows, cols],
            actual: vec![m.rows(), m.cols()],
        });
    }
    out.ensure_fits(map.num_channels(), map.logical_len())?;

    for col in 0..m.cols() {
        for row in 0..m.rows() {
            let (ch, off) = map.locate_unchecked(row, col);
            out.write(ch, off, m.at(row, col));
        }
    }
    out.set_logical_len(map.logical_len());
    Ok(())
}

fn decode_with(map: &ChannelMap, bufs: &ChannelBuffers<f32>, out: &mut DenseMatrix) -> Result<()> {
    if out.dims() != map.dims() {
        let (rows, cols) = map.dims();
        return Err(SextansError::ShapeMismatch {
            expected: vec![rows, cols],
            actual: vec![out.rows(), out.cols()],
        });
    }
    bufs.ensure_fits(map.num_channels(), map.logical_len())?;

    for col in 0..out.cols() {
        for row in 0..out.rows() {
            let (ch, off) = map.locate_unchecked(row, col);
            *out.at_mut(row, col) = bufs.read(ch, off);
        }
    }
    Ok(())
}

/// Allocate zeroed buffers sized for operand B (`k x n`).
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `dma_chunk` is zero.
pub fn alloc_operand_b(
    k: usize,
    n: usize,
    channels: BChannelCount,
    dma_chunk: usize,
) -> Result<ChannelBuffers<f32>> {
    let map = ChannelMap::for_operand_b(k, n, channels)?;
    ChannelBuffers::zeroed(map.num_channels(), map.logical_len(), dma_chunk)
}

/// Allocate zeroed buffers sized for the accumulator C (`m x n`).
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `dma_chunk` is zero.
pub fn alloc_accumulator_c(m: usize, n: usize, dma_chunk: usize) -> Result<ChannelBuffers<f32>> {
    let map = ChannelMap::for_accumulator(m, n)?;
    ChannelBuffers::zeroed(map.num_channels(), map.logical_len(), dma_chunk)
}

/// Encode operand B into freshly allocated channel buffers.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `dma_chunk` is zero.
///
/// # Example
///
/// ```rust
/// use sextans_rs::config::BChannelCount;
/// use sextans_rs::layout::encode_operand_b;
/// use sextans_rs::matrix::{DenseMatrix, Layout};
///
/// let b = DenseMatrix::from_fn(2, 3, Layout::RowMajor, |k, n| (k * 3 + n + 1) as f32);
/// let bufs = encode_operand_b(&b, BChannelCount::Eight, 1024).unwrap();
/// assert_eq!(bufs.channel(2).unwrap()[0], 3.0);
/// ```
pub fn encode_operand_b(
    b: &DenseMatrix,
    channels: BChannelCount,
    dma_chunk: usize,
) -> Result<ChannelBuffers<f32>> {
    let mut out = alloc_operand_b(b.rows(), b.cols(), channels, dma_chunk)?;
    encode_operand_b_into(b, channels, &mut out)?;
    Ok(out)
}

/// Encode operand B into caller-provided buffers.
///
/// Only offsets reachable from valid `(row, col)` pairs are written.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the buffers have the wrong channel count or
/// are too small.
pub fn encode_operand_b_into(
    b: &DenseMatrix,
    channels: BChannelCount,
    out: &mut ChannelBuffers<f32>,
) -> Result<()> {
    let map = ChannelMap::for_operand_b(b.rows(), b.cols(), channels)?;
    tracing::debug!(
        "Encoding B {}x{} over {} channels (stride {})",
        b.rows(),
        b.cols(),
        map.num_channels(),
        map.stride()
    );
    encode_with(&map, b, out)
}

/// Decode operand B (`k x n`, column-major) from channel buffers.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the buffers cannot hold a `k x n` operand.
pub fn decode_operand_b(
    bufs: &ChannelBuffers<f32>,
    k: usize,
    n: usize,
    channels: BChannelCount,
) -> Result<DenseMatrix> {
    let map = ChannelMap::for_operand_b(k, n, channels)?;
    let mut out = DenseMatrix::zeros(k, n, Layout::ColMajor);
    decode_with(&map, bufs, &mut out)?;
    Ok(out)
}

/// Encode the accumulator C into freshly allocated channel buffers.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `dma_chunk` is zero.
pub fn encode_accumulator_c(c: &DenseMatrix, dma_chunk: usize) -> Result<ChannelBuffers<f32>> {
    let mut out = alloc_accumulator_c(c.rows(), c.cols(), dma_chunk)?;
    encode_accumulator_c_into(c, &mut out)?;
    Ok(out)
}

/// Encode the accumulator C into caller-provided buffers.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the buffers are not eight channels or are too
/// small.
pub fn encode_accumulator_c_into(c: &DenseMatrix, out: &mut ChannelBuffers<f32>) -> Result<()> {
    let map = ChannelMap::for_accumulator(c.rows(), c.cols())?;
    tracing::debug!(
        "Encoding C {}x{} (stride {})",
        c.rows(),
        c.cols(),
        map.stride()
    );
    encode_with(&map, c, out)
}

/// Decode an `m x n` result C into a new column-major matrix.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the buffers cannot hold an `m x n` result.
pub fn decode_result_c(bufs: &ChannelBuffers<f32>, m: usize, n: usize) -> Result<DenseMatrix> {
    let mut out = DenseMatrix::zeros(m, n, Layout::ColMajor);
    decode_result_c_into(bufs, &mut out)?;
    Ok(out)
}

/// Decode the result C into a caller-provided matrix of the expected shape.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the buffers cannot hold a matrix of `out`'s
/// shape.
pub fn decode_result_c_into(bufs: &ChannelBuffers<f32>, out: &mut DenseMatrix) -> Result<()> {
    let map = ChannelMap::for_accumulator(out.rows(), out.cols())?;
    tracing::debug!("Decoding C {}x{}", out.rows(), out.cols());
    decode_with(&map, bufs, out)
}
