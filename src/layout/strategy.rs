// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Channel interleave patterns.
//!
//! A dense `rows x cols` matrix is split into passes of 8 columns. Within a
//! pass, each channel owns a column-major strip of `stride` elements:
//!
//! ```text
//! eight channels: col n -> channel n % 8
//!                 offset = row + stride * (n / 8),      stride = pad16(rows)
//!
//! four channels:  col n -> channel (n / 2) % 4
//!                 offset = (row / 8) * 16 + (n % 2) * 8 + row % 8
//!                        + stride * (n / 8),            stride = 2 * pad8(rows)
//! ```
//!
//! In the four-channel pattern a channel holds two neighbouring columns,
//! interleaved in 8-row blocks by column parity.

use std::fmt;

use crate::align::{num_passes, pad_to, PASS_WIDTH, PE_GROUP, TILE};
use crate::config::BChannelCount;
use crate::error::{Result, SextansError};

/// Placement rule from logical `(row, col)` to physical `(channel, offset)`.
pub trait ChannelLayout: Send + Sync + fmt::Debug {
    /// Number of channels the pattern spreads columns over.
    fn num_channels(&self) -> usize;

    /// Elements each channel reserves per pass for a matrix of `rows` rows.
    ///
    /// # Errors
    ///
    /// Inherits `pad_to` contract violations.
    fn column_stride(&self, rows: usize) -> Result<usize>;

    /// Physical position of `(row, col)` given a precomputed stride.
    /// Callers must keep `row` below the row count the stride was built for.
    fn locate(&self, row: usize, col: usize, stride: usize) -> (usize, usize);
}

/// One column per channel, eight channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct EightChannel;

impl ChannelLayout for EightChannel {
    fn num_channels(&self) -> usize {
        8
    }

    fn column_stride(&self, rows: usize) -> Result<usize> {
        pad_to(rows, TILE)
    }

    #[inline]
    fn locate(&self, row: usize, col: usize, stride: usize) -> (usize, usize) {
        (col % 8, row + stride * (col / PASS_WIDTH))
    }
}

/// Two parity-interleaved columns per channel, four channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct FourChannel;

impl ChannelLayout for FourChannel {
    fn num_channels(&self) -> usize {
        4
    }

    fn column_stride(&self, rows: usize) -> Result<usize> {
        Ok(pad_to(rows, PE_GROUP)? * 2)
    }

    #[inline]
    fn locate(&self, row: usize, col: usize, stride: usize) -> (usize, usize) {
        let channel = (col / 2) % 4;
        let offset = (row / PE_GROUP) * (2 * PE_GROUP)
            + (col % 2) * PE_GROUP
            + row % PE_GROUP
            + stride * (col / PASS_WIDTH);
        (channel, offset)
    }
}

/// Layout for operand B with the given channel count.
#[must_use]
pub fn operand_b_layout(channels: BChannelCount) -> &'static dyn ChannelLayout {
    match channels {
        BChannelCount::Four => &FourChannel,
        BChannelCount::Eight => &EightChannel,
    }
}

/// Layout for the accumulator / result C (always eight channels).
#[must_use]
pub fn accumulator_layout() -> &'static dyn ChannelLayout {
    &EightChannel
}

/// A layout bound to concrete matrix dimensions.
#[derive(Debug, Clone, Copy)]
pub struct ChannelMap {
    layout: &'static dyn ChannelLayout,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl ChannelMap {
    /// Bind `layout` to a `rows x cols` matrix.
    ///
    /// # Errors
    ///
    /// Inherits `column_stride` errors.
    pub fn new(layout: &'static dyn ChannelLayout, rows: usize, cols: usize) -> Result<Self> {
        let stride = layout.column_stride(rows)?;
        Ok(Self {
            layout,
            rows,
            cols,
            stride,
        })
    }

    /// Map for a `k x n` operand B.
    ///
    /// # Errors
    ///
    /// Inherits `column_stride` errors.
    pub fn for_operand_b(k: usize, n: usize, channels: BChannelCount) -> Result<Self> {
        Self::new(operand_b_layout(channels), k, n)
    }

    /// Map for an `m x n` accumulator C.
    ///
    /// # Errors
    ///
    /// Inherits `column_stride` errors.
    pub fn for_accumulator(m: usize, n: usize) -> Result<Self> {
        Self::new(accumulator_layout(), m, n)
    }

    /// Number of channels.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.layout.num_channels()
    }

    /// Per-pass channel stride.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// `(rows, cols)` of the bound matrix.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Elements per channel that can hold data: `stride * ceil(cols / 8)`.
    #[must_use]
    pub fn logical_len(&self) -> usize {
        self.stride * num_passes(self.cols)
    }

    /// Physical `(channel, offset)` of `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside `[0, rows) x [0, cols)`.
    pub fn locate(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        if row >= self.rows || col >= self.cols {
            return Err(SextansError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.layout.locate(row, col, self.stride))
    }

    #[inline]
    pub(crate) fn locate_unchecked(&self, row: usize, col: usize) -> (usize, usize) {
        self.layout.locate(row, col, self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_eight_channel_positions() {
        let map = ChannelMap::for_operand_b(3, 20, BChannelCount::Eight).unwrap();
        assert_eq!(map.stride(), 16);
        assert_eq!(map.locate(0, 0).unwrap(), (0, 0));
        assert_eq!(map.locate(2, 7).unwrap(), (7, 2));
        assert_eq!(map.locate(1, 9).unwrap(), (1, 1 + 16));
        assert_eq!(map.logical_len(), 16 * 3);
    }

    #[test]
    fn test_four_channel_positions() {
        let map = ChannelMap::for_operand_b(10, 16, BChannelCount::Four).unwrap();
        assert_eq!(map.stride(), 32);
        // col 1 -> channel 0, parity 1
        assert_eq!(map.locate(0, 1).unwrap(), (0, 8));
        // row 9 -> block 1, lane 1
        assert_eq!(map.locate(9, 0).unwrap(), (0, 16 + 1));
        assert_eq!(map.locate(9, 3).unwrap(), (1, 16 + 8 + 1));
        // col 8 starts the next pass
        assert_eq!(map.locate(0, 8).unwrap(), (0, 32));
        assert_eq!(map.locate(0, 15).unwrap(), (3, 32 + 8));
    }

    #[test]
    fn test_locate_out_of_range() {
        let map = ChannelMap::for_accumulator(4, 8).unwrap();
        assert!(matches!(
            map.locate(4, 0),
            Err(SextansError::IndexOutOfRange { row: 4, .. })
        ));
        assert!(map.locate(0, 8).is_err());
    }

    #[test]
    fn test_layouts_are_injective() {
        for map in [
            ChannelMap::for_operand_b(13, 19, BChannelCount::Four).unwrap(),
            ChannelMap::for_operand_b(13, 19, BChannelCount::Eight).unwrap(),
            ChannelMap::for_accumulator(33, 17).unwrap(),
        ] {
            let (rows, cols) = map.dims();
            let mut seen = HashSet::new();
            for c in 0..cols {
                for r in 0..rows {
                    let (ch, off) = map.locate(r, c).unwrap();
                    assert!(ch < map.num_channels());
                    assert!(off < map.logical_len());
                    assert!(seen.insert((ch, off)), "collision at ({r}, {c})");
                }
            }
        }
    }
}
