// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Packing of the pre-tiled sparse operand into aligned channel buffers.
//!
//! The tiling itself comes from an external tool. This module only copies
//! each channel's words into a zero-padded, DMA-aligned buffer and keeps the
//! logical length alongside, so padding is never read as data.

use super::buffers::ChannelBuffers;
use crate::error::{Result, SextansError};

/// Sparse channels carried by the accelerator.
pub const SPARSE_CHANNELS: usize = 8;

/// Pre-tiled sparse operand A, one 64-bit word stream per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseChannels {
    buffers: ChannelBuffers<u64>,
}

impl SparseChannels {
    /// Pack tiled channel words, keeping the first `logical_len` words of
    /// each channel and zero-padding to the DMA boundary.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if there are not exactly eight channels or a
    /// channel is shorter than `logical_len`, and `InvalidConfiguration` if
    /// `dma_chunk` is zero.
    pub fn pack(channels: &[Vec<u64>], logical_len: usize, dma_chunk: usize) -> Result<Self> {
        if channels.len() != SPARSE_CHANNELS {
            return Err(SextansError::ShapeMismatch {
                expected: vec![SPARSE_CHANNELS],
                actual: vec![channels.len()],
            });
        }
        if let Some(short) = channels.iter().find(|ch| ch.len() < logical_len) {
            return Err(SextansError::ShapeMismatch {
                expected: vec![logical_len],
                actual: vec![short.len()],
            });
        }

        let mut buffers = ChannelBuffers::zeroed(SPARSE_CHANNELS, logical_len, dma_chunk)?;
        for (c, words) in channels.iter().enumerate() {
            if let Some(dst) = buffers.channel_mut(c) {
                dst[..logical_len].copy_from_slice(&words[..logical_len]);
            }
        }
        tracing::debug!(
            "Packed sparse operand: {} words/channel, {} allocated",
            logical_len,
            buffers.chunk_len()
        );
        Ok(Self { buffers })
    }

    /// Words per channel that carry tiled data.
    #[must_use]
    pub fn logical_len(&self) -> usize {
        self.buffers.logical_len()
    }

    /// Underlying aligned buffers.
    #[must_use]
    pub fn buffers(&self) -> &ChannelBuffers<u64> {
        &self.buffers
    }

    /// Data words of channel `c`, without padding.
    #[must_use]
    pub fn words(&self, c: usize) -> Option<&[u64]> {
        self.buffers.logical(c)
    }
}
