// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Channel-interleaved layout codec.
//!
//! The accelerator reads every operand through independent HBM channels.
//! This module repacks logical matrices into the padded, channel-major
//! buffers its PEs expect, and reads results back.
//!
//! ## Module Structure
//!
//! - [`buffers`] - Zero-filled, DMA-aligned per-channel storage
//! - [`strategy`] - Interleave patterns keyed on channel count
//! - [`codec`] - Encode/decode for operand B and accumulator C
//! - [`sparse`] - Aligned packing of the pre-tiled sparse operand
//!
//! ## Concurrency
//!
//! Every logical element maps to exactly one physical offset and each
//! channel is a separate allocation. One encode pass must complete before
//! any decode of the same buffers starts.

pub mod buffers;
pub mod codec;
pub mod sparse;
pub mod strategy;

pub use buffers::ChannelBuffers;
pub use codec::{
    alloc_accumulator_c, alloc_operand_b, decode_operand_b, decode_result_c,
    decode_result_c_into, encode_accumulator_c, encode_accumulator_c_into, encode_operand_b,
    encode_operand_b_into,
};
pub use sparse::{SparseChannels, SPARSE_CHANNELS};
pub use strategy::{ChannelLayout, ChannelMap, EightChannel, FourChannel};
