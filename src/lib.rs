//! # sextans-rs
//!
//! Host-side support for a multi-channel HBM sparse-dense matrix multiply
//! accelerator computing `C = alpha * A * B + beta * C`.
//!
//! The crate covers everything that happens around the device:
//!
//! - Window index handling for the pre-tiled sparse operand
//! - Channel-interleaved encoding of B and C, and decoding of the result
//! - An analytical latency model for the streaming pipeline
//! - Result comparison and throughput metrics
//!
//! ## Status
//!
//! The device is reached through the [`kernel::KernelBackend`] trait. The
//! bundled [`kernel::CpuBackend`] executes the same contract on the host so
//! the full encode, run, decode and compare path can be exercised anywhere.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sextans_rs::config::{AcceleratorConfig, BChannelCount};
//! use sextans_rs::{decode_result_c, encode_operand_b};
//!
//! let config = AcceleratorConfig::for_u280();
//! let b_bufs = encode_operand_b(&b, config.b_channels, config.dma_chunk)?;
//! // ... launch ...
//! let c = decode_result_c(&c_out, m, n)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

pub mod align;
pub mod compare;
pub mod config;
pub mod error;
pub mod kernel;
pub mod layout;
pub mod matrix;
pub mod metrics;
pub mod model;
pub mod tiled;
pub mod window;

pub use compare::{compare_results, Comparison};
pub use config::{AcceleratorConfig, BChannelCount};
pub use error::{Result, SextansError};
pub use layout::{decode_result_c, encode_accumulator_c, encode_operand_b, ChannelBuffers};
pub use model::{estimate_performance, PerformanceEstimate, PerformanceModel};
pub use window::WindowIndex;
