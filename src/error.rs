// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Error types for sextans-rs.

use thiserror::Error;

/// Result type alias for sextans-rs operations.
pub type Result<T> = std::result::Result<T, SextansError>;

/// Errors that can occur in sextans-rs operations.
///
/// Every error is deterministic given its inputs. Nothing in the crate
/// retries; the caller decides whether to abort or resubmit corrected inputs.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SextansError {
    /// Non-positive or inconsistent sizing parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Window index violates its shape or monotonicity invariants.
    #[error("malformed window index: {0}")]
    MalformedIndex(String),

    /// Logical coordinate outside the declared bounds.
    #[error("index ({row}, {col}) out of range for {rows}x{cols}")]
    IndexOutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Declared row count
        rows: usize,
        /// Declared column count
        cols: usize,
    },

    /// Shape mismatch.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        actual: Vec<usize>,
    },

    /// Sparse matrix structure is inconsistent.
    #[error("malformed sparse matrix: {0}")]
    MalformedMatrix(String),

    /// Input file could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Candle error.
    #[error("candle error: {0}")]
    Candle(#[from] candle_core::Error),
}

impl SextansError {
    /// Shorthand for [`SextansError::InvalidConfiguration`].
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
