// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Accelerator configuration constants.
//!
//! Clock frequency, effective bandwidth, channel counts and window size are
//! properties of the built accelerator. They are supplied, never derived.

use crate::align::DMA_CHUNK;
use crate::error::{Result, SextansError};

/// Number of HBM channels serving dense operand B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BChannelCount {
    /// Four channels, each holding two interleaved column parities.
    #[default]
    Four,
    /// Eight channels, one column per channel.
    Eight,
}

impl BChannelCount {
    /// Channel count as an integer.
    #[must_use]
    pub const fn get(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Parse a raw channel count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for anything other than 4 or 8.
    pub fn from_count(count: usize) -> Result<Self> {
        match count {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(SextansError::config(format!(
                "B channel count must be 4 or 8, got {other}"
            ))),
        }
    }
}

/// Configuration of the target accelerator.
///
/// # Example
///
/// ```rust
/// use sextans_rs::config::AcceleratorConfig;
///
/// let config = AcceleratorConfig::for_u280();
/// assert!(config.validate().is_ok());
///
/// let tuned = AcceleratorConfig::default().with_peak_bandwidth(460e9, 0.9);
/// assert!((tuned.bandwidth_bytes_per_sec - 414e9).abs() < 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AcceleratorConfig {
    /// Kernel clock in Hz.
    pub frequency_hz: f64,

    /// Effective memory bandwidth in bytes/second (already derated from
    /// nominal peak).
    pub bandwidth_bytes_per_sec: f64,

    /// Channels carrying the pre-tiled sparse operand A.
    pub sparse_channels: usize,

    /// Channels carrying dense operand B.
    pub b_channels: BChannelCount,

    /// Channels carrying the accumulator / result C.
    pub c_channels: usize,

    /// Columns of B per streaming window.
    pub window_size: usize,

    /// Sub-window cycles per window.
    pub cycles_per_window: usize,

    /// Processing elements.
    pub num_pes: usize,

    /// DMA chunk granularity in elements. Must be a power of 2.
    pub dma_chunk: usize,
}

/// Share of nominal HBM bandwidth observed in practice.
pub const DEFAULT_BANDWIDTH_EFFICIENCY: f64 = 0.9;

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self::for_u280()
    }
}

impl AcceleratorConfig {
    /// Reference Alveo U280 build: 350 MHz, 900 GB/s HBM at 90%.
    #[must_use]
    pub fn for_u280() -> Self {
        Self {
            frequency_hz: 350e6,
            bandwidth_bytes_per_sec: 900e9 * DEFAULT_BANDWIDTH_EFFICIENCY,
            sparse_channels: 8,
            b_channels: BChannelCount::Four,
            c_channels: 8,
            window_size: 4096,
            cycles_per_window: 1,
            num_pes: 64,
            dma_chunk: DMA_CHUNK,
        }
    }

    /// Alveo U50 build: 316 GB/s HBM at 90%, eight B channels.
    #[must_use]
    pub fn for_u50() -> Self {
        Self {
            bandwidth_bytes_per_sec: 316e9 * DEFAULT_BANDWIDTH_EFFICIENCY,
            b_channels: BChannelCount::Eight,
            ..Self::for_u280()
        }
    }

    /// Replace the effective bandwidth with `peak * efficiency`.
    #[must_use]
    pub fn with_peak_bandwidth(self, peak_bytes_per_sec: f64, efficiency: f64) -> Self {
        Self {
            bandwidth_bytes_per_sec: peak_bytes_per_sec * efficiency,
            ..self
        }
    }

    /// Validate configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if:
    /// - frequency or bandwidth is not a positive finite number
    /// - window size, cycles per window or PE count is zero
    /// - sparse or C channel count is not 8
    /// - `dma_chunk` is not a power of 2
    pub fn validate(&self) -> Result<()> {
        if !(self.frequency_hz.is_finite() && self.frequency_hz > 0.0) {
            return Err(SextansError::config(format!(
                "frequency {} Hz must be positive",
                self.frequency_hz
            )));
        }
        if !(self.bandwidth_bytes_per_sec.is_finite() && self.bandwidth_bytes_per_sec > 0.0) {
            return Err(SextansError::config(format!(
                "bandwidth {} B/s must be positive",
                self.bandwidth_bytes_per_sec
            )));
        }
        if self.window_size == 0 {
            return Err(SextansError::config("window_size must be positive"));
        }
        if self.cycles_per_window == 0 {
            return Err(SextansError::config("cycles_per_window must be positive"));
        }
        if self.num_pes == 0 {
            return Err(SextansError::config("num_pes must be positive"));
        }
        if self.sparse_channels != 8 {
            return Err(SextansError::config(format!(
                "sparse channel count must be 8, got {}",
                self.sparse_channels
            )));
        }
        if self.c_channels != 8 {
            return Err(SextansError::config(format!(
                "C channel count must be 8, got {}",
                self.c_channels
            )));
        }
        if !self.dma_chunk.is_power_of_two() {
            return Err(SextansError::config(format!(
                "dma_chunk {} must be power of 2",
                self.dma_chunk
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = AcceleratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.b_channels.get(), 4);
    }

    #[test]
    fn test_u50_config_valid() {
        let config = AcceleratorConfig::for_u50();
        assert!(config.validate().is_ok());
        assert_eq!(config.b_channels, BChannelCount::Eight);
    }

    #[test]
    fn test_invalid_window_size() {
        let config = AcceleratorConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SextansError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_invalid_frequency() {
        let config = AcceleratorConfig {
            frequency_hz: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_dma_chunk() {
        let config = AcceleratorConfig {
            dma_chunk: 1000, // Not power of 2
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_b_channel_count_parse() {
        assert_eq!(BChannelCount::from_count(4).unwrap(), BChannelCount::Four);
        assert_eq!(BChannelCount::from_count(8).unwrap(), BChannelCount::Eight);
        assert!(BChannelCount::from_count(6).is_err());
    }
}
