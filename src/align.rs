//! Padding and partitioning arithmetic shared by the layout codec and the
//! performance model.

use crate::error::{Result, SextansError};

/// PE-group granularity: words per work unit per channel.
pub const PE_GROUP: usize = 8;

/// Row/column tiling granularity.
pub const TILE: usize = 16;

/// DMA transfer granularity in elements.
pub const DMA_CHUNK: usize = 1024;

/// Batch columns consumed per accelerator pass.
pub const PASS_WIDTH: usize = 8;

/// Round `x` up to a multiple of `boundary`.
///
/// Returns the smallest multiple of `boundary` that is `>= max(x, 1)`, so an
/// empty extent still occupies one boundary-sized block.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `boundary` is zero or the padded
/// value overflows `usize`.
///
/// # Example
///
/// ```rust
/// use sextans_rs::align::pad_to;
///
/// assert_eq!(pad_to(3, 16).unwrap(), 16);
/// assert_eq!(pad_to(0, 8).unwrap(), 8);
/// assert_eq!(pad_to(1024, 1024).unwrap(), 1024);
/// ```
pub fn pad_to(x: usize, boundary: usize) -> Result<usize> {
    if boundary == 0 {
        return Err(SextansError::config("padding boundary must be positive"));
    }
    x.max(1)
        .div_ceil(boundary)
        .checked_mul(boundary)
        .ok_or_else(|| SextansError::config(format!("{x} padded to {boundary} overflows")))
}

/// Number of column windows needed to cover `total_cols`.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `window_size` is zero.
pub fn num_windows(total_cols: usize, window_size: usize) -> Result<usize> {
    if window_size == 0 {
        return Err(SextansError::config("window size must be positive"));
    }
    Ok(total_cols.div_ceil(window_size))
}

/// Number of accelerator passes needed for a batch of `n` dense columns.
#[must_use]
pub const fn num_passes(n: usize) -> usize {
    n.div_ceil(PASS_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_to_boundaries() {
        assert_eq!(pad_to(1, 8).unwrap(), 8);
        assert_eq!(pad_to(8, 8).unwrap(), 8);
        assert_eq!(pad_to(9, 8).unwrap(), 16);
        assert_eq!(pad_to(17, 16).unwrap(), 32);
        assert_eq!(pad_to(1025, DMA_CHUNK).unwrap(), 2048);
    }

    #[test]
    fn test_pad_to_zero_occupies_one_block() {
        assert_eq!(pad_to(0, 16).unwrap(), 16);
    }

    #[test]
    fn test_pad_to_properties() {
        for b in [1, 8, 16, 1024] {
            let mut prev = 0;
            for x in 0..3000 {
                let p = pad_to(x, b).unwrap();
                assert!(p >= x);
                assert_eq!(p % b, 0);
                assert!(p >= prev, "pad_to must be monotonic");
                prev = p;
            }
        }
    }

    #[test]
    fn test_pad_to_overflow() {
        assert!(matches!(
            pad_to(usize::MAX, 16),
            Err(SextansError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_pad_to_zero_boundary() {
        assert!(matches!(
            pad_to(5, 0),
            Err(SextansError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_num_windows() {
        assert_eq!(num_windows(4096, 4096).unwrap(), 1);
        assert_eq!(num_windows(4097, 4096).unwrap(), 2);
        assert_eq!(num_windows(0, 4096).unwrap(), 0);
        assert!(matches!(
            num_windows(10, 0),
            Err(SextansError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_num_passes() {
        assert_eq!(num_passes(8), 1);
        assert_eq!(num_passes(9), 2);
        assert_eq!(num_passes(512), 64);
    }
}
