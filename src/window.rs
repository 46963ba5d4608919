//! Windowed work-partition index for the sparse operand.
//!
//! The external tiler splits sparse A into column windows of B, and each
//! window into `cycles_per_window` sub-window cycles. The index is the prefix
//! count of PE-group work units at every cycle boundary:
//!
//! ```text
//! index = [0, w0, w0+w1, ..., total]
//! work_in_cycle(i) = index[i+1] - index[i]
//! ```
//!
//! One work unit is one 8-word PE group per sparse channel.

use crate::align::{pad_to, PE_GROUP, TILE};
use crate::error::{Result, SextansError};

/// Check the shape and monotonicity invariants of a raw window index.
///
/// # Errors
///
/// Returns `MalformedIndex` if the sequence is empty, does not start at
/// zero, or decreases anywhere.
pub fn validate(index: &[u32]) -> Result<()> {
    let Some(&first) = index.first() else {
        return Err(SextansError::MalformedIndex("index is empty".into()));
    };
    if first != 0 {
        return Err(SextansError::MalformedIndex(format!(
            "first entry must be 0, got {first}"
        )));
    }
    if let Some(pos) = index.windows(2).position(|w| w[1] < w[0]) {
        return Err(SextansError::MalformedIndex(format!(
            "entry {} ({}) is less than entry {} ({})",
            pos + 1,
            index[pos + 1],
            pos,
            index[pos]
        )));
    }
    Ok(())
}

/// Validated window prefix-count array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIndex {
    entries: Vec<u32>,
}

impl WindowIndex {
    /// Wrap a raw index after validating it.
    ///
    /// # Errors
    ///
    /// Returns `MalformedIndex` if [`validate`] rejects the entries.
    pub fn new(entries: Vec<u32>) -> Result<Self> {
        validate(&entries)?;
        Ok(Self { entries })
    }

    /// Build an index from per-cycle work counts by prefix summation.
    ///
    /// # Errors
    ///
    /// Returns `MalformedIndex` if the running total overflows `u32`.
    pub fn from_cycle_work(work: &[u32]) -> Result<Self> {
        let mut entries = Vec::with_capacity(work.len() + 1);
        let mut total: u32 = 0;
        entries.push(total);
        for &w in work {
            total = total
                .checked_add(w)
                .ok_or_else(|| SextansError::MalformedIndex("work total overflows u32".into()))?;
            entries.push(total);
        }
        Ok(Self { entries })
    }

    /// Raw entries.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }

    /// Number of entries (cycles + 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated index; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sub-window cycles described.
    #[must_use]
    pub fn num_cycles(&self) -> usize {
        self.entries.len() - 1
    }

    /// Work units processed in cycle `i`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `i + 1 >= len`.
    pub fn work_in_cycle(&self, i: usize) -> Result<u32> {
        work_in_cycle(&self.entries, i)
    }

    /// Number of windows when each window spans `cycles_per_window` cycles.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `cycles_per_window` is zero or does
    /// not evenly divide the cycle count.
    pub fn total_windows(&self, cycles_per_window: usize) -> Result<usize> {
        total_windows(&self.entries, cycles_per_window)
    }

    /// Total work units across all cycles.
    #[must_use]
    pub fn total_work(&self) -> u32 {
        // Validated: non-empty and starts at 0.
        self.entries[self.entries.len() - 1] - self.entries[0]
    }

    /// Logical 64-bit words each sparse channel carries.
    #[must_use]
    pub fn sparse_words_per_channel(&self) -> usize {
        PE_GROUP * self.total_work() as usize
    }

    /// Copy of the index as the device reads it: padded to a multiple of 16
    /// entries, then to the DMA chunk, zero-filled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `dma_chunk` is zero.
    pub fn to_device_words(&self, dma_chunk: usize) -> Result<Vec<u32>> {
        let logical = pad_to(self.entries.len(), TILE)?;
        let mut words = vec![0u32; pad_to(logical, dma_chunk)?];
        words[..self.entries.len()].copy_from_slice(&self.entries);
        Ok(words)
    }
}

/// Work units processed in cycle `i` of a raw index.
///
/// # Errors
///
/// Returns `IndexOutOfRange` if `i + 1 >= index.len()`, and
/// `MalformedIndex` if the index decreases across cycle `i`.
pub fn work_in_cycle(index: &[u32], i: usize) -> Result<u32> {
    if i + 1 >= index.len() {
        return Err(SextansError::IndexOutOfRange {
            row: 0,
            col: i,
            rows: 1,
            cols: index.len().saturating_sub(1),
        });
    }
    index[i + 1].checked_sub(index[i]).ok_or_else(|| {
        SextansError::MalformedIndex(format!(
            "entry {} ({}) is less than entry {i} ({})",
            i + 1,
            index[i + 1],
            index[i]
        ))
    })
}

/// Number of windows in a raw index for the given cycles per window.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if `cycles_per_window` is zero, the index
/// is empty, or the cycle count is not evenly divisible.
pub fn total_windows(index: &[u32], cycles_per_window: usize) -> Result<usize> {
    if cycles_per_window == 0 {
        return Err(SextansError::config("cycles_per_window must be positive"));
    }
    let cycles = index
        .len()
        .checked_sub(1)
        .ok_or_else(|| SextansError::config("window index is empty"))?;
    if cycles % cycles_per_window != 0 {
        return Err(SextansError::config(format!(
            "{cycles} cycles not divisible into windows of {cycles_per_window}"
        )));
    }
    Ok(cycles / cycles_per_window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(
            validate(&[]),
            Err(SextansError::MalformedIndex(_))
        ));
    }

    #[test]
    fn test_validate_rejects_nonzero_start() {
        assert!(matches!(
            validate(&[1, 2, 3]),
            Err(SextansError::MalformedIndex(_))
        ));
    }

    #[test]
    fn test_validate_rejects_decrease() {
        assert!(matches!(
            WindowIndex::new(vec![0, 4, 3]),
            Err(SextansError::MalformedIndex(_))
        ));
    }

    #[test]
    fn test_single_entry_is_valid() {
        let index = WindowIndex::new(vec![0]).unwrap();
        assert_eq!(index.num_cycles(), 0);
        assert_eq!(index.total_work(), 0);
    }

    #[test]
    fn test_work_in_cycle() {
        let index = WindowIndex::new(vec![0, 3, 3, 10]).unwrap();
        assert_eq!(index.work_in_cycle(0).unwrap(), 3);
        assert_eq!(index.work_in_cycle(1).unwrap(), 0);
        assert_eq!(index.work_in_cycle(2).unwrap(), 7);
        assert!(matches!(
            index.work_in_cycle(3),
            Err(SextansError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_raw_work_in_cycle_rejects_decrease() {
        assert_eq!(work_in_cycle(&[0, 2, 5], 1).unwrap(), 3);
        assert!(matches!(
            work_in_cycle(&[0, 5, 2], 1),
            Err(SextansError::MalformedIndex(_))
        ));
        assert!(matches!(
            work_in_cycle(&[0, 5], 1),
            Err(SextansError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_window_coverage() {
        let index = WindowIndex::from_cycle_work(&[5, 0, 12, 1, 9, 4]).unwrap();
        let sum: u32 = (0..index.num_cycles())
            .map(|i| index.work_in_cycle(i).unwrap())
            .sum();
        assert_eq!(sum, index.total_work());
        assert_eq!(sum, 31);
    }

    #[test]
    fn test_total_windows() {
        let index = WindowIndex::from_cycle_work(&[1, 2, 3, 4]).unwrap();
        assert_eq!(index.total_windows(1).unwrap(), 4);
        assert_eq!(index.total_windows(2).unwrap(), 2);
        assert!(matches!(
            index.total_windows(3),
            Err(SextansError::InvalidConfiguration(_))
        ));
        assert!(index.total_windows(0).is_err());
    }

    #[test]
    fn test_sparse_words_per_channel() {
        let index = WindowIndex::new(vec![0, 3, 7]).unwrap();
        assert_eq!(index.sparse_words_per_channel(), 56);
    }

    #[test]
    fn test_device_words_padding() {
        let index = WindowIndex::new(vec![0, 3, 7]).unwrap();
        let words = index.to_device_words(1024).unwrap();
        assert_eq!(words.len(), 1024);
        assert_eq!(&words[..3], &[0, 3, 7]);
        assert!(words[3..].iter().all(|&w| w == 0));
    }
}
