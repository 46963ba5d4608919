//! Per-channel device buffers.

use crate::align::pad_to;
use crate::error::{Result, SextansError};

/// One zero-initialized buffer per HBM channel.
///
/// Every channel has the same length, rounded up to the DMA chunk. Only the
/// first `logical_len` elements of a channel carry data; the rest is padding
/// and must not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBuffers<T> {
    channels: Vec<Vec<T>>,
    logical_len: usize,
}

impl<T: Copy + Default> ChannelBuffers<T> {
    /// Allocate `num_channels` buffers able to hold `logical_len` elements,
    /// each padded to a multiple of `dma_chunk`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `num_channels` or `dma_chunk` is zero.
    pub fn zeroed(num_channels: usize, logical_len: usize, dma_chunk: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(SextansError::config("channel count must be positive"));
        }
        let chunk_len = pad_to(logical_len, dma_chunk)?;
        Ok(Self {
            channels: vec![vec![T::default(); chunk_len]; num_channels],
            logical_len,
        })
    }

    /// Number of channels.
    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Allocated elements per channel (including padding).
    #[must_use]
    pub fn chunk_len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Meaningful elements per channel.
    #[must_use]
    pub fn logical_len(&self) -> usize {
        self.logical_len
    }

    /// Full buffer of channel `c`, padding included.
    #[must_use]
    pub fn channel(&self, c: usize) -> Option<&[T]> {
        self.channels.get(c).map(Vec::as_slice)
    }

    /// Mutable buffer of channel `c`, e.g. for a backend writing results.
    pub fn channel_mut(&mut self, c: usize) -> Option<&mut [T]> {
        self.channels.get_mut(c).map(Vec::as_mut_slice)
    }

    /// Data portion of channel `c`.
    #[must_use]
    pub fn logical(&self, c: usize) -> Option<&[T]> {
        self.channels.get(c).map(|ch| &ch[..self.logical_len])
    }

    /// All channels.
    #[must_use]
    pub fn channels(&self) -> &[Vec<T>] {
        &self.channels
    }

    /// Consume into the raw channel vectors.
    #[must_use]
    pub fn into_channels(self) -> Vec<Vec<T>> {
        self.channels
    }

    /// Reset every element, padding included, to the zero value.
    pub fn clear(&mut self) {
        for ch in &mut self.channels {
            ch.fill(T::default());
        }
    }

    pub(crate) fn ensure_fits(&self, num_channels: usize, logical_len: usize) -> Result<()> {
        if self.num_channels() != num_channels || self.chunk_len() < logical_len {
            return Err(SextansError::ShapeMismatch {
                expected: vec![num_channels, logical_len],
                actual: vec![self.num_channels(), self.chunk_len()],
            });
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn write(&mut self, channel: usize, offset: usize, value: T) {
        self.channels[channel][offset] = value;
    }

    #[inline]
    pub(crate) fn read(&self, channel: usize, offset: usize) -> T {
        self.channels[channel][offset]
    }

    pub(crate) fn set_logical_len(&mut self, logical_len: usize) {
        self.logical_len = logical_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_rounds_to_chunk() {
        let bufs: ChannelBuffers<f32> = ChannelBuffers::zeroed(8, 1500, 1024).unwrap();
        assert_eq!(bufs.num_channels(), 8);
        assert_eq!(bufs.chunk_len(), 2048);
        assert_eq!(bufs.logical_len(), 1500);
        assert_eq!(bufs.logical(0).unwrap().len(), 1500);
        assert!(bufs.channels().iter().all(|c| c.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_zero_channels_rejected() {
        assert!(ChannelBuffers::<u64>::zeroed(0, 10, 1024).is_err());
    }

    #[test]
    fn test_ensure_fits() {
        let bufs: ChannelBuffers<f32> = ChannelBuffers::zeroed(4, 10, 1024).unwrap();
        assert!(bufs.ensure_fits(4, 1024).is_ok());
        assert!(matches!(
            bufs.ensure_fits(8, 10),
            Err(SextansError::ShapeMismatch { .. })
        ));
        assert!(bufs.ensure_fits(4, 1025).is_err());
    }

    #[test]
    fn test_clear() {
        let mut bufs: ChannelBuffers<u64> = ChannelBuffers::zeroed(2, 4, 8).unwrap();
        bufs.write(1, 7, 9);
        assert_eq!(bufs.read(1, 7), 9);
        bufs.clear();
        assert_eq!(bufs.read(1, 7), 0);
    }
}
