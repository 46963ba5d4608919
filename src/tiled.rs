// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Reader and writer for the pre-tiled sparse operand file.
//!
//! The external tiler emits a little-endian binary file:
//!
//! ```text
//! i32            index_len
//! i32            chunk_len           words stored per channel
//! i32[index_len] window index
//! u64[chunk_len] channel 0 words
//! ...
//! u64[chunk_len] channel 7 words
//! ```
//!
//! Only the first `8 * index[last]` words of each channel are data.

use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::align::PE_GROUP;
use crate::error::{Result, SextansError};
use crate::layout::{SparseChannels, SPARSE_CHANNELS};
use crate::window::WindowIndex;

/// Upper bound on capacity reserved from header lengths before the payload
/// confirms them.
const MAX_RESERVE: usize = 1 << 16;

/// Sparse operand as delivered by the tiler.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledSparse {
    /// Work partition over windows and cycles.
    pub window_index: WindowIndex,
    /// Aligned channel words.
    pub channels: SparseChannels,
}

fn read_array<const N: usize, R: Read>(reader: &mut R, what: &str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            SextansError::Parse(format!("truncated tiled file while reading {what}"))
        } else {
            SextansError::Io(e)
        }
    })?;
    Ok(buf)
}

fn read_len<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let v = i32::from_le_bytes(read_array::<4, _>(reader, what)?);
    usize::try_from(v).map_err(|_| SextansError::Parse(format!("negative {what}: {v}")))
}

/// Parse a tiled sparse operand.
///
/// # Errors
///
/// Returns `Parse` for truncated or negative fields, `MalformedIndex` if the
/// index is invalid, and `ShapeMismatch` if the channels hold fewer words
/// than the index declares.
pub fn read_tiled<R: Read>(mut reader: R, dma_chunk: usize) -> Result<TiledSparse> {
    let index_len = read_len(&mut reader, "index length")?;
    let chunk_len = read_len(&mut reader, "chunk length")?;

    let mut entries = Vec::with_capacity(index_len.min(MAX_RESERVE));
    for i in 0..index_len {
        let v = i32::from_le_bytes(read_array::<4, _>(&mut reader, "window index")?);
        let v = u32::try_from(v)
            .map_err(|_| SextansError::MalformedIndex(format!("entry {i} is negative: {v}")))?;
        entries.push(v);
    }
    let window_index = WindowIndex::new(entries)?;

    let mut words = Vec::with_capacity(SPARSE_CHANNELS);
    for _ in 0..SPARSE_CHANNELS {
        let mut ch = Vec::with_capacity(chunk_len.min(MAX_RESERVE));
        for _ in 0..chunk_len {
            ch.push(u64::from_le_bytes(read_array::<8, _>(
                &mut reader,
                "channel words",
            )?));
        }
        words.push(ch);
    }

    let logical_len = window_index.sparse_words_per_channel();
    tracing::debug!(
        "Read tiled operand: {} index entries, {} words/channel ({} logical)",
        index_len,
        chunk_len,
        logical_len
    );
    let channels = SparseChannels::pack(&words, logical_len, dma_chunk)?;
    Ok(TiledSparse {
        window_index,
        channels,
    })
}

/// Read a tiled sparse operand from disk.
///
/// # Errors
///
/// See [`read_tiled`].
pub fn read_tiled_file(path: impl AsRef<Path>, dma_chunk: usize) -> Result<TiledSparse> {
    let file = std::fs::File::open(path)?;
    read_tiled(std::io::BufReader::new(file), dma_chunk)
}

/// Serialize in the tiler's format, storing only the logical words.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if a length or index entry does not fit in
/// `i32`, and `Io` on write failure.
pub fn write_tiled<W: Write>(mut writer: W, tiled: &TiledSparse) -> Result<()> {
    let to_i32 = |v: usize, what: &str| {
        i32::try_from(v).map_err(|_| SextansError::config(format!("{what} {v} exceeds i32")))
    };
    let entries = tiled.window_index.as_slice();
    let logical = tiled.channels.logical_len();
    debug_assert_eq!(logical, PE_GROUP * tiled.window_index.total_work() as usize);

    writer.write_all(&to_i32(entries.len(), "index length")?.to_le_bytes())?;
    writer.write_all(&to_i32(logical, "chunk length")?.to_le_bytes())?;
    for &e in entries {
        let e = i32::try_from(e)
            .map_err(|_| SextansError::config(format!("index entry {e} exceeds i32")))?;
        writer.write_all(&e.to_le_bytes())?;
    }
    for c in 0..SPARSE_CHANNELS {
        for &w in tiled.channels.words(c).unwrap_or_default() {
            writer.write_all(&w.to_le_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(index: &[i32], chunk_len: usize, fill: impl Fn(usize, usize) -> u64) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(index.len() as i32).to_le_bytes());
        bytes.extend_from_slice(&(chunk_len as i32).to_le_bytes());
        for &e in index {
            bytes.extend_from_slice(&e.to_le_bytes());
        }
        for c in 0..8 {
            for i in 0..chunk_len {
                bytes.extend_from_slice(&fill(c, i).to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_read_tiled() {
        let bytes = encode(&[0, 1, 2], 20, |c, i| (c * 100 + i) as u64);
        let tiled = read_tiled(bytes.as_slice(), 1024).unwrap();
        assert_eq!(tiled.window_index.as_slice(), &[0, 1, 2]);
        assert_eq!(tiled.channels.logical_len(), 16);
        assert_eq!(tiled.channels.words(3).unwrap()[5], 305);
        // words past the logical length are dropped
        assert_eq!(tiled.channels.buffers().channel(3).unwrap()[16], 0);
    }

    #[test]
    fn test_truncated_file() {
        let mut bytes = encode(&[0, 1], 8, |_, _| 1);
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            read_tiled(bytes.as_slice(), 1024),
            Err(SextansError::Parse(_))
        ));
    }

    #[test]
    fn test_huge_header_empty_body() {
        let mut bytes = i32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            read_tiled(bytes.as_slice(), 1024),
            Err(SextansError::Parse(_))
        ));

        let mut bytes = 1i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&i32::MAX.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            read_tiled(bytes.as_slice(), 1024),
            Err(SextansError::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_index() {
        let bytes = encode(&[0, 5, 2], 40, |_, _| 0);
        assert!(matches!(
            read_tiled(bytes.as_slice(), 1024),
            Err(SextansError::MalformedIndex(_))
        ));
    }

    #[test]
    fn test_channels_shorter_than_index() {
        let bytes = encode(&[0, 4], 8, |_, _| 0);
        assert!(matches!(
            read_tiled(bytes.as_slice(), 1024),
            Err(SextansError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let bytes = encode(&[0, 2, 3], 24, |c, i| (c ^ i) as u64 + 1);
        let tiled = read_tiled(bytes.as_slice(), 1024).unwrap();
        let mut out = Vec::new();
        write_tiled(&mut out, &tiled).unwrap();
        assert_eq!(read_tiled(out.as_slice(), 1024).unwrap(), tiled);
    }
}
