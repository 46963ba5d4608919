// SPDX-License-Identifier: MIT
// Copyright 2026 Tyler Zervas

//! Matrix Market coordinate reader (SuiteSparse collection files).

use std::io::BufRead;
use std::path::Path;

use super::csr::CsrMatrix;
use crate::error::{Result, SextansError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Real,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

/// Upper bound on entries reserved from the declared count.
const MAX_RESERVE: usize = 1 << 20;

fn parse_banner(line: &str) -> Result<(Field, Symmetry)> {
    let lower = line.to_ascii_lowercase();
    let parts: Vec<&str> = lower.split_whitespace().collect();
    if parts.len() < 5 || parts[0] != "%%matrixmarket" || parts[1] != "matrix" {
        return Err(SextansError::Parse(format!("bad banner: {line}")));
    }
    if parts[2] != "coordinate" {
        return Err(SextansError::Parse(format!(
            "only coordinate format is supported, got {}",
            parts[2]
        )));
    }
    let field = match parts[3] {
        "real" | "integer" | "double" => Field::Real,
        "pattern" => Field::Pattern,
        other => return Err(SextansError::Parse(format!("unsupported field {other}"))),
    };
    let symmetry = match parts[4] {
        "general" => Symmetry::General,
        "symmetric" => Symmetry::Symmetric,
        other => {
            return Err(SextansError::Parse(format!(
                "unsupported symmetry {other}"
            )))
        }
    };
    Ok((field, symmetry))
}

fn parse_usize(token: Option<&str>, what: &str) -> Result<usize> {
    token
        .ok_or_else(|| SextansError::Parse(format!("missing {what}")))?
        .parse()
        .map_err(|e| SextansError::Parse(format!("bad {what}: {e}")))
}

/// Read a Matrix Market coordinate matrix into CSR.
///
/// Indices in the file are 1-based. Symmetric matrices are expanded to both
/// triangles; pattern matrices get unit values.
///
/// # Errors
///
/// Returns `Parse` for malformed content and `Io` for read failures.
pub fn read_matrix_market<R: BufRead>(reader: R) -> Result<CsrMatrix> {
    let mut lines = reader.lines();
    let banner = lines
        .next()
        .ok_or_else(|| SextansError::Parse("empty input".into()))??;
    let (field, symmetry) = parse_banner(&banner)?;

    let mut header: Option<(usize, usize, usize)> = None;
    let mut triplets = Vec::new();
    let mut entries_read = 0usize;
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some((rows, cols, _)) = header else {
            let rows = parse_usize(tokens.next(), "row count")?;
            let cols = parse_usize(tokens.next(), "column count")?;
            let nnz = parse_usize(tokens.next(), "entry count")?;
            triplets.reserve(nnz.min(rows.saturating_mul(cols)).min(MAX_RESERVE));
            header = Some((rows, cols, nnz));
            continue;
        };
        let r = parse_usize(tokens.next(), "row index")?;
        let c = parse_usize(tokens.next(), "column index")?;
        if r == 0 || c == 0 || r > rows || c > cols {
            return Err(SextansError::Parse(format!(
                "entry ({r}, {c}) out of range for {rows}x{cols}"
            )));
        }
        let v = match field {
            Field::Pattern => 1.0,
            Field::Real => tokens
                .next()
                .ok_or_else(|| SextansError::Parse("missing value".into()))?
                .parse::<f32>()
                .map_err(|e| SextansError::Parse(format!("bad value: {e}")))?,
        };
        entries_read += 1;
        triplets.push((r - 1, c - 1, v));
        if symmetry == Symmetry::Symmetric && r != c {
            triplets.push((c - 1, r - 1, v));
        }
    }

    let (rows, cols, declared) =
        header.ok_or_else(|| SextansError::Parse("missing size line".into()))?;
    if entries_read != declared {
        return Err(SextansError::Parse(format!(
            "declared {declared} entries, found {entries_read}"
        )));
    }
    tracing::debug!(
        "Read Matrix Market {}x{} with {} stored entries",
        rows,
        cols,
        triplets.len()
    );
    CsrMatrix::from_triplets(rows, cols, triplets)
}

/// Read a Matrix Market file from disk.
///
/// # Errors
///
/// See [`read_matrix_market`].
pub fn read_matrix_market_file(path: impl AsRef<Path>) -> Result<CsrMatrix> {
    let file = std::fs::File::open(path)?;
    read_matrix_market(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_general() {
        let text = "%%MatrixMarket matrix coordinate real general\n\
                    % comment\n\
                    3 4 3\n\
                    1 1 1.5\n\
                    3 4 -2\n\
                    2 2 4.0\n";
        let a = read_matrix_market(text.as_bytes()).unwrap();
        assert_eq!((a.rows(), a.cols(), a.nnz()), (3, 4, 3));
        assert_eq!(a.row_ptr(), &[0, 1, 2, 3]);
        assert_eq!(a.col_idx(), &[0, 1, 3]);
        assert_eq!(a.values(), &[1.5, 4.0, -2.0]);
    }

    #[test]
    fn test_read_symmetric_pattern() {
        let text = "%%MatrixMarket matrix coordinate pattern symmetric\n\
                    3 3 2\n\
                    2 1\n\
                    3 3\n";
        let a = read_matrix_market(text.as_bytes()).unwrap();
        assert_eq!(a.nnz(), 3);
        assert_eq!(a.values(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rejects_array_format() {
        let text = "%%MatrixMarket matrix array real general\n2 2\n1\n2\n3\n4\n";
        assert!(matches!(
            read_matrix_market(text.as_bytes()),
            Err(SextansError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_entry_count_mismatch() {
        let text = "%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1.0\n";
        assert!(read_matrix_market(text.as_bytes()).is_err());
    }

    #[test]
    fn test_huge_declared_count_is_parse_error() {
        let text = format!(
            "%%MatrixMarket matrix coordinate real general\n1 1 {}\n",
            usize::MAX
        );
        assert!(matches!(
            read_matrix_market(text.as_bytes()),
            Err(SextansError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_entry() {
        let text = "%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1.0\n";
        assert!(read_matrix_market(text.as_bytes()).is_err());
    }
}
