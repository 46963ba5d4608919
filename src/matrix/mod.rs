//! Logical matrix types consumed and produced by the layout codec.
//!
//! - [`csr`] - Sparse A in CSR form and the CPU reference SpMM
//! - [`dense`] - Dense B and C with explicit row/column-major order
//! - [`mtx`] - Matrix Market reader for SuiteSparse inputs

pub mod csr;
pub mod dense;
pub mod mtx;

pub use csr::{spmm_reference, CsrMatrix};
pub use dense::{DenseMatrix, Layout};
pub use mtx::{read_matrix_market, read_matrix_market_file};
