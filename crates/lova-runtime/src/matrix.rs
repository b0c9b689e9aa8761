//! Sparse interaction matrix (CSR)
//!
//! Rows are user indices, columns are item indices. Repeated (row, col)
//! pairs are summed, so an interaction logged twice counts twice.

use crate::error::{Result, RuntimeError};
use sprs::{CsMat, TriMat};

/// Compressed sparse row matrix with sorted, unique column indices per row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    inner: CsMat<f64>,
}

impl CsrMatrix {
    /// Build from (row, col, value) triples, summing duplicates
    pub fn from_triplets(n_rows: usize, n_cols: usize, triplets: &[(usize, usize, f64)]) -> Result<Self> {
        let rows: Vec<usize> = triplets.iter().map(|t| t.0).collect();
        let cols: Vec<usize> = triplets.iter().map(|t| t.1).collect();
        let values: Vec<f64> = triplets.iter().map(|t| t.2).collect();
        SparseMatrixBuilder::new(n_rows, n_cols, &rows, &cols)?.build(&values)
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.inner.rows(), self.inner.cols())
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// Column indices and values of one row, `None` when out of range
    pub fn row(&self, row: usize) -> Option<(&[usize], &[f64])> {
        if row >= self.inner.rows() {
            return None;
        }
        let range = self.inner.indptr().outer_inds_sz(row);
        Some((
            &self.inner.indices()[range.clone()],
            &self.inner.data()[range],
        ))
    }

    /// Stored value at (row, col), `0.0` when absent or out of range
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row)
            .and_then(|(cols, values)| cols.binary_search(&col).ok().map(|pos| values[pos]))
            .unwrap_or(0.0)
    }

    /// Stored entries as (row, col, value), row-major
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.inner.iter().map(|(value, (row, col))| (row, col, *value))
    }

    pub fn values(&self) -> &[f64] {
        self.inner.data()
    }

    /// Transposed copy (CSR of the item-by-user matrix)
    pub fn transpose(&self) -> CsrMatrix {
        CsrMatrix {
            inner: self.inner.transpose_view().to_csr(),
        }
    }

    /// Underlying `sprs` matrix
    pub fn as_sprs(&self) -> &CsMat<f64> {
        &self.inner
    }
}

/// Fixed (row, col) layout of a triple stream.
///
/// Indices are validated once; [`build`](Self::build) then only pairs a new
/// value stream with the same coordinates. The sparsity pattern depends on
/// the coordinates alone, so per-trial rebuilds keep the index space fixed.
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl SparseMatrixBuilder {
    pub fn new(n_rows: usize, n_cols: usize, rows: &[usize], cols: &[usize]) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(RuntimeError::ShapeMismatch(format!(
                "{} row indices but {} column indices",
                rows.len(),
                cols.len()
            )));
        }
        if let Some(&row) = rows.iter().find(|&&r| r >= n_rows) {
            return Err(RuntimeError::IndexOutOfBounds {
                kind: "row",
                index: row,
                len: n_rows,
            });
        }
        if let Some(&col) = cols.iter().find(|&&c| c >= n_cols) {
            return Err(RuntimeError::IndexOutOfBounds {
                kind: "column",
                index: col,
                len: n_cols,
            });
        }

        Ok(Self {
            n_rows,
            n_cols,
            rows: rows.to_vec(),
            cols: cols.to_vec(),
        })
    }

    /// Number of input triples the layout expects
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Assemble a fresh matrix from one value per input triple
    pub fn build(&self, values: &[f64]) -> Result<CsrMatrix> {
        if values.len() != self.rows.len() {
            return Err(RuntimeError::ShapeMismatch(format!(
                "expected {} values, got {}",
                self.rows.len(),
                values.len()
            )));
        }

        let mut triplets = TriMat::with_capacity((self.n_rows, self.n_cols), values.len());
        for ((&row, &col), &value) in self.rows.iter().zip(&self.cols).zip(values) {
            triplets.add_triplet(row, col, value);
        }

        Ok(CsrMatrix {
            inner: triplets.to_csr(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_summed() {
        let matrix =
            CsrMatrix::from_triplets(2, 2, &[(0, 1, 1.5), (1, 0, 2.0), (0, 1, 1.5)]).unwrap();

        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.nnz(), 2);
        assert_eq!(matrix.get(0, 1), 3.0);
        assert_eq!(matrix.get(1, 0), 2.0);
        assert_eq!(matrix.get(0, 0), 0.0);
        assert_eq!(matrix.get(5, 0), 0.0);
    }

    #[test]
    fn test_rows_are_sorted() {
        let matrix =
            CsrMatrix::from_triplets(1, 4, &[(0, 3, 1.0), (0, 0, 2.0), (0, 2, 3.0)]).unwrap();
        let (cols, values) = matrix.row(0).unwrap();
        assert_eq!(cols, &[0, 2, 3]);
        assert_eq!(values, &[2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_empty_rows_keep_shape() {
        let matrix = CsrMatrix::from_triplets(3, 2, &[(2, 1, 1.0)]).unwrap();
        assert_eq!(matrix.shape(), (3, 2));
        assert!(matrix.row(0).unwrap().0.is_empty());
        assert!(matrix.row(1).unwrap().0.is_empty());
        assert_eq!(matrix.row(2).unwrap().0, &[1]);
    }

    #[test]
    fn test_row_out_of_range() {
        let matrix = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0)]).unwrap();
        assert!(matrix.row(2).is_none());
        assert!(matrix.row(usize::MAX).is_none());
    }

    #[test]
    fn test_out_of_bounds() {
        let err = CsrMatrix::from_triplets(1, 1, &[(1, 0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::IndexOutOfBounds { kind: "row", index: 1, len: 1 }
        ));
        let err = CsrMatrix::from_triplets(1, 1, &[(0, 2, 1.0)]).unwrap_err();
        assert!(matches!(err, RuntimeError::IndexOutOfBounds { kind: "column", .. }));
    }

    #[test]
    fn test_builder_rebuild_keeps_layout() {
        let builder = SparseMatrixBuilder::new(2, 3, &[0, 1, 0], &[2, 0, 2]).unwrap();
        let first = builder.build(&[1.0, 1.0, 1.0]).unwrap();
        let second = builder.build(&[0.5, 4.0, 0.25]).unwrap();

        assert_eq!(first.get(0, 2), 2.0);
        assert_eq!(second.get(0, 2), 0.75);
        assert_eq!(second.get(1, 0), 4.0);
        assert_eq!(first.shape(), second.shape());
        assert_eq!(first.nnz(), second.nnz());

        assert!(matches!(
            builder.build(&[1.0]),
            Err(RuntimeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_iter_is_row_major() {
        let matrix =
            CsrMatrix::from_triplets(2, 3, &[(1, 0, 2.0), (0, 2, 1.0), (1, 2, 3.0)]).unwrap();
        let entries: Vec<_> = matrix.iter().collect();
        assert_eq!(entries, vec![(0, 2, 1.0), (1, 0, 2.0), (1, 2, 3.0)]);
    }

    #[test]
    fn test_transpose() {
        let matrix =
            CsrMatrix::from_triplets(2, 3, &[(0, 2, 1.0), (1, 0, 2.0), (1, 2, 3.0)]).unwrap();
        let t = matrix.transpose();

        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(2, 0), 1.0);
        assert_eq!(t.get(0, 1), 2.0);
        assert_eq!(t.get(2, 1), 3.0);
        assert_eq!(t.row(2).unwrap().0, &[0, 1]);
        assert!(t.row(1).unwrap().0.is_empty());
        assert_eq!(t.transpose(), matrix);
    }
}
