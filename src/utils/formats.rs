//! Utilities for converting between sharded matrices and sprs

use crate::error::{Error, Result};
use crate::matrix::{MatrixBuilder, ShardedSparseMatrix};
use num_traits::Num;
use sprs::CsMat;
use std::ops::AddAssign;

/// Converts a sharded matrix to sprs CsMat format (CSR, rows in global order)
pub fn to_sprs_csr<T>(matrix: &ShardedSparseMatrix<T>) -> CsMat<T>
where
    T: Copy + Num + AddAssign + Default + Send + Sync,
{
    let n = matrix.row_count();
    let nnz = matrix.nnz();

    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::with_capacity(nnz);
    let mut data = Vec::with_capacity(nnz);
    indptr.push(0);

    for (_, row) in matrix.iter_rows() {
        for (col, val) in row.iter() {
            indices.push(col);
            data.push(val);
        }
        indptr.push(indices.len());
    }

    CsMat::new((n, n), indptr, indices, data)
}

/// Converts a square sprs matrix into a sharded matrix with `n_shards` shards
pub fn from_sprs_csr<T>(matrix: CsMat<T>, n_shards: usize) -> Result<ShardedSparseMatrix<T>>
where
    T: Copy + Num + AddAssign + Default + Send + Sync,
{
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let (n_rows, n_cols) = matrix.shape();
    if n_rows != n_cols {
        return Err(Error::ShapeMismatch {
            operand: "sprs matrix",
            expected: n_rows,
            got: n_cols,
        });
    }

    let mut builder = MatrixBuilder::create(n_rows, n_shards)?;
    for (row, vec) in matrix.outer_iterator().enumerate() {
        for (col, &val) in vec.iter() {
            builder.insert(row, col, val)?;
        }
    }

    Ok(builder.seal())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprs_roundtrip() {
        let original =
            ShardedSparseMatrix::<i64>::from_pairs(4, 3, [(1, 0), (2, 0), (3, 1), (3, 2)]).unwrap();

        let sprs_mat = to_sprs_csr(&original);
        assert_eq!(sprs_mat.shape(), (4, 4));
        assert_eq!(sprs_mat.nnz(), 4);
        assert_eq!(sprs_mat.indptr().as_slice().unwrap(), &[0, 0, 1, 2, 4]);

        let roundtrip = from_sprs_csr(sprs_mat, 2).unwrap();
        assert_eq!(roundtrip.shard_count(), 2);
        assert!(roundtrip.same_entries(&original));
    }

    #[test]
    fn test_from_csc_storage() {
        let original = ShardedSparseMatrix::<i64>::from_pairs(3, 1, [(2, 0), (2, 1)]).unwrap();
        let csc = to_sprs_csr(&original).to_csc();

        let back = from_sprs_csr(csc, 2).unwrap();
        assert_eq!(back.row(2).entries(), &[(0, 1), (1, 1)]);
    }

    #[test]
    fn test_non_square_rejected() {
        let rect = CsMat::new((2, 3), vec![0, 1, 1], vec![2], vec![1i64]);
        assert!(matches!(
            from_sprs_csr(rect, 1),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
