//! Reference implementations used as test oracles
//!
//! These trade speed for obviousness: a pairwise dot product, an
//! all-pairs masked product, and a dense brute-force triangle count.

use ndarray::Array2;
use num_traits::Num;
use std::ops::AddAssign;

use crate::matrix::{ShardedSparseMatrix, SparseRow};

/// Dot product by comparing every pair of entries, O(|a|·|b|)
///
/// `None` when no column is shared, otherwise the sum of products over
/// shared columns (which may be zero).
pub fn naive_dot<T>(a: &[(usize, T)], b: &[(usize, T)]) -> Option<T>
where
    T: Copy + Num + AddAssign,
{
    let mut result = None;
    for &(a_col, a_val) in a {
        for &(b_col, b_val) in b {
            if a_col == b_col {
                *result.get_or_insert(T::zero()) += a_val * b_val;
            }
        }
    }
    result
}

/// Masked `A·Bᵗ` computed over every `(i, j)` pair with [`naive_dot`]
///
/// Returns one row per global row index.
pub fn reference_abt_mask<T>(
    m: &ShardedSparseMatrix<T>,
    a: &ShardedSparseMatrix<T>,
    b: &ShardedSparseMatrix<T>,
) -> Vec<SparseRow<T>>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    let n = a.row_count();
    (0..n)
        .map(|i| {
            let mut out = SparseRow::new();
            for j in 0..n {
                if !m.row(i).contains(j) {
                    continue;
                }
                if let Some(sum) = naive_dot(a.row(i).entries(), b.row(j).entries()) {
                    out.push_sorted(j, sum);
                }
            }
            out
        })
        .collect()
}

/// Dense symmetric 0/1 adjacency matrix of an undirected edge list
pub fn dense_adjacency(n: usize, edges: &[(usize, usize)]) -> Array2<i64> {
    let mut adj = Array2::<i64>::zeros((n, n));
    for &(u, v) in edges {
        if u != v {
            adj[[u, v]] = 1;
            adj[[v, u]] = 1;
        }
    }
    adj
}

/// Number of triangles `{i, j, k}` with `i > j > k`, by exhaustive search
pub fn brute_force_triangles(n: usize, edges: &[(usize, usize)]) -> i64 {
    let adj = dense_adjacency(n, edges);
    let mut count = 0;
    for i in 0..n {
        for j in 0..i {
            if adj[[i, j]] == 0 {
                continue;
            }
            for k in 0..j {
                count += adj[[i, k]] * adj[[j, k]];
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_dot() {
        let a = [(0, 1i64), (2, 3), (5, 1)];
        let b = [(2, 2i64), (5, -6)];
        assert_eq!(naive_dot(&a, &b), Some(0));
        assert_eq!(naive_dot(&a, &[(1, 4)]), None);
        assert_eq!(naive_dot::<i64>(&[], &[]), None);
    }

    #[test]
    fn test_brute_force_triangles() {
        // K4 has four triangles
        let k4 = [(1, 0), (2, 0), (2, 1), (3, 0), (3, 1), (3, 2)];
        assert_eq!(brute_force_triangles(4, &k4), 4);

        // A 4-cycle has none
        let c4 = [(1, 0), (2, 1), (3, 2), (3, 0)];
        assert_eq!(brute_force_triangles(4, &c4), 0);
    }

    #[test]
    fn test_dense_adjacency_is_symmetric() {
        let adj = dense_adjacency(3, &[(2, 0), (1, 1)]);
        assert_eq!(adj, adj.t());
        assert_eq!(adj[[0, 2]], 1);
        assert_eq!(adj[[1, 1]], 0);
    }
}
