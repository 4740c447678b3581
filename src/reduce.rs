//! Reduction of a sharded matrix to a scalar
//!
//! Addition is associative and commutative, so every shard can be summed
//! on its own and the partial sums combined in any order.

use num_traits::Num;
use rayon::prelude::*;
use std::ops::AddAssign;

use crate::error::Result;
use crate::matrix::{ShardedSparseMatrix, SparseRow};

fn sum_rows<T>(rows: &[SparseRow<T>]) -> T
where
    T: Copy + Num + AddAssign,
{
    let mut total = T::zero();
    for row in rows {
        total += row.sum();
    }
    total
}

impl<T> ShardedSparseMatrix<T>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    /// Sum of every stored value, one sequential pass in row order
    pub fn reduce(&self) -> T {
        let mut sum = T::zero();
        for (_, row) in self.iter_rows() {
            sum += row.sum();
        }
        sum
    }

    /// Sum of the values stored in one shard
    pub fn shard_sum(&self, shard: usize) -> Result<T> {
        Ok(sum_rows(self.shard_rows(shard)?))
    }

    /// Per-shard partial sums, indexed by shard id
    pub fn shard_partials(&self) -> Vec<T> {
        self.shards().par_iter().map(|rows| sum_rows(rows)).collect()
    }

    /// Sum of every stored value, shards summed in parallel then combined
    pub fn par_reduce(&self) -> T {
        self.shards()
            .par_iter()
            .map(|rows| sum_rows(rows))
            .reduce(T::zero, |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use crate::matrix::ShardedSparseMatrix;

    fn sample() -> ShardedSparseMatrix<i64> {
        ShardedSparseMatrix::<i64>::create(6, 4)
            .unwrap()
            .build([(0, 1, 3), (1, 4, -2), (2, 2, 7), (5, 0, 10), (5, 5, 1)])
            .unwrap()
    }

    #[test]
    fn test_reduce_sums_every_entry() {
        let m = sample();
        assert_eq!(m.reduce(), 19);
        assert_eq!(m.par_reduce(), 19);
    }

    #[test]
    fn test_shard_partials_combine_to_total() {
        let m = sample();
        let partials = m.shard_partials();
        assert_eq!(partials.len(), 4);
        // rows 0 and 4 -> shard 0, rows 1 and 5 -> shard 1, row 2 -> shard 2
        assert_eq!(partials, vec![3, 9, 7, 0]);
        assert_eq!(m.shard_sum(1).unwrap(), 9);
        assert!(m.shard_sum(4).is_err());
    }

    #[test]
    fn test_reduce_empty() {
        let m = ShardedSparseMatrix::<i64>::create(0, 3).unwrap().seal();
        assert_eq!(m.reduce(), 0);
        assert_eq!(m.par_reduce(), 0);
    }
}
