//! Row ownership across shards
//!
//! Row `i` lives in shard `i mod P` at local index `i div P`. The layout is
//! a small `Copy` value fixed at construction, handed to every shard and
//! worker instead of being recomputed or shared through global state.

use crate::error::{Error, Result};

/// Immutable mapping between global row indices and `(shard, local)` slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardLayout {
    n_rows: usize,
    n_shards: usize,
    rows_per_shard: usize,
}

impl ShardLayout {
    /// Creates the layout for `n_rows` rows over `n_shards` shards
    pub fn new(n_rows: usize, n_shards: usize) -> Result<Self> {
        if n_shards == 0 {
            return Err(Error::invalid_size("shard count must be at least 1"));
        }
        Ok(Self {
            n_rows,
            n_shards,
            rows_per_shard: n_rows.div_ceil(n_shards),
        })
    }

    /// Number of rows (N)
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of shards (P)
    pub fn n_shards(&self) -> usize {
        self.n_shards
    }

    /// Slots allocated per shard, `ceil(N / P)`
    ///
    /// The last slots of some shards are padding and never hold a row.
    pub fn rows_per_shard(&self) -> usize {
        self.rows_per_shard
    }

    /// Shard owning `row`
    #[inline]
    pub fn shard_of(&self, row: usize) -> usize {
        row % self.n_shards
    }

    /// Local slot of `row` inside its shard
    #[inline]
    pub fn local_of(&self, row: usize) -> usize {
        row / self.n_shards
    }

    /// `(shard, local)` slot of `row`
    #[inline]
    pub fn owner(&self, row: usize) -> (usize, usize) {
        (self.shard_of(row), self.local_of(row))
    }

    /// Inverse of [`ShardLayout::owner`]; `None` for padding slots
    #[inline]
    pub fn global(&self, shard: usize, local: usize) -> Option<usize> {
        if shard >= self.n_shards {
            return None;
        }
        let row = local * self.n_shards + shard;
        (row < self.n_rows).then_some(row)
    }

    /// Number of real (non-padding) rows owned by `shard`
    pub fn rows_owned(&self, shard: usize) -> usize {
        if shard >= self.n_rows.min(self.n_shards) {
            return 0;
        }
        (self.n_rows - shard).div_ceil(self.n_shards)
    }

    /// Global indices owned by `shard`, in increasing order
    pub fn rows_owned_by_shard(&self, shard: usize) -> impl Iterator<Item = usize> {
        let start = if shard < self.n_shards { shard } else { self.n_rows };
        (start..self.n_rows).step_by(self.n_shards)
    }

    /// Check a shard id
    pub fn check_shard(&self, shard: usize) -> Result<()> {
        if shard < self.n_shards {
            Ok(())
        } else {
            Err(Error::InvalidShard {
                shard,
                n_shards: self.n_shards,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_shards_rejected() {
        assert!(matches!(
            ShardLayout::new(10, 0),
            Err(Error::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_owner_and_inverse() {
        let layout = ShardLayout::new(10, 3).unwrap();
        assert_eq!(layout.rows_per_shard(), 4);
        assert_eq!(layout.owner(7), (1, 2));
        assert_eq!(layout.global(1, 2), Some(7));
        // shard 1 slot 3 would be row 10
        assert_eq!(layout.global(1, 3), None);
        assert_eq!(layout.global(3, 0), None);
    }

    #[test]
    fn test_rows_owned() {
        let layout = ShardLayout::new(10, 3).unwrap();
        assert_eq!(layout.rows_owned(0), 4);
        assert_eq!(layout.rows_owned(1), 3);
        assert_eq!(layout.rows_owned(2), 3);
        assert_eq!(layout.rows_owned(3), 0);

        let owned: Vec<_> = layout.rows_owned_by_shard(1).collect();
        assert_eq!(owned, vec![1, 4, 7]);
    }

    #[test]
    fn test_more_shards_than_rows() {
        let layout = ShardLayout::new(2, 4).unwrap();
        assert_eq!(layout.rows_per_shard(), 1);
        assert_eq!(layout.rows_owned(1), 1);
        assert_eq!(layout.rows_owned(3), 0);
        assert_eq!(layout.rows_owned_by_shard(3).count(), 0);
    }

    #[test]
    fn test_empty_matrix() {
        let layout = ShardLayout::new(0, 2).unwrap();
        assert_eq!(layout.rows_per_shard(), 0);
        assert_eq!(layout.rows_owned(0), 0);
    }
}
