//! Row-sharded sparse matrix and its builder
//!
//! A matrix goes through two states:
//!
//! 1. [`MatrixBuilder`] (unbuilt): rows accept sorted inserts, either one at
//!    a time or in bulk, optionally one shard at a time.
//! 2. [`ShardedSparseMatrix`] (built): produced by [`MatrixBuilder::seal`],
//!    which computes the global maximum row degree. The built type has no
//!    mutating methods, so it can be shared freely between kernel workers.
//!
//! There is no way back from built to unbuilt.

use num_traits::Num;
use rayon::prelude::*;
use std::collections::TryReserveError;
use std::fmt;
use std::ops::AddAssign;

use crate::error::{Error, Result};
use crate::matrix::config::DuplicatePolicy;
use crate::matrix::layout::ShardLayout;
use crate::matrix::row::{InsertOutcome, SparseRow};

/// A square sparse matrix whose rows are partitioned over shards
///
/// Row `i` is stored in shard `i mod P` at local slot `i div P`. Each
/// shard owns `ceil(N / P)` slots; slots past the last row stay empty.
#[derive(Clone)]
pub struct ShardedSparseMatrix<T> {
    layout: ShardLayout,
    shards: Vec<Vec<SparseRow<T>>>,
    max_degree: usize,
}

/// Builder for a [`ShardedSparseMatrix`]
pub struct MatrixBuilder<T> {
    layout: ShardLayout,
    shards: Vec<Vec<SparseRow<T>>>,
    policy: DuplicatePolicy,
}

/// Allocates every shard's row slots, failing with `InvalidSize` when the
/// layout is too large to allocate
pub(crate) fn empty_shards<T>(layout: &ShardLayout) -> Result<Vec<Vec<SparseRow<T>>>>
where
    T: Copy + Num + AddAssign,
{
    let too_large = |err: TryReserveError| {
        Error::invalid_size(format!(
            "cannot allocate {} rows over {} shards: {}",
            layout.n_rows(),
            layout.n_shards(),
            err
        ))
    };

    let mut shards = Vec::new();
    shards.try_reserve_exact(layout.n_shards()).map_err(too_large)?;
    for _ in 0..layout.n_shards() {
        let mut rows = Vec::new();
        rows.try_reserve_exact(layout.rows_per_shard()).map_err(too_large)?;
        rows.resize_with(layout.rows_per_shard(), SparseRow::new);
        shards.push(rows);
    }
    Ok(shards)
}

fn insert_into<T>(
    layout: &ShardLayout,
    policy: DuplicatePolicy,
    rows: &mut [SparseRow<T>],
    row: usize,
    col: usize,
    val: T,
) -> Result<()>
where
    T: Copy + Num + AddAssign,
{
    let n_rows = layout.n_rows();
    if row >= n_rows || col >= n_rows {
        return Err(Error::RangeError { row, col, n_rows });
    }

    match rows[layout.local_of(row)].insert(col, val, policy) {
        InsertOutcome::Duplicate => Err(Error::DuplicateEdge { row, col }),
        InsertOutcome::Inserted | InsertOutcome::Merged => Ok(()),
    }
}

impl<T> MatrixBuilder<T>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    /// Allocates `n_shards` shards with `ceil(n_rows / n_shards)` empty rows each
    pub fn create(n_rows: usize, n_shards: usize) -> Result<Self> {
        let layout = ShardLayout::new(n_rows, n_shards)?;
        Ok(Self {
            shards: empty_shards(&layout)?,
            layout,
            policy: DuplicatePolicy::default(),
        })
    }

    /// Set how repeated `(row, col)` inserts are handled
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The row layout this builder fills
    pub fn layout(&self) -> ShardLayout {
        self.layout
    }

    /// Sorted insert of a single entry
    pub fn insert(&mut self, row: usize, col: usize, val: T) -> Result<()> {
        let shard = self.layout.shard_of(row);
        insert_into(
            &self.layout,
            self.policy,
            &mut self.shards[shard],
            row,
            col,
            val,
        )
    }

    /// Insert every `(row, col, value)` triple, then seal
    pub fn build<I>(mut self, triples: I) -> Result<ShardedSparseMatrix<T>>
    where
        I: IntoIterator<Item = (usize, usize, T)>,
    {
        for (row, col, val) in triples {
            self.insert(row, col, val)?;
        }
        Ok(self.seal())
    }

    /// Insert every `(row, col)` pair with value one, then seal
    pub fn build_pairs<I>(self, pairs: I) -> Result<ShardedSparseMatrix<T>>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        self.build(pairs.into_iter().map(|(row, col)| (row, col, T::one())))
    }

    /// Insert, into `shard` only, the pairs whose row that shard owns
    ///
    /// Pairs owned by other shards are skipped, so calling this once per
    /// shard with the same edge list builds the whole matrix.
    pub fn build_shard(&mut self, shard: usize, pairs: &[(usize, usize)]) -> Result<()> {
        self.layout.check_shard(shard)?;
        let layout = self.layout;
        fill_shard(&layout, self.policy, shard, &mut self.shards[shard], pairs)
    }

    /// Build every shard in parallel from the same edge list, then seal
    pub fn build_sharded(mut self, pairs: &[(usize, usize)]) -> Result<ShardedSparseMatrix<T>> {
        let layout = self.layout;
        let policy = self.policy;

        // Out-of-range rows have no owner; catch them before the shards
        // filter by ownership.
        if let Some(&(row, col)) = pairs
            .iter()
            .find(|&&(row, col)| row >= layout.n_rows() || col >= layout.n_rows())
        {
            return Err(Error::RangeError {
                row,
                col,
                n_rows: layout.n_rows(),
            });
        }

        self.shards
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(shard, rows)| fill_shard(&layout, policy, shard, rows, pairs))?;

        Ok(self.seal())
    }

    /// Freeze the rows and compute the global maximum degree
    pub fn seal(self) -> ShardedSparseMatrix<T> {
        ShardedSparseMatrix::from_shards(self.layout, self.shards)
    }
}

fn fill_shard<T>(
    layout: &ShardLayout,
    policy: DuplicatePolicy,
    shard: usize,
    rows: &mut [SparseRow<T>],
    pairs: &[(usize, usize)],
) -> Result<()>
where
    T: Copy + Num + AddAssign,
{
    let mut inserted = 0usize;
    for &(row, col) in pairs {
        if layout.shard_of(row) != shard {
            continue;
        }
        insert_into(layout, policy, rows, row, col, T::one())?;
        inserted += 1;
    }
    log::debug!("shard {}: inserted {} entries", shard, inserted);
    Ok(())
}

impl<T> ShardedSparseMatrix<T>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    /// Start building an `n_rows × n_rows` matrix over `n_shards` shards
    pub fn create(n_rows: usize, n_shards: usize) -> Result<MatrixBuilder<T>> {
        MatrixBuilder::create(n_rows, n_shards)
    }

    /// Build a matrix with value one at every `(row, col)` pair
    pub fn from_pairs<I>(n_rows: usize, n_shards: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        MatrixBuilder::create(n_rows, n_shards)?.build_pairs(pairs)
    }

    pub(crate) fn from_shards(layout: ShardLayout, shards: Vec<Vec<SparseRow<T>>>) -> Self {
        // Global reduction over every shard, not a per-shard maximum
        let max_degree = shards
            .iter()
            .flat_map(|rows| rows.iter())
            .map(SparseRow::len)
            .max()
            .unwrap_or(0);

        Self {
            layout,
            shards,
            max_degree,
        }
    }

    /// Row `row`, or `None` when it is empty or out of range
    #[inline]
    pub fn get_row(&self, row: usize) -> Option<&SparseRow<T>> {
        if row >= self.layout.n_rows() {
            return None;
        }
        let (shard, local) = self.layout.owner(row);
        let r = &self.shards[shard][local];
        (!r.is_empty()).then_some(r)
    }

    /// Row `row`, possibly empty
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_rows`.
    #[inline]
    pub fn row(&self, row: usize) -> &SparseRow<T> {
        assert!(row < self.layout.n_rows(), "Row index out of bounds");
        let (shard, local) = self.layout.owner(row);
        &self.shards[shard][local]
    }

    /// Storage of one shard, indexed by local slot
    pub fn shard_rows(&self, shard: usize) -> Result<&[SparseRow<T>]> {
        self.layout.check_shard(shard)?;
        Ok(&self.shards[shard])
    }

    pub(crate) fn shards(&self) -> &[Vec<SparseRow<T>>] {
        &self.shards
    }

    /// Number of rows (and columns)
    pub fn row_count(&self) -> usize {
        self.layout.n_rows()
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.layout.n_shards()
    }

    /// Global row indices owned by `shard`, in increasing order
    pub fn rows_owned_by_shard(&self, shard: usize) -> Result<Vec<usize>> {
        self.layout.check_shard(shard)?;
        Ok(self.layout.rows_owned_by_shard(shard).collect())
    }

    /// Row-to-shard mapping
    pub fn layout(&self) -> ShardLayout {
        self.layout
    }

    /// Longest row, computed once when the matrix was sealed
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.shards
            .iter()
            .flat_map(|rows| rows.iter())
            .map(SparseRow::len)
            .sum()
    }

    /// Iterator over `(global row, row)` in increasing row order
    pub fn iter_rows(&self) -> impl Iterator<Item = (usize, &SparseRow<T>)> + '_ {
        (0..self.layout.n_rows()).map(move |i| (i, self.row(i)))
    }

    /// Whether both matrices hold the same rows, regardless of sharding
    pub fn same_entries(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.row_count() == other.row_count()
            && self
                .iter_rows()
                .zip(other.iter_rows())
                .all(|((_, a), (_, b))| a == b)
    }
}

impl<T: fmt::Debug + Copy + Num + AddAssign + Send + Sync> fmt::Debug for ShardedSparseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ShardedSparseMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.row_count(), self.row_count())?;
        writeln!(f, "  shards: {}", self.shard_count())?;
        writeln!(f, "  nnz: {}", self.nnz())?;
        writeln!(f, "  max degree: {}", self.max_degree)?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.row_count());

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let row = self.row(i);

                if row.is_empty() {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 5.min(row.len());

                    for &(col, val) in &row.entries()[..max_elements] {
                        write!(f, "({}, {:?}) ", col, val)?;
                    }

                    if row.len() > max_elements {
                        write!(f, "... ({} more)", row.len() - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.row_count() > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.row_count() - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
