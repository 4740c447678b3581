//! # Masked `A·Bᵗ` kernel without accumulation
//!
//! Computes `C = mask(M) ⊙ (A·Bᵗ)` where row `j` of `B` is dotted directly
//! against row `i` of `A`. For row `i` of `A`:
//!
//! 1. an empty row of `A` produces an empty row of `C`;
//! 2. columns `j` whose row of `B` is empty are skipped;
//! 3. columns `j` absent from row `i` of `M` are skipped (existence only);
//! 4. otherwise `(j, dot(A[i], B[j]))` is appended when the rows share a
//!    column.
//!
//! Columns are visited in increasing order and only appended, so every
//! output row comes out sorted. `C` is always freshly allocated; there is
//! no accumulation into earlier results.
//!
//! ## Parallel structure
//!
//! Shards run as independent tasks. Inside a shard, the locally owned rows
//! are cut into `W` contiguous blocks of `rows / W` rows, and the
//! `rows % W` leftover rows each become a single-row task. Every task gets
//! its own `&mut` slice of the output shard, so writes never overlap and
//! nothing is locked. Rayon's joins are the only barriers.

pub mod dot;
pub mod scratch;

use num_traits::Num;
use rayon::prelude::*;
use std::ops::{AddAssign, Range};

use crate::error::{Error, Result};
use crate::matrix::sharded::empty_shards;
use crate::matrix::{KernelConfig, ShardLayout, ShardedSparseMatrix, SparseRow, StagingMode};

pub use dot::{dot, dot_rows};
pub use scratch::ScratchRow;

/// Read-only operands of one kernel invocation
#[derive(Clone, Copy)]
struct Operands<'a, T> {
    m: &'a ShardedSparseMatrix<T>,
    a: &'a ShardedSparseMatrix<T>,
    b: &'a ShardedSparseMatrix<T>,
}

/// Splits `n_rows` local rows into `workers` equal blocks plus one
/// single-row block per leftover row
///
/// With fewer rows than workers every row is a leftover.
pub fn partition_blocks(n_rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let per_worker = n_rows / workers;
    let remainder = n_rows % workers;

    let full_blocks = if per_worker > 0 { workers } else { 0 };
    let mut blocks = Vec::with_capacity(full_blocks + remainder);
    if per_worker > 0 {
        for t in 0..workers {
            blocks.push(t * per_worker..(t + 1) * per_worker);
        }
    }

    let offset = per_worker * workers;
    for t in 0..remainder {
        blocks.push(offset + t..offset + t + 1);
    }

    blocks
}

/// Computes one output row into a freshly allocated `out`
///
/// Entries are only appended, so `out` must start empty; every caller in
/// this module hands it a slot straight from `empty_shards`.
#[inline]
pub(crate) fn row_kernel<T>(
    irow: usize,
    out: &mut SparseRow<T>,
    m: &ShardedSparseMatrix<T>,
    a: &ShardedSparseMatrix<T>,
    b: &ShardedSparseMatrix<T>,
    mut scratch: Option<&mut ScratchRow<T>>,
) where
    T: Copy + Num + AddAssign + Send + Sync,
{
    // return for empty row of A
    let a_row = a.row(irow);
    if a_row.is_empty() {
        return;
    }

    // Walking the mask row visits exactly the columns that pass the
    // existence test, already in increasing order.
    for icol in m.row(irow).columns() {
        let b_row = b.row(icol);
        if b_row.is_empty() {
            continue;
        }

        let result = match scratch.as_deref_mut() {
            Some(buffer) => dot(a_row.entries(), buffer.stage(b_row)),
            None => dot(a_row.entries(), b_row.entries()),
        };

        if let Some(sum) = result {
            let appended = out.push_sorted(icol, sum);
            debug_assert!(appended, "mask row columns must be increasing");
        }
    }
}

fn multi_row_kernel<T>(
    layout: ShardLayout,
    shard: usize,
    first_local: usize,
    block: &mut [SparseRow<T>],
    ops: Operands<'_, T>,
    staging: StagingMode,
) where
    T: Copy + Num + AddAssign + Send + Sync,
{
    let mut scratch = match staging {
        StagingMode::Scratch => Some(ScratchRow::new(ops.b.max_degree())),
        StagingMode::Direct => None,
    };

    for (offset, out) in block.iter_mut().enumerate() {
        // absolute row index
        let Some(irow) = layout.global(shard, first_local + offset) else {
            continue;
        };
        row_kernel(irow, out, ops.m, ops.a, ops.b, scratch.as_mut());
    }
}

fn shard_kernel<T>(
    layout: ShardLayout,
    shard: usize,
    rows: &mut [SparseRow<T>],
    ops: Operands<'_, T>,
    workers: usize,
    staging: StagingMode,
) where
    T: Copy + Num + AddAssign + Send + Sync,
{
    let n_local = layout.rows_owned(shard);
    let blocks = partition_blocks(n_local, workers);

    // Hand each block its own disjoint slice of the output shard
    let mut tasks = Vec::with_capacity(blocks.len());
    let mut rest = &mut rows[..n_local];
    for block in &blocks {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(block.len());
        tasks.push((block.start, head));
        rest = tail;
    }

    log::debug!(
        "shard {}: {} rows in {} tasks",
        shard,
        n_local,
        tasks.len()
    );

    tasks.into_par_iter().for_each(|(first_local, block)| {
        multi_row_kernel(layout, shard, first_local, block, ops, staging);
    });
}

fn check_operands<T>(
    m: &ShardedSparseMatrix<T>,
    a: &ShardedSparseMatrix<T>,
    b: &ShardedSparseMatrix<T>,
) -> Result<()>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    let n = a.row_count();
    for (operand, matrix) in [("M", m), ("B", b)] {
        if matrix.row_count() != n {
            return Err(Error::ShapeMismatch {
                operand,
                expected: n,
                got: matrix.row_count(),
            });
        }
    }
    Ok(())
}

/// Masked `A·Bᵗ`, parallel over shards and row blocks
///
/// The output uses `A`'s sharding. `config.workers_per_shard` sets the
/// number of row blocks per shard and `config.n_threads` the size of the
/// worker pool the kernel runs in; `config.n_shards` is a build-time
/// setting and is not consulted here.
///
/// # Examples
///
/// ```
/// use llt::{abt_mask_no_accum, KernelConfig, ShardedSparseMatrix};
///
/// // Lower triangle of a single triangle 0-1-2
/// let l = ShardedSparseMatrix::<i64>::from_pairs(3, 2, [(1, 0), (2, 0), (2, 1)]).unwrap();
///
/// let c = abt_mask_no_accum(&l, &l, &l, &KernelConfig::new(2, 2)).unwrap();
/// assert_eq!(c.row(2).entries(), &[(1, 1)]);
/// assert_eq!(c.reduce(), 1);
/// ```
pub fn abt_mask_no_accum<T>(
    m: &ShardedSparseMatrix<T>,
    a: &ShardedSparseMatrix<T>,
    b: &ShardedSparseMatrix<T>,
    config: &KernelConfig,
) -> Result<ShardedSparseMatrix<T>>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    config.validate()?;
    check_operands(m, a, b)?;

    let layout = a.layout();
    let ops = Operands { m, a, b };
    let workers = config.workers_per_shard;
    let staging = config.staging;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.n_threads)
        .build()?;

    let mut out = empty_shards(&layout)?;
    pool.install(|| {
        out.par_iter_mut().enumerate().for_each(|(shard, rows)| {
            shard_kernel(layout, shard, rows, ops, workers, staging);
        });
    });

    Ok(ShardedSparseMatrix::from_shards(layout, out))
}

/// Masked `A·Bᵗ` on the calling thread, rows in increasing global order
pub fn abt_mask_no_accum_sequential<T>(
    m: &ShardedSparseMatrix<T>,
    a: &ShardedSparseMatrix<T>,
    b: &ShardedSparseMatrix<T>,
    staging: StagingMode,
) -> Result<ShardedSparseMatrix<T>>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    check_operands(m, a, b)?;

    let layout = a.layout();
    let mut out = empty_shards(&layout)?;
    let mut scratch = match staging {
        StagingMode::Scratch => Some(ScratchRow::new(b.max_degree())),
        StagingMode::Direct => None,
    };

    for irow in 0..layout.n_rows() {
        let (shard, local) = layout.owner(irow);
        row_kernel(irow, &mut out[shard][local], m, a, b, scratch.as_mut());
    }

    Ok(ShardedSparseMatrix::from_shards(layout, out))
}
