//! # llt: triangle counting by masked sparse products
//!
//! Counts the triangles of an undirected graph stored as a strictly lower
//! triangular adjacency matrix `L`. A triangle `k < j < i` shows up exactly
//! once as a nonzero of `L ⊙ (L·Lᵗ)`, so the count is the sum of
//!
//! ```text
//! C = L ⊙ (L · Lᵗ)
//! ```
//!
//! ## Components
//!
//! 1. **Sharded storage**: rows are distributed round-robin over `P`
//!    shards (`row % P`), each row a sorted list of `(column, value)`.
//!    Matrices are built through a [`MatrixBuilder`] and become read-only
//!    once sealed into a [`ShardedSparseMatrix`].
//!
//! 2. **Masked kernel**: [`abt_mask_no_accum`] computes `M ⊙ (A·Bᵗ)` by
//!    dotting rows of `A` against rows of `B` directly, only at positions
//!    present in `M`. Shards run in parallel, each split into worker
//!    blocks.
//!
//! 3. **Reduction**: per-shard partial sums combined into one scalar.
//!
//! ## Usage
//!
//! ```
//! use llt::{count_triangles, KernelConfig};
//!
//! // K4 on vertices 0..4, lower triangle only
//! let edges = [(1, 0), (2, 0), (2, 1), (3, 0), (3, 1), (3, 2)];
//! let config = KernelConfig::new(2, 2);
//!
//! assert_eq!(count_triangles(4, &edges, &config).unwrap(), 4);
//! ```
//!
//! The individual stages are public as well:
//!
//! ```
//! use llt::{abt_mask_no_accum, KernelConfig, ShardedSparseMatrix};
//!
//! let l = ShardedSparseMatrix::<i64>::from_pairs(3, 2, [(1, 0), (2, 0), (2, 1)]).unwrap();
//! let c = abt_mask_no_accum(&l, &l, &l, &KernelConfig::new(2, 1)).unwrap();
//! assert_eq!(c.reduce(), 1);
//! ```

pub mod error;
pub mod graph_io;
pub mod kernel;
pub mod matrix;
pub mod reduce;
pub mod utils;

// Re-export primary components
pub use error::{Error, Result};
pub use graph_io::{EdgeList, EdgeListHeader};
pub use kernel::{abt_mask_no_accum, abt_mask_no_accum_sequential, dot, dot_rows};
pub use kernel::{partition_blocks, ScratchRow};
pub use matrix::{DuplicatePolicy, KernelConfig, ShardLayout, StagingMode};
pub use matrix::{InsertOutcome, MatrixBuilder, ShardedSparseMatrix, SparseRow};
pub use matrix::{brute_force_triangles, dense_adjacency, naive_dot, reference_abt_mask};
pub use utils::{from_sprs_csr, to_sprs_csr};

/// Value type used for adjacency entries and triangle counts
pub type Scalar = i64;

/// Counts the triangles of the graph whose lower-triangle edges are `edges`
///
/// This is the main entry point for the library: it builds `L` over
/// `config.n_shards` shards, computes `L ⊙ (L·Lᵗ)` with the parallel
/// kernel and sums the result.
///
/// # Arguments
///
/// * `n_nodes` - Number of vertices
/// * `edges` - `(src, dst)` pairs with `dst < src`, each undirected edge once
/// * `config` - Shard and worker counts for the build and the kernel
///
/// # Errors
///
/// `RangeError` for endpoints `>= n_nodes`, `DuplicateEdge` for a repeated
/// pair, `InvalidSize` for a zero shard, worker or thread count.
pub fn count_triangles(
    n_nodes: usize,
    edges: &[(usize, usize)],
    config: &KernelConfig,
) -> Result<Scalar> {
    config.validate()?;

    let l = MatrixBuilder::<Scalar>::create(n_nodes, config.n_shards)?.build_sharded(edges)?;
    let c = abt_mask_no_accum(&l, &l, &l, config)?;

    Ok(c.par_reduce())
}

/// Version information for the llt library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
