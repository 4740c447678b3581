// Matrix data structures and operations

pub mod config;
pub mod layout;
pub mod reference;
pub mod row;
pub mod sharded;

pub use config::{DuplicatePolicy, KernelConfig, StagingMode};
pub use layout::ShardLayout;
pub use reference::{brute_force_triangles, dense_adjacency, naive_dot, reference_abt_mask};
pub use row::{InsertOutcome, SparseRow};
pub use sharded::{MatrixBuilder, ShardedSparseMatrix};
