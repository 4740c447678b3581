//! Error types for llt

use thiserror::Error;

/// Result type alias using llt's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, multiplying or loading matrices
#[derive(Error, Debug)]
pub enum Error {
    /// Matrix dimensions that cannot be allocated
    #[error("Invalid size: {reason}")]
    InvalidSize {
        /// What was wrong with the requested size
        reason: String,
    },

    /// An edge endpoint outside `[0, n_rows)`
    #[error("Index out of range: ({row}, {col}) in a matrix with {n_rows} rows")]
    RangeError {
        /// Row index of the rejected entry
        row: usize,
        /// Column index of the rejected entry
        col: usize,
        /// Number of rows (and columns) of the matrix
        n_rows: usize,
    },

    /// A second entry for a column that is already present in the row
    #[error("Duplicate edge ({row}, {col})")]
    DuplicateEdge {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },

    /// Declared counts in a binary edge list disagree with the file size
    #[error("Header mismatch: {nodes} nodes and {edges} edges need {expected} bytes, found {actual}")]
    HeaderMismatch {
        /// Declared node count
        nodes: u64,
        /// Declared edge count
        edges: u64,
        /// Byte length implied by the header
        expected: u64,
        /// Actual byte length
        actual: u64,
    },

    /// Kernel operands with different row counts
    #[error("Shape mismatch: operand '{operand}' has {got} rows, expected {expected}")]
    ShapeMismatch {
        /// Name of the offending operand
        operand: &'static str,
        /// Expected row count
        expected: usize,
        /// Actual row count
        got: usize,
    },

    /// A shard id outside `[0, n_shards)`
    #[error("Shard {shard} out of range for {n_shards} shards")]
    InvalidShard {
        /// The invalid shard id
        shard: usize,
        /// Number of shards
        n_shards: usize,
    },

    /// The worker pool could not be created
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// I/O failure while reading or writing an edge list
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an InvalidSize error
    pub fn invalid_size(reason: impl Into<String>) -> Self {
        Self::InvalidSize {
            reason: reason.into(),
        }
    }
}
