//! Configuration and system parameters for the masked kernel

use crate::error::{Error, Result};

/// How the kernel reads the right operand's rows during a dot product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingMode {
    /// Merge-join directly against the stored row
    Direct,
    /// Copy the row into the worker's scratch buffer first
    Scratch,
}

impl StagingMode {
    /// Parse a staging mode name (`direct` or `scratch`)
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "direct" | "none" => Some(StagingMode::Direct),
            "scratch" | "staged" => Some(StagingMode::Scratch),
            _ => None,
        }
    }
}

/// What to do when an insert hits a column already present in the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with `Error::DuplicateEdge`
    #[default]
    Reject,
    /// Add the new value onto the existing entry
    Sum,
}

/// Configuration for building and multiplying sharded matrices
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Number of row shards (P)
    pub n_shards: usize,

    /// Number of contiguous row blocks per shard (W)
    pub workers_per_shard: usize,

    /// Number of threads in the kernel's worker pool
    pub n_threads: usize,

    /// Whether right-operand rows are staged through scratch buffers
    pub staging: StagingMode,
}

impl Default for KernelConfig {
    fn default() -> Self {
        let n_threads = num_cpus::get(); // Use all available cores
        Self {
            n_shards: n_threads,
            workers_per_shard: n_threads,
            n_threads,
            staging: StagingMode::Direct,
        }
    }
}

impl KernelConfig {
    /// Create a config with explicit shard and worker counts
    pub fn new(n_shards: usize, workers_per_shard: usize) -> Self {
        Self {
            n_shards,
            workers_per_shard,
            ..Self::default()
        }
    }

    /// Single shard, single worker, single thread
    pub fn sequential() -> Self {
        Self {
            n_shards: 1,
            workers_per_shard: 1,
            n_threads: 1,
            staging: StagingMode::Direct,
        }
    }

    /// Set the staging mode
    pub fn with_staging(mut self, staging: StagingMode) -> Self {
        self.staging = staging;
        self
    }

    /// Set the size of the worker pool
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    /// Default configuration with `LLT_SHARDS`, `LLT_WORKERS`,
    /// `LLT_THREADS` and `LLT_STAGING` overrides applied
    ///
    /// `LLT_THREADS` replaces the CPU count every default is derived from,
    /// so it sets the shard and worker counts too. `LLT_SHARDS` and
    /// `LLT_WORKERS` are applied after it and win. Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(n) = env_usize("LLT_THREADS") {
            config.n_threads = n;
            config.n_shards = n;
            config.workers_per_shard = n;
        }
        if let Some(n) = env_usize("LLT_SHARDS") {
            config.n_shards = n;
        }
        if let Some(n) = env_usize("LLT_WORKERS") {
            config.workers_per_shard = n;
        }
        if let Ok(name) = std::env::var("LLT_STAGING") {
            match StagingMode::parse(&name) {
                Some(mode) => config.staging = mode,
                None => log::warn!("ignoring unknown LLT_STAGING value '{}'", name),
            }
        }

        config
    }

    /// Check that every count is at least one
    pub fn validate(&self) -> Result<()> {
        if self.n_shards == 0 {
            return Err(Error::invalid_size("shard count must be at least 1"));
        }
        if self.workers_per_shard == 0 {
            return Err(Error::invalid_size("workers per shard must be at least 1"));
        }
        if self.n_threads == 0 {
            return Err(Error::invalid_size("thread count must be at least 1"));
        }
        Ok(())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("ignoring non-numeric {}='{}'", key, value);
            None
        }
    }
}
