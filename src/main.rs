use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use env_logger::Env;
use log::info;

use llt::{abt_mask_no_accum, EdgeList, KernelConfig, StagingMode};

/// Count the triangles of a graph stored as a binary lower-triangle edge list
#[derive(Parser, Debug)]
#[command(name = "llt", version)]
#[command(about = "Triangle counting via L ⊙ (L·Lᵗ)", long_about = None)]
struct Cli {
    /// Binary edge list: [nodes][edges][src...][dst...] as 64-bit integers
    input: PathBuf,

    /// Number of row shards (P); defaults to LLT_SHARDS or the CPU count
    #[arg(long)]
    shards: Option<usize>,

    /// Row blocks per shard (W); defaults to LLT_WORKERS or the CPU count
    #[arg(long)]
    workers: Option<usize>,

    /// Threads in the kernel pool; defaults to LLT_THREADS or the CPU count
    #[arg(long)]
    threads: Option<usize>,

    /// How right-operand rows are read: direct or scratch
    #[arg(long, value_parser = parse_staging)]
    staging: Option<StagingMode>,
}

fn parse_staging(name: &str) -> std::result::Result<StagingMode, String> {
    StagingMode::parse(name).ok_or_else(|| format!("unknown staging mode '{}'", name))
}

impl Cli {
    /// Environment defaults with command-line flags on top
    fn kernel_config(&self) -> KernelConfig {
        let mut config = KernelConfig::from_env();
        if let Some(n) = self.shards {
            config.n_shards = n;
        }
        if let Some(n) = self.workers {
            config.workers_per_shard = n;
        }
        if let Some(n) = self.threads {
            config.n_threads = n;
        }
        if let Some(mode) = self.staging {
            config.staging = mode;
        }
        config
    }
}

fn run(cli: &Cli) -> Result<i64> {
    let config = cli.kernel_config();
    config.validate().context("invalid kernel configuration")?;

    let start = Instant::now();
    let edges = EdgeList::read_from(&cli.input)
        .with_context(|| format!("failed to read edge list {}", cli.input.display()))?;
    info!("nnodes {}", edges.n_nodes);
    info!("nedges {}", edges.len());
    info!("Read input in {:.3?}", start.elapsed());

    let start = Instant::now();
    let l = edges
        .build_matrix(config.n_shards)
        .context("failed to build adjacency matrix")?;
    info!("Initialization complete.");
    info!("Max degree {}", l.max_degree());
    info!(
        "Built {} shards x {} rows in {:.3?}",
        l.shard_count(),
        l.layout().rows_per_shard(),
        start.elapsed()
    );

    let start = Instant::now();
    let c = abt_mask_no_accum(&l, &l, &l, &config).context("masked multiply failed")?;
    info!(
        "Multiply ({} workers/shard, {} threads, {:?} staging) in {:.3?}",
        config.workers_per_shard,
        config.n_threads,
        config.staging,
        start.elapsed()
    );

    info!("Start reduction.");
    let start = Instant::now();
    let n_triangles = c.par_reduce();
    info!("nTri {}", n_triangles);
    info!("Reduction in {:.3?}", start.elapsed());

    Ok(n_triangles)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            eprintln!("Requires binary edge list.");
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(n_triangles) => {
            println!("{}", n_triangles);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
