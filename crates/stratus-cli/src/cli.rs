use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stratus",
    about = "Stratus: batch writes with retry and paginated listings",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with `[batch]` and `[listing]` sections
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write items into a table file in bounded batches
    Put(PutArgs),
    /// Delete keys from a table file in bounded batches
    Delete(DeleteArgs),
    /// List buckets, prefixes and objects under a directory root
    Ls(LsArgs),
    /// Print the effective configuration
    Config,
}

/// Options shared by the batch-write commands.
#[derive(Args, Clone, Debug)]
pub struct BatchOptions {
    /// JSON file holding the table; created if missing
    #[arg(long)]
    pub table: PathBuf,
    /// Items per submission (overrides the config file)
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Base backoff delay in milliseconds (overrides the config file)
    #[arg(long)]
    pub backoff_ms: Option<u64>,
    /// Simulate a throttled table that applies at most N items per call
    #[arg(long)]
    pub accept_per_call: Option<usize>,
    /// Do not accumulate consumed capacity
    #[arg(long)]
    pub no_capacity: bool,
}

#[derive(Args)]
pub struct PutArgs {
    #[command(flatten)]
    pub batch: BatchOptions,
    /// JSON-lines file, one attribute map per line
    #[arg(long)]
    pub items: PathBuf,
    /// Key attribute of a newly created table (repeatable)
    #[arg(long = "key")]
    pub keys: Vec<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub batch: BatchOptions,
    /// JSON-lines file, one key map per line
    #[arg(long)]
    pub keys: PathBuf,
}

#[derive(Args)]
pub struct LsArgs {
    /// Path to list: `/`, `/<bucket>/` or `/<bucket>/<prefix>`
    #[arg(default_value = "/")]
    pub path: String,
    /// Directory whose sub-directories act as buckets
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    #[arg(long, conflicts_with = "objects_only")]
    pub containers_only: bool,
    #[arg(long)]
    pub objects_only: bool,
    /// Results per page (overrides the config file)
    #[arg(long)]
    pub page_size: Option<usize>,
}
