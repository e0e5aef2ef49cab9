use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use stratus_batch::{AggregateResult, BatchExecutor, CapacityReport, InMemoryTable};
use stratus_listing::{DescriptorFilter, Lister, LocalDirSource};
use stratus_types::{BatchItem, Item, ListingScope, ResourceDescriptor, ResourcePath, WriteKind};
use tracing::{debug, info, warn};

use crate::cli::*;
use crate::config::StratusConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = StratusConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Put(args) => {
            let summary = cmd_put(&args, &config)?;
            print_summary(&summary, cli.format)
        }
        Command::Delete(args) => {
            let summary = cmd_delete(&args, &config)?;
            print_summary(&summary, cli.format)
        }
        Command::Ls(args) => cmd_ls(&args, &config, cli.format),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Outcome of one put or delete run.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub table: String,
    pub kind: WriteKind,
    pub rows: usize,
    pub totals: AggregateResult,
    pub capacity: Option<CapacityReport>,
}

fn cmd_put(args: &PutArgs, config: &StratusConfig) -> anyhow::Result<BatchSummary> {
    let mut table = open_table(&args.batch.table, &args.keys)?;
    let items = read_json_lines(&args.items)?;
    info!(table = table.name(), items = %args.items.display(), "writing items");
    let items = items.map(|item| item.map(BatchItem::put));
    drain(&mut table, items, WriteKind::Put, &args.batch, config)
}

fn cmd_delete(args: &DeleteArgs, config: &StratusConfig) -> anyhow::Result<BatchSummary> {
    if !args.batch.table.exists() {
        bail!("table file {} does not exist", args.batch.table.display());
    }
    let mut table = open_table(&args.batch.table, &[])?;
    let keys = read_json_lines(&args.keys)?;
    info!(table = table.name(), keys = %args.keys.display(), "deleting keys");
    let keys = keys.map(|key| key.map(BatchItem::delete));
    drain(&mut table, keys, WriteKind::Delete, &args.batch, config)
}

/// Stream `items` into `table`. Input stops at the first unreadable line;
/// items read before it are still written.
fn drain(
    table: &mut InMemoryTable,
    items: impl Iterator<Item = anyhow::Result<BatchItem>>,
    kind: WriteKind,
    opts: &BatchOptions,
    config: &StratusConfig,
) -> anyhow::Result<BatchSummary> {
    table.set_accept_per_call(opts.accept_per_call);
    let mut executor = BatchExecutor::new(config.executor_for(table.name(), opts))?;
    let mut bad_input = None;
    let items = items.map_while(|item| item.map_err(|e| bad_input = Some(e)).ok());
    let result = executor.submit_and_drain(items, table);
    // Whatever was applied before a failure is kept.
    save_table(&opts.table, table)?;
    let totals = result?;
    if let Some(e) = bad_input {
        return Err(e);
    }
    Ok(BatchSummary {
        table: table.name().to_string(),
        kind,
        rows: table.len(),
        capacity: CapacityReport::from_aggregate(kind, &totals, executor.config()),
        totals,
    })
}

/// Load the table stored at `path`, or create an empty one keyed by `keys`.
fn open_table(path: &Path, keys: &[String]) -> anyhow::Result<InMemoryTable> {
    if path.exists() {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read table file {}", path.display()))?;
        let table = InMemoryTable::from_json(&json)
            .with_context(|| format!("invalid table file {}", path.display()))?;
        if !keys.is_empty() && keys != table.key_attributes() {
            warn!(table = table.name(), "ignoring --key for an existing table");
        }
        debug!(table = table.name(), rows = table.len(), "opened table");
        return Ok(table);
    }
    if keys.is_empty() {
        bail!("--key is required to create table {}", path.display());
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    debug!(table = %name, "creating table");
    Ok(InMemoryTable::new(name, keys.to_vec()))
}

fn save_table(path: &Path, table: &InMemoryTable) -> anyhow::Result<()> {
    let json = table.to_json().context("cannot serialize table")?;
    fs::write(path, json).with_context(|| format!("cannot write table file {}", path.display()))
}

/// Lazily read one attribute map per non-blank line.
fn read_json_lines(path: &Path) -> anyhow::Result<impl Iterator<Item = anyhow::Result<Item>>> {
    let file = File::open(path).with_context(|| format!("cannot read {}", path.display()))?;
    let path = path.to_path_buf();
    let lines = BufReader::new(file).lines().enumerate();
    Ok(lines.filter_map(move |(n, line)| {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                let e = anyhow::Error::new(e).context(format!("{}:{}: read failed", path.display(), n + 1));
                return Some(Err(e));
            }
        };
        if line.trim().is_empty() {
            return None;
        }
        Some(
            serde_json::from_str::<Item>(&line)
                .with_context(|| format!("{}:{}: invalid attribute map", path.display(), n + 1)),
        )
    }))
}

fn print_summary(summary: &BatchSummary, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    let verb = match summary.kind {
        WriteKind::Put => "Wrote",
        WriteKind::Delete => "Deleted",
    };
    println!(
        "{} {} {} items in {} ({} submissions, {} retry cycles)",
        "✓".green().bold(),
        verb,
        summary.totals.items_written.to_string().bold(),
        summary.table.yellow(),
        summary.totals.submissions,
        summary.totals.total_retry_cycles,
    );
    println!("  Rows: {}", summary.rows);
    if let Some(report) = &summary.capacity {
        println!("  {} = {}", report.variable.cyan(), report.consumed_capacity_units);
    }
    Ok(())
}

fn open_lister(
    args: &LsArgs,
    config: &StratusConfig,
) -> anyhow::Result<Lister<LocalDirSource, impl DescriptorFilter>> {
    let path = ResourcePath::parse(&args.path)?;
    let source = LocalDirSource::new(&args.root, config.lister_for(args));
    let containers_only = args.containers_only;
    let objects_only = args.objects_only;
    let filter = move |d: &ResourceDescriptor| {
        (!containers_only || d.is_container) && (!objects_only || !d.is_container)
    };
    Ok(Lister::with_filter(source, ListingScope::from_path(path), filter)?)
}

fn cmd_ls(args: &LsArgs, config: &StratusConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut count = 0usize;
    for entry in open_lister(args, config)? {
        let d = entry?;
        count += 1;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&d)?),
            OutputFormat::Text if d.is_container => println!(
                "{:>12}  {}  {}",
                "-".dimmed(),
                d.last_modified.format("%Y-%m-%d %H:%M"),
                d.path.to_string().blue().bold()
            ),
            OutputFormat::Text => println!(
                "{:>12}  {}  {}",
                d.size,
                d.last_modified.format("%Y-%m-%d %H:%M"),
                d.path
            ),
        }
    }
    if format == OutputFormat::Text && count == 0 {
        println!("No entries under {}.", args.path.bold());
    }
    Ok(())
}
