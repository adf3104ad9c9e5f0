//! sheetmelt: Flatten nested JSON records into a table with merge regions
//!
//! Usage:
//!   # Infer the schema, read from file
//!   sheetmelt --row-ceiling 10000 orders.json
//!
//!   # Read NDJSON from stdin with a declared schema and export config
//!   cat orders.jsonl | sheetmelt --schema order.schema.json --config export.json
//!
//!   # Registered element types referenced by the main schema
//!   sheetmelt --schema order.json --register line.json --config export.json orders.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use sheetmelt::{
    ExportConfig, FlattenStrategy, SchemaDefinition, SchemaSource, TableOutput, Tabulator,
};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sheetmelt")]
#[command(
    about = "Flatten nested JSON records into rows, columns and merge regions",
    long_about = None
)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Schema definition (JSON); inferred from the records if omitted
    #[arg(long, short = 's')]
    schema: Option<PathBuf>,

    /// Additional definitions that repeated fields may reference by type name
    #[arg(long, value_name = "FILE")]
    register: Vec<PathBuf>,

    /// Type name used for an inferred schema
    #[arg(long, default_value = "root")]
    type_name: String,

    /// Export configuration (JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Maximum rows one record may expand to (required without --config)
    #[arg(long)]
    row_ceiling: Option<usize>,

    /// Row combination strategy: max_length, min_length or cartesian
    #[arg(long)]
    strategy: Option<String>,

    /// Comma-separated header labels of columns to merge
    #[arg(long)]
    merge: Option<String>,

    /// Merge every top-level scalar column
    #[arg(long)]
    merge_scalars: bool,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;

    let reader = if let Some(path) = &args.input {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Box::new(BufReader::new(file)) as Box<dyn Read>
    } else {
        Box::new(std::io::stdin()) as Box<dyn Read>
    };
    let records = read_records(reader)?;
    tracing::info!(records = records.len(), "read input");

    let mut tabulator = Tabulator::new();
    for path in &args.register {
        tabulator.register(read_json::<SchemaDefinition>(path)?);
    }

    let declared = args
        .schema
        .as_deref()
        .map(read_json::<SchemaDefinition>)
        .transpose()?;
    let source = match &declared {
        Some(definition) => SchemaSource::Declared(definition),
        None => SchemaSource::Inferred(&args.type_name),
    };

    let output = tabulator
        .tabulate(&records, source, &config)
        .context("Failed to tabulate records")?;

    for dropped in &output.dropped {
        tracing::warn!(
            record_index = dropped.record_index,
            reason = ?dropped.reason,
            "record dropped"
        );
    }

    write_output(&output, args.compact)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Export configuration from file and flags; flags win
fn build_config(args: &Args) -> Result<ExportConfig> {
    let mut config = match (&args.config, args.row_ceiling) {
        (Some(path), _) => read_json::<ExportConfig>(path)?,
        (None, Some(ceiling)) => ExportConfig::new(ceiling),
        (None, None) => bail!("--row-ceiling is required when no --config is given"),
    };

    if let Some(ceiling) = args.row_ceiling {
        config.row_ceiling = ceiling;
    }
    if let Some(strategy) = &args.strategy {
        config.flatten_strategy =
            serde_json::from_value::<FlattenStrategy>(Value::String(strategy.clone()))
                .with_context(|| format!("Unknown strategy '{}'", strategy))?;
    }
    if let Some(labels) = &args.merge {
        config.merge_columns.extend(
            labels
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
    }
    if args.merge_scalars {
        config.merge_scalar_columns = true;
    }

    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read a JSON array, a single JSON value, or NDJSON
fn read_records(reader: Box<dyn Read>) -> Result<Vec<Value>> {
    let mut content = Vec::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader
        .read_to_end(&mut content)
        .context("Failed to read input")?;

    // Try SIMD parsing first; it rejects NDJSON, which falls back to line-by-line
    let mut scratch = content.clone();
    match simd_json::to_owned_value(&mut scratch) {
        Ok(simd_json::OwnedValue::Array(arr)) => arr
            .iter()
            .map(|elem| -> Result<Value> {
                let json_str = simd_json::to_string(elem)?;
                Ok(serde_json::from_str(&json_str)?)
            })
            .collect(),
        Ok(elem) => {
            let json_str = simd_json::to_string(&elem)?;
            Ok(vec![serde_json::from_str(&json_str)?])
        }
        Err(_) => {
            let content_str = String::from_utf8_lossy(&content);
            let mut records = Vec::new();
            for (line_no, line) in content_str.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;
                records.push(value);
            }
            Ok(records)
        }
    }
}

fn write_output(output: &TableOutput, compact: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if compact {
        serde_json::to_writer(&mut handle, output)?;
    } else {
        serde_json::to_writer_pretty(&mut handle, output)?;
    }
    writeln!(handle)?;
    handle.flush().context("Failed to flush output")?;

    Ok(())
}
