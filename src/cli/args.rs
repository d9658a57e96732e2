//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::pipeline::{PricingView, ShipmentView};
use crate::report::DEFAULT_MAX_ROWS;

/// Parcelview - Outbound shipping and vendor pricing dashboards
#[derive(Parser, Debug)]
#[command(name = "parcelview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level for diagnostics on stderr (error, warn, info, debug, trace).
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shipment dashboard: transport modes, transit times, distances, states
    Shipments {
        /// Shipment dataset (CSV or Parquet)
        input: PathBuf,

        /// Compute a single view instead of the whole dashboard
        #[arg(long, value_enum)]
        view: Option<ShipmentView>,

        /// Reuse (or write) an enriched snapshot in this directory.
        /// Defaults to '.parcelview' next to the input when that directory exists.
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Always ingest the input, ignoring any snapshot directory
        #[arg(long, conflicts_with = "cache_dir")]
        no_cache: bool,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Pricing dashboard: orders joined with two vendor quote lists
    Pricing {
        /// Order dataset (CSV or Parquet)
        orders: PathBuf,

        /// Vendor A quote list
        #[arg(long)]
        vendor_a: PathBuf,

        /// Vendor B quote list
        #[arg(long)]
        vendor_b: PathBuf,

        /// Compute a single view instead of the whole dashboard
        #[arg(long, value_enum)]
        view: Option<PricingView>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Ingest a shipment dataset and write its enriched snapshot
    Snapshot {
        /// Shipment dataset (CSV or Parquet)
        input: PathBuf,

        /// Snapshot directory. Defaults to '.parcelview' next to the input.
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// JSON file overriding the default column names
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan (very slow for large files).
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

/// How view results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables on the terminal; JSON only when --output is given
    Table,
    /// JSON export only
    Json,
}

/// Options shared by both dashboards
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// First day included (YYYY-MM-DD). Open-ended when omitted.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD). Open-ended when omitted.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Equality filter as field=value; repeat for several fields
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// JSON export path.
    /// Defaults to input directory with '_dashboard.json' suffix when --format json.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rows shown per table before truncating
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// JSON file overriding the default column names
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Skip interactive prompts; unset selectors are left unfiltered
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

impl QueryArgs {
    /// Where to write the JSON export, if anywhere.
    pub fn output_path(&self, input: &Path) -> Option<PathBuf> {
        match (&self.output, self.format) {
            (Some(path), _) => Some(path.clone()),
            (None, OutputFormat::Json) => Some(derived_path(input, "_dashboard.json")),
            (None, OutputFormat::Table) => None,
        }
    }
}

/// `<dir>/<stem><suffix>` next to `input`.
pub fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}{}", stem, suffix))
}

/// Default snapshot directory for an input file.
pub fn default_cache_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(".parcelview")
}

/// Snapshot directory the `shipments` command reads through, if any.
///
/// An explicit `--cache-dir` always wins. Otherwise the default directory is
/// used once `snapshot` (or an earlier cached run) has created it.
pub fn shipment_cache_dir(
    input: &Path,
    cache_dir: Option<&Path>,
    no_cache: bool,
) -> Option<PathBuf> {
    if no_cache {
        return None;
    }
    match cache_dir {
        Some(dir) => Some(dir.to_path_buf()),
        None => Some(default_cache_dir(input)).filter(|dir| dir.is_dir()),
    }
}

/// Validator for --start and --end
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD form", s))
}

/// Validator for --filter
fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not in field=value form", s))?;
    let (field, value) = (field.trim(), value.trim());
    if field.is_empty() || value.is_empty() {
        return Err(format!("'{}' needs both a field and a value", s));
    }
    Ok((field.to_string(), value.to_string()))
}
