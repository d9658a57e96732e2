//! Parcelview: outbound shipping analytics CLI
//!
//! Shipment and vendor pricing dashboards rendered as terminal tables or
//! exported as JSON.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use parcelview::cli::{run_pricing, run_shipments, run_snapshot, Cli, Commands};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.command {
        Commands::Shipments {
            input,
            view,
            cache_dir,
            no_cache,
            query,
        } => run_shipments(input, *view, cache_dir.as_deref(), *no_cache, query),
        Commands::Pricing {
            orders,
            vendor_a,
            vendor_b,
            view,
            query,
        } => run_pricing(orders, vendor_a, vendor_b, *view, query),
        Commands::Snapshot {
            input,
            cache_dir,
            schema,
            infer_schema_length,
        } => run_snapshot(
            input,
            cache_dir.as_deref(),
            schema.as_deref(),
            *infer_schema_length,
        ),
    }
}
