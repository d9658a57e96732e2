//! Dataset loader for CSV and Parquet files
//!
//! Files are read into a polars `DataFrame`, then each row is extracted into
//! a raw row struct and parsed. Malformed rows are rejected one at a time and
//! tallied in an [`IngestReport`]; only a missing column or an unreadable
//! file fails the whole load.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::RowError;
use super::records::{
    OrderRecord, RawOrderRow, RawQuoteRow, RawShipmentRow, ShipmentRecord, VendorQuote,
};
use super::schema::{PricingSchema, QuoteSchema, ShipmentSchema};

/// Rejected rows kept verbatim in the report; the rest are only counted.
pub const MAX_REJECTION_SAMPLES: usize = 20;

/// A rejected input row. `line` is the 1-based line in the source file,
/// counting the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub line: usize,
    pub error: RowError,
}

/// Outcome of ingesting one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub source: String,
    pub total_rows: usize,
    pub accepted: usize,
    /// Malformed rows
    pub rejected: usize,
    /// Rows dropped on purpose (placeholder transport mode)
    pub excluded: usize,
    pub by_reason: BTreeMap<String, usize>,
    pub samples: Vec<RejectedRow>,
}

impl IngestReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    fn reject(&mut self, index: usize, error: RowError) {
        if error.is_exclusion() {
            self.excluded += 1;
        } else {
            self.rejected += 1;
        }
        *self.by_reason.entry(error.kind().to_string()).or_insert(0) += 1;
        debug!(source = self.source.as_str(), line = index + 2, "Row rejected: {}", error);
        if self.samples.len() < MAX_REJECTION_SAMPLES {
            self.samples.push(RejectedRow {
                line: index + 2,
                error,
            });
        }
    }

    pub fn has_rejections(&self) -> bool {
        self.rejected > 0
    }
}

/// Parse every row, keeping successes and tallying failures.
pub fn collect_rows<T>(
    source: &str,
    rows: impl IntoIterator<Item = Result<T, RowError>>,
) -> (Vec<T>, IngestReport) {
    let mut report = IngestReport::new(source);
    let mut accepted = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        report.total_rows += 1;
        match row {
            Ok(record) => accepted.push(record),
            Err(error) => report.reject(index, error),
        }
    }
    report.accepted = accepted.len();

    if report.has_rejections() {
        warn!(
            source,
            rejected = report.rejected,
            total = report.total_rows,
            "Rejected malformed rows"
        );
    }
    info!(
        source,
        accepted = report.accepted,
        excluded = report.excluded,
        "Ingested rows"
    );

    (accepted, report)
}

/// Load a file into a DataFrame (CSV or Parquet based on extension).
///
/// `infer_schema_length` applies to CSV only; 0 scans the whole file.
pub fn load_frame(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Fail when any required column is absent.
pub fn ensure_columns(df: &DataFrame, required: &[&str], source: &str) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !has_column(df, name))
        .collect();
    if !missing.is_empty() {
        let available: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        anyhow::bail!(
            "Required column(s) {:?} not found in {}. Available columns: {:?}",
            missing,
            source,
            available
        );
    }
    Ok(())
}

/// Column values as trimmed strings; empty and null become `None`.
pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let column = df.column(name)?;
    let cast = column
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;
    let values = cast
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

/// Column values as f64; unparsable values become `None`.
pub(crate) fn number_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let column = df.column(name)?;
    let cast = column
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' cannot be read as a number", name))?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Extract shipment rows from an already loaded frame.
pub fn shipments_from_frame(
    df: &DataFrame,
    schema: &ShipmentSchema,
    source: &str,
) -> Result<(Vec<ShipmentRecord>, IngestReport)> {
    ensure_columns(df, &schema.required_columns(), source)?;

    let purchase = text_column(df, &schema.purchase_time)?;
    let delivery = text_column(df, &schema.delivery_time)?;
    let transport = text_column(df, &schema.transport_mode)?;
    let product = text_column(df, &schema.product)?;
    let fc = text_column(df, &schema.fulfillment_center)?;
    let state = text_column(df, &schema.state)?;
    let county = text_column(df, &schema.county)?;
    let distance = number_column(df, &schema.distance_miles)?;
    let group = text_column(df, &schema.group)?;

    let rows = (0..df.height()).map(|i| {
        RawShipmentRow {
            purchase_time: purchase[i].clone(),
            delivery_time: delivery[i].clone(),
            transport_mode: transport[i].clone(),
            product: product[i].clone(),
            fulfillment_center: fc[i].clone(),
            state: state[i].clone(),
            county: county[i].clone(),
            distance_miles: distance[i],
            group: group[i].clone(),
        }
        .parse(schema)
    });

    Ok(collect_rows(source, rows))
}

pub fn orders_from_frame(
    df: &DataFrame,
    schema: &PricingSchema,
    source: &str,
) -> Result<(Vec<OrderRecord>, IngestReport)> {
    ensure_columns(df, &schema.required_columns(), source)?;

    let purchase = text_column(df, &schema.purchase_time)?;
    let product = text_column(df, &schema.product)?;
    let state = text_column(df, &schema.state)?;
    let state_abbr = text_column(df, &schema.state_abbr)?;
    let county = text_column(df, &schema.county)?;
    let sending_zip = text_column(df, &schema.sending_zip)?;
    let receiving_zip = text_column(df, &schema.receiving_zip)?;
    let price = number_column(df, &schema.shipping_price)?;

    let rows = (0..df.height()).map(|i| {
        RawOrderRow {
            purchase_time: purchase[i].clone(),
            product: product[i].clone(),
            state: state[i].clone(),
            state_abbr: state_abbr[i].clone(),
            county: county[i].clone(),
            sending_zip: sending_zip[i].clone(),
            receiving_zip: receiving_zip[i].clone(),
            shipping_price: price[i],
        }
        .parse(schema)
    });

    Ok(collect_rows(source, rows))
}

pub fn quotes_from_frame(
    df: &DataFrame,
    schema: &QuoteSchema,
    source: &str,
) -> Result<(Vec<VendorQuote>, IngestReport)> {
    ensure_columns(df, &schema.required_columns(), source)?;

    let sending_zip = text_column(df, &schema.sending_zip)?;
    let receiving_zip = text_column(df, &schema.receiving_zip)?;
    let price = number_column(df, &schema.price)?;

    let rows = (0..df.height()).map(|i| {
        RawQuoteRow {
            sending_zip: sending_zip[i].clone(),
            receiving_zip: receiving_zip[i].clone(),
            price: price[i],
        }
        .parse(schema)
    });

    Ok(collect_rows(source, rows))
}

/// Load and parse the shipment dataset.
pub fn load_shipments(
    path: &Path,
    schema: &ShipmentSchema,
    infer_schema_length: usize,
) -> Result<(Vec<ShipmentRecord>, IngestReport)> {
    let df = load_frame(path, infer_schema_length)?;
    shipments_from_frame(&df, schema, &path.display().to_string())
}

/// Load and parse the order dataset of the pricing pipeline.
pub fn load_orders(
    path: &Path,
    schema: &PricingSchema,
    infer_schema_length: usize,
) -> Result<(Vec<OrderRecord>, IngestReport)> {
    let df = load_frame(path, infer_schema_length)?;
    orders_from_frame(&df, schema, &path.display().to_string())
}

/// Load and parse one vendor's quote list.
pub fn load_quotes(
    path: &Path,
    schema: &QuoteSchema,
    infer_schema_length: usize,
) -> Result<(Vec<VendorQuote>, IngestReport)> {
    let df = load_frame(path, infer_schema_length)?;
    quotes_from_frame(&df, schema, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_rows_tallies_by_reason() {
        let rows = vec![
            Ok(1),
            Err(RowError::MissingField {
                field: "fc".to_string(),
            }),
            Ok(2),
            Err(RowError::ExcludedTransportMode {
                value: "0".to_string(),
            }),
        ];
        let (accepted, report) = collect_rows("test", rows);

        assert_eq!(accepted, vec![1, 2]);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.excluded, 1);
        assert_eq!(report.by_reason.get("missing field"), Some(&1));
        assert_eq!(report.samples[0].line, 3);
    }

    #[test]
    fn test_quotes_from_frame_normalizes_numeric_zips() {
        let df = df! {
            "sending_zip" => [22001i64, 22001],
            "receiving_zip" => [43004i64, 43210],
            "vendor_A_pricing" => [Some(5.5f64), None],
        }
        .unwrap();
        let schema = PricingSchema::default().vendor_a;
        let (quotes, report) = quotes_from_frame(&df, &schema, "vendor_a").unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].sending_zip, "22001");
        assert_eq!(quotes[0].receiving_zip, "43004");
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn test_missing_required_column_fails_whole_load() {
        let df = df! {
            "sending_zip" => ["22001"],
            "vendor_A_pricing" => [5.0f64],
        }
        .unwrap();
        let schema = PricingSchema::default().vendor_a;
        let err = quotes_from_frame(&df, &schema, "vendor_a").unwrap_err();
        assert!(err.to_string().contains("receiving_zip"));
    }
}
