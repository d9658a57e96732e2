//! Columnar snapshots of the enriched shipment dataset
//!
//! A snapshot is a Parquet file plus a JSON sidecar holding the ingest
//! report. Both are named after an [`IngestionVersion`]: a BLAKE3 digest of
//! the raw input bytes, the column schema and the schema inference length.
//! Any change to those yields a new version, so an outdated snapshot is
//! simply never found.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::enrich::{enrich_all, EnrichedShipment};
use super::loader::{number_column, text_column, IngestReport};
use super::records::ShipmentRecord;
use super::schema::ShipmentSchema;

/// Bumped whenever the snapshot column layout changes.
const SNAPSHOT_FORMAT: &str = "parcelview-snapshot-v1";

/// Hex characters kept from the digest.
const VERSION_LEN: usize = 16;

/// Content-derived identifier of one ingestion input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngestionVersion(String);

impl IngestionVersion {
    /// Inference length changes how columns are typed, and with it which
    /// rows are accepted, so it is part of the version.
    pub fn from_bytes(
        raw: &[u8],
        schema: &ShipmentSchema,
        infer_schema_length: usize,
    ) -> Result<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(SNAPSHOT_FORMAT.as_bytes());
        hasher.update(serde_json::to_string(schema)?.as_bytes());
        hasher.update(&(infer_schema_length as u64).to_le_bytes());
        hasher.update(raw);
        let hex = hasher.finalize().to_hex();
        Ok(Self(hex.as_str()[..VERSION_LEN].to_string()))
    }

    pub fn of_file(
        path: &Path,
        schema: &ShipmentSchema,
        infer_schema_length: usize,
    ) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        Self::from_bytes(&raw, schema, infer_schema_length)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngestionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON sidecar written next to each snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub version: IngestionVersion,
    pub created_at: String,
    pub rows: usize,
    pub report: IngestReport,
}

/// Directory of snapshots for one input stem.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn data_path(&self, stem: &str, version: &IngestionVersion) -> PathBuf {
        self.dir.join(format!("{}-{}.parquet", stem, version))
    }

    pub fn manifest_path(&self, stem: &str, version: &IngestionVersion) -> PathBuf {
        self.dir.join(format!("{}-{}.json", stem, version))
    }

    /// Load a snapshot if one exists for this exact version.
    pub fn load(
        &self,
        stem: &str,
        version: &IngestionVersion,
    ) -> Result<Option<(Vec<EnrichedShipment>, IngestReport)>> {
        let data_path = self.data_path(stem, version);
        let manifest_path = self.manifest_path(stem, version);
        if !data_path.exists() || !manifest_path.exists() {
            debug!(version = version.as_str(), "No snapshot found");
            return Ok(None);
        }

        let text = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
        let manifest: SnapshotManifest = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?;

        let df = LazyFrame::scan_parquet(&data_path, Default::default())
            .with_context(|| format!("Failed to load snapshot: {}", data_path.display()))?
            .collect()
            .with_context(|| format!("Failed to read snapshot: {}", data_path.display()))?;
        let records = records_from_snapshot(&df)?;

        info!(
            version = version.as_str(),
            rows = records.len(),
            "Loaded enriched snapshot"
        );
        Ok(Some((records, manifest.report)))
    }

    /// Write the snapshot and its manifest, returning the data path.
    pub fn save(
        &self,
        stem: &str,
        version: &IngestionVersion,
        records: &[EnrichedShipment],
        report: &IngestReport,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory: {}", self.dir.display()))?;

        let data_path = self.data_path(stem, version);
        let mut df = snapshot_frame(records)?;
        let file = std::fs::File::create(&data_path)
            .with_context(|| format!("Failed to create snapshot: {}", data_path.display()))?;
        ParquetWriter::new(file)
            .finish(&mut df)
            .with_context(|| format!("Failed to write snapshot: {}", data_path.display()))?;

        let manifest = SnapshotManifest {
            version: version.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            rows: records.len(),
            report: report.clone(),
        };
        let manifest_path = self.manifest_path(stem, version);
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;

        info!(version = version.as_str(), rows = records.len(), "Wrote enriched snapshot");
        Ok(data_path)
    }
}

fn to_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

fn from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Source columns first, derived columns after them.
fn snapshot_frame(records: &[EnrichedShipment]) -> Result<DataFrame> {
    let source = |f: fn(&ShipmentRecord) -> String| -> Vec<String> {
        records.iter().map(|e| f(&e.record)).collect()
    };

    let df = DataFrame::new(vec![
        Column::new(
            "purchase_ms".into(),
            records
                .iter()
                .map(|e| to_millis(e.record.purchase_time))
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "delivery_ms".into(),
            records
                .iter()
                .map(|e| to_millis(e.record.delivery_time))
                .collect::<Vec<i64>>(),
        ),
        Column::new("product".into(), source(|r| r.product.clone())),
        Column::new(
            "fulfillment_center".into(),
            source(|r| r.fulfillment_center.clone()),
        ),
        Column::new("transport_mode".into(), source(|r| r.transport_mode.clone())),
        Column::new("state".into(), source(|r| r.state.clone())),
        Column::new(
            "county".into(),
            records
                .iter()
                .map(|e| e.record.county.clone())
                .collect::<Vec<Option<String>>>(),
        ),
        Column::new(
            "distance_miles".into(),
            records
                .iter()
                .map(|e| e.record.distance_miles)
                .collect::<Vec<f64>>(),
        ),
        Column::new(
            "group".into(),
            records
                .iter()
                .map(|e| e.record.group.clone())
                .collect::<Vec<Option<String>>>(),
        ),
        Column::new(
            "elapsed_days".into(),
            records.iter().map(|e| e.elapsed_days).collect::<Vec<f64>>(),
        ),
        Column::new(
            "transit_days".into(),
            records.iter().map(|e| e.transit_days).collect::<Vec<i64>>(),
        ),
        Column::new(
            "transit_bucket".into(),
            records
                .iter()
                .map(|e| e.transit_bucket.to_string())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "distance_bucket".into(),
            records
                .iter()
                .map(|e| e.distance_bucket.to_string())
                .collect::<Vec<String>>(),
        ),
    ])
    .context("Failed to build snapshot frame")?;

    Ok(df)
}

fn millis_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Snapshot column '{}' missing", name))?;
    Ok(column
        .i64()?
        .into_iter()
        .map(|v| v.and_then(from_millis))
        .collect())
}

/// Rebuild enriched records from the source columns of a snapshot.
///
/// Derived columns are recomputed rather than parsed back, so the in-memory
/// records are identical to a fresh ingest of the same rows.
fn records_from_snapshot(df: &DataFrame) -> Result<Vec<EnrichedShipment>> {
    let purchase = millis_column(df, "purchase_ms")?;
    let delivery = millis_column(df, "delivery_ms")?;
    let product = text_column(df, "product")?;
    let fc = text_column(df, "fulfillment_center")?;
    let transport = text_column(df, "transport_mode")?;
    let state = text_column(df, "state")?;
    let county = text_column(df, "county")?;
    let distance = number_column(df, "distance_miles")?;
    let group = text_column(df, "group")?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let record = (|| {
            Some(ShipmentRecord {
                purchase_time: purchase[i]?,
                delivery_time: delivery[i]?,
                product: product[i].clone()?,
                fulfillment_center: fc[i].clone()?,
                transport_mode: transport[i].clone()?,
                state: state[i].clone()?,
                county: county[i].clone(),
                distance_miles: distance[i]?,
                group: group[i].clone(),
            })
        })()
        .with_context(|| format!("Snapshot row {} is incomplete", i))?;
        records.push(record);
    }

    Ok(enrich_all(records))
}
