//! Owned, immutable datasets for the two dashboards
//!
//! A dataset is built once (from files, a snapshot, or records in memory)
//! and then only read. Every view is recomputed from it on demand.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use super::enrich::{enrich_all, EnrichedShipment};
use super::error::QueryError;
use super::fields::{PricingField, ShipmentField};
use super::loader::{load_orders, load_quotes, load_shipments, IngestReport};
use super::pricing::{merge_pricing, JoinStats, MergedPricingRecord, QuoteIndex};
use super::query::{distinct_values, FilterState};
use super::records::{OrderRecord, ShipmentRecord, VendorQuote};
use super::schema::{PricingSchema, ShipmentSchema};
use super::snapshot::{IngestionVersion, SnapshotStore};
use super::views::{run_view, PricingView, ShipmentView, ViewResult};

/// Where a shipment dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Parsed from the input file; no snapshot involved
    Fresh,
    /// Read back from an existing snapshot
    Hit,
    /// Parsed from the input file and a snapshot was written
    Written,
}

/// Data-quality counts over enriched shipments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityStats {
    pub negative_transit: usize,
    pub unclassified_transit: usize,
    pub unclassified_distance: usize,
}

pub struct ShipmentDataset {
    records: Vec<EnrichedShipment>,
    report: IngestReport,
    version: Option<IngestionVersion>,
    cache: CacheStatus,
}

impl ShipmentDataset {
    pub fn from_records(records: Vec<ShipmentRecord>, report: IngestReport) -> Self {
        Self::from_enriched(enrich_all(records), report)
    }

    pub fn from_enriched(records: Vec<EnrichedShipment>, report: IngestReport) -> Self {
        Self {
            records,
            report,
            version: None,
            cache: CacheStatus::Fresh,
        }
    }

    /// Load and enrich a shipment file.
    pub fn load(path: &Path, schema: &ShipmentSchema, infer_schema_length: usize) -> Result<Self> {
        let (records, report) = load_shipments(path, schema, infer_schema_length)?;
        let dataset = Self::from_records(records, report);
        dataset.log_quality();
        Ok(dataset)
    }

    /// Load through a snapshot store, reusing a snapshot of the same input
    /// when one exists and writing one otherwise.
    pub fn load_cached(
        path: &Path,
        schema: &ShipmentSchema,
        infer_schema_length: usize,
        store: &SnapshotStore,
    ) -> Result<Self> {
        let version = IngestionVersion::of_file(path, schema, infer_schema_length)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("shipments");

        if let Some((records, report)) = store.load(stem, &version)? {
            return Ok(Self {
                records,
                report,
                version: Some(version),
                cache: CacheStatus::Hit,
            });
        }

        let mut dataset = Self::load(path, schema, infer_schema_length)?;
        store.save(stem, &version, &dataset.records, &dataset.report)?;
        dataset.version = Some(version);
        dataset.cache = CacheStatus::Written;
        Ok(dataset)
    }

    pub fn records(&self) -> &[EnrichedShipment] {
        &self.records
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn version(&self) -> Option<&IngestionVersion> {
        self.version.as_ref()
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn quality(&self) -> QualityStats {
        let mut stats = QualityStats::default();
        for record in &self.records {
            if record.negative_transit {
                stats.negative_transit += 1;
            }
            if !record.transit_bucket.is_classified() {
                stats.unclassified_transit += 1;
            }
            if !record.distance_bucket.is_classified() {
                stats.unclassified_distance += 1;
            }
        }
        stats
    }

    fn log_quality(&self) {
        let stats = self.quality();
        if stats.negative_transit > 0 {
            warn!(
                count = stats.negative_transit,
                "Shipments delivered before purchase"
            );
        }
        if stats.unclassified_distance > 0 {
            info!(
                count = stats.unclassified_distance,
                "Shipments outside every distance bucket"
            );
        }
    }

    /// Sorted distinct values of a field, used as selector choices.
    pub fn distinct_values(&self, field: ShipmentField) -> Vec<String> {
        distinct_values(&self.records, field)
    }

    pub fn compute_view(
        &self,
        view: ShipmentView,
        filter: &FilterState<ShipmentField>,
    ) -> Result<ViewResult, QueryError> {
        run_view(view, &self.records, filter)
    }
}

/// Orders joined with both vendor quote lists.
pub struct PricingDataset {
    records: Vec<MergedPricingRecord>,
    reports: Vec<IngestReport>,
    join: JoinStats,
}

impl PricingDataset {
    pub fn from_parts(
        orders: Vec<OrderRecord>,
        vendor_a: &[VendorQuote],
        vendor_b: &[VendorQuote],
        reports: Vec<IngestReport>,
    ) -> Self {
        let index_a = QuoteIndex::build(vendor_a);
        let index_b = QuoteIndex::build(vendor_b);
        let (records, join) = merge_pricing(orders, &index_a, &index_b);

        if join.duplicate_quotes > 0 {
            warn!(
                duplicates = join.duplicate_quotes,
                "Duplicate zip pairs in vendor quotes; kept the first quote"
            );
        }
        info!(
            orders = join.orders,
            matched_both = join.matched_both,
            matched_vendor_a_only = join.matched_vendor_a_only,
            matched_vendor_b_only = join.matched_vendor_b_only,
            unmatched = join.unmatched,
            "Merged vendor pricing"
        );

        Self {
            records,
            reports,
            join,
        }
    }

    /// Load orders and both quote lists, then join them.
    pub fn load(
        orders_path: &Path,
        vendor_a_path: &Path,
        vendor_b_path: &Path,
        schema: &PricingSchema,
        infer_schema_length: usize,
    ) -> Result<Self> {
        let (orders, orders_report) = load_orders(orders_path, schema, infer_schema_length)?;
        let (quotes_a, report_a) = load_quotes(vendor_a_path, &schema.vendor_a, infer_schema_length)?;
        let (quotes_b, report_b) = load_quotes(vendor_b_path, &schema.vendor_b, infer_schema_length)?;

        Ok(Self::from_parts(
            orders,
            &quotes_a,
            &quotes_b,
            vec![orders_report, report_a, report_b],
        ))
    }

    pub fn records(&self) -> &[MergedPricingRecord] {
        &self.records
    }

    /// Ingest reports in load order: orders, vendor A, vendor B.
    pub fn reports(&self) -> &[IngestReport] {
        &self.reports
    }

    pub fn join_stats(&self) -> JoinStats {
        self.join
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total actual spend above the best available price.
    pub fn total_overspend(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.comparison.pricing_difference)
            .sum()
    }

    pub fn distinct_values(&self, field: PricingField) -> Vec<String> {
        distinct_values(&self.records, field)
    }

    pub fn compute_view(
        &self,
        view: PricingView,
        filter: &FilterState<PricingField>,
    ) -> Result<ViewResult, QueryError> {
        run_view(view, &self.records, filter)
    }
}
