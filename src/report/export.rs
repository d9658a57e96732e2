//! Dashboard export to JSON

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{Field, FilterState, IngestReport, JoinStats, ViewResult};

/// The filter a run was computed with, in plain text form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub equals: BTreeMap<String, String>,
}

impl FilterSummary {
    pub fn from_filter<F: Field>(filter: &FilterState<F>) -> Self {
        Self {
            start_date: filter.start_date.map(|d| d.to_string()),
            end_date: filter.end_date.map(|d| d.to_string()),
            equals: filter
                .equals
                .iter()
                .map(|f| (f.field.name().to_string(), f.value.clone()))
                .collect(),
        }
    }

    /// "2022-10-01 .. 2022-10-31", with open sides shown as `*`.
    pub fn date_range(&self) -> String {
        format!(
            "{} .. {}",
            self.start_date.as_deref().unwrap_or("*"),
            self.end_date.as_deref().unwrap_or("*")
        )
    }

    /// `field=value` pairs for display.
    pub fn pairs(&self) -> Vec<String> {
        self.equals
            .iter()
            .map(|(field, value)| format!("{}={}", field, value))
            .collect()
    }
}

/// Metadata about the dashboard run
#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub parcelview_version: String,
    /// "shipments" or "pricing"
    pub dashboard: String,
    pub input_files: Vec<String>,
    /// Ingestion version of the shipment input, when a snapshot store was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_version: Option<String>,
    pub filter: FilterSummary,
}

/// One computed view
#[derive(Debug, Serialize)]
pub struct ExportedView {
    pub name: String,
    pub title: String,
    pub result: ViewResult,
}

/// Complete dashboard export
#[derive(Debug, Serialize)]
pub struct DashboardExport {
    pub metadata: ExportMetadata,
    pub ingest: Vec<IngestReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinStats>,
    pub views: Vec<ExportedView>,
}

impl DashboardExport {
    pub fn new(
        dashboard: &str,
        input_files: Vec<String>,
        ingestion_version: Option<String>,
        filter: FilterSummary,
    ) -> Self {
        Self {
            metadata: ExportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                parcelview_version: env!("CARGO_PKG_VERSION").to_string(),
                dashboard: dashboard.to_string(),
                input_files,
                ingestion_version,
                filter,
            },
            ingest: Vec::new(),
            join: None,
            views: Vec::new(),
        }
    }
}

/// Write the export as pretty-printed JSON.
pub fn write_export(export: &DashboardExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .context("Failed to serialize dashboard export to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write dashboard export to {}",
            output_path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ShipmentField;
    use chrono::NaiveDate;

    #[test]
    fn test_filter_summary_open_range() {
        let mut filter = FilterState::new().with(ShipmentField::Product, "A1");
        filter.end_date = NaiveDate::from_ymd_opt(2022, 10, 31);
        let summary = FilterSummary::from_filter(&filter);

        assert_eq!(summary.date_range(), "* .. 2022-10-31");
        assert_eq!(summary.pairs(), vec!["product=A1".to_string()]);
    }
}
