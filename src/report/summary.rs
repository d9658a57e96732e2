//! Ingestion summary report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{IngestReport, JoinStats, QualityStats};

/// Everything worth reporting about how the inputs were read
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub reports: Vec<IngestReport>,
    pub quality: Option<QualityStats>,
    pub join: Option<JoinStats>,
}

impl IngestSummary {
    pub fn new(reports: Vec<IngestReport>) -> Self {
        Self {
            reports,
            ..Default::default()
        }
    }

    pub fn with_quality(mut self, quality: QualityStats) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_join(mut self, join: JoinStats) -> Self {
        self.join = Some(join);
        self
    }

    fn source_name(source: &str) -> String {
        std::path::Path::new(source)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(source)
            .to_string()
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
            Cell::new("Accepted").add_attribute(Attribute::Bold),
            Cell::new("Rejected").add_attribute(Attribute::Bold),
            Cell::new("Excluded").add_attribute(Attribute::Bold),
        ]);

        for report in &self.reports {
            table.add_row(vec![
                Cell::new(Self::source_name(&report.source)),
                Cell::new(report.total_rows),
                Cell::new(report.accepted).fg(Color::Green),
                Cell::new(report.rejected).fg(if report.rejected == 0 {
                    Color::White
                } else {
                    Color::Red
                }),
                Cell::new(report.excluded).fg(if report.excluded == 0 {
                    Color::White
                } else {
                    Color::Yellow
                }),
            ]);
        }
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("INGEST SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        let reasons: Vec<(&str, usize)> = self
            .reports
            .iter()
            .flat_map(|r| r.by_reason.iter().map(|(k, v)| (k.as_str(), *v)))
            .collect();
        if !reasons.is_empty() {
            println!();
            println!("      {}", style("Rejections by reason").yellow());
            for (reason, count) in reasons {
                println!("        {} {}: {}", style("•").dim(), reason, count);
            }
        }

        if let Some(quality) = &self.quality {
            if quality.negative_transit > 0 || quality.unclassified_distance > 0 {
                println!();
                println!("      {}", style("Data quality").yellow());
                println!(
                    "        {} delivered before purchase: {}",
                    style("•").dim(),
                    quality.negative_transit
                );
                println!(
                    "        {} outside distance buckets: {}",
                    style("•").dim(),
                    quality.unclassified_distance
                );
            }
        }

        if let Some(join) = &self.join {
            println!();
            println!("      {}", style("Vendor quote matches").yellow());
            println!(
                "        {} both vendors: {}   vendor A only: {}   vendor B only: {}   none: {}",
                style("•").dim(),
                join.matched_both,
                join.matched_vendor_a_only,
                join.matched_vendor_b_only,
                join.unmatched
            );
            if join.duplicate_quotes > 0 {
                println!(
                    "        {} duplicate quote pairs ignored: {}",
                    style("•").dim(),
                    join.duplicate_quotes
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_source() {
        let mut orders = IngestReport::new("/data/orders.csv");
        orders.total_rows = 10;
        orders.accepted = 9;
        orders.rejected = 1;
        let summary = IngestSummary::new(vec![orders, IngestReport::new("vendor_a.csv")]);

        let rendered = summary.table().to_string();
        assert!(rendered.contains("orders.csv"));
        assert!(!rendered.contains("/data/"));
        assert!(rendered.contains("vendor_a.csv"));
    }
}
