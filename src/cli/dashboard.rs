//! The `shipments` and `pricing` commands

use std::path::Path;

use anyhow::Result;
use console::Term;

use super::args::{default_cache_dir, shipment_cache_dir, QueryArgs};
use super::prompts::{confirm_step, select_value};
use crate::pipeline::{
    CacheStatus, Field, FilterState, PricingDataset, PricingView, QueryError, Record, SchemaConfig,
    ShipmentDataset, ShipmentView, SnapshotStore, View, ViewResult, missing_selectors,
};
use crate::report::{
    display_view, write_export, DashboardExport, ExportedView, FilterSummary, IngestSummary,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_info, print_step_header, print_success, print_view_header, print_warning,
    RunCard,
};

type FieldOf<V> = <<V as View>::Record as Record>::Field;

/// Date range and `--filter` pairs as a filter over `F`.
pub fn base_filter<F: Field>(query: &QueryArgs) -> Result<FilterState<F>, QueryError> {
    let mut filter = FilterState {
        start_date: query.start,
        end_date: query.end,
        equals: Vec::new(),
    };
    for (name, value) in &query.filters {
        filter.set(F::parse(name)?, value.clone());
    }
    Ok(filter)
}

/// The base filter plus whichever selections are selectors of `view`.
///
/// Explicit `--filter` values apply to every view; prompted selections only
/// narrow the views that expose that dropdown.
pub fn filter_for_view<V: View>(
    view: V,
    base: &FilterState<FieldOf<V>>,
    selections: &[(FieldOf<V>, String)],
) -> FilterState<FieldOf<V>> {
    let mut filter = base.clone();
    for (field, value) in selections {
        if view.selectors().contains(field) && filter.value_for(*field).is_none() {
            filter.set(*field, value.clone());
        }
    }
    filter
}

fn interactive(query: &QueryArgs) -> bool {
    !query.no_confirm && Term::stdout().is_term()
}

/// Ask for a value for every selector the chosen views need and `base`
/// leaves unset.
fn prompt_selections<V: View>(
    views: &[V],
    base: &FilterState<FieldOf<V>>,
    choices: impl Fn(FieldOf<V>) -> Vec<String>,
) -> Result<Vec<(FieldOf<V>, String)>> {
    let mut fields: Vec<FieldOf<V>> = Vec::new();
    for view in views {
        for field in missing_selectors(*view, base) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }

    let mut selections = Vec::new();
    for field in fields {
        if let Some(value) = select_value(field.name(), &choices(field))? {
            selections.push((field, value));
        }
    }
    Ok(selections)
}

fn compute_views<V: View>(
    views: &[V],
    base: &FilterState<FieldOf<V>>,
    selections: &[(FieldOf<V>, String)],
    query: &QueryArgs,
    compute: impl Fn(V, &FilterState<FieldOf<V>>) -> Result<ViewResult, QueryError>,
) -> Result<Vec<ExportedView>> {
    let mut exported = Vec::with_capacity(views.len());
    for view in views {
        let filter = filter_for_view(*view, base, selections);
        let result = compute(*view, &filter)?;
        if query.format == super::args::OutputFormat::Table {
            print_view_header(view.title(), view.name());
            display_view(&result, query.max_rows);
        }
        exported.push(ExportedView {
            name: view.name().to_string(),
            title: view.title().to_string(),
            result,
        });
    }
    Ok(exported)
}

fn write_output(export: &DashboardExport, output: &Path, query: &QueryArgs) -> Result<()> {
    if output.exists()
        && interactive(query)
        && !confirm_step(&format!("Overwrite {}?", output.display()))?
    {
        print_info("Export skipped");
        return Ok(());
    }
    write_export(export, output)?;
    print_success(&format!("Dashboard written to {}", output.display()));
    Ok(())
}

fn run_card<'a>(
    title: &'a str,
    inputs: Vec<&'a Path>,
    filter: &FilterSummary,
    output: Option<&'a Path>,
) -> RunCard<'a> {
    RunCard {
        title,
        inputs,
        date_range: filter.date_range(),
        filters: filter.pairs(),
        output,
    }
}

pub fn run_shipments(
    input: &Path,
    view: Option<ShipmentView>,
    cache_dir: Option<&Path>,
    no_cache: bool,
    query: &QueryArgs,
) -> Result<()> {
    let schema = SchemaConfig::load_or_default(query.schema.as_deref())?;
    let base = base_filter::<crate::pipeline::ShipmentField>(query)?;
    let summary = FilterSummary::from_filter(&base);
    let output = query.output_path(input);

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&run_card(
        "Shipment dashboard",
        vec![input],
        &summary,
        output.as_deref(),
    ));

    print_step_header(1, "Load Shipments");
    let spinner = create_spinner("Loading and enriching shipments...");
    let dataset = match shipment_cache_dir(input, cache_dir, no_cache) {
        Some(dir) => ShipmentDataset::load_cached(
            input,
            &schema.shipments,
            query.infer_schema_length,
            &SnapshotStore::new(dir),
        )?,
        None => ShipmentDataset::load(input, &schema.shipments, query.infer_schema_length)?,
    };
    if dataset.report().has_rejections() {
        finish_with_warning(
            &spinner,
            &format!("Loaded {} shipments with rejected rows", dataset.len()),
        );
    } else {
        finish_with_success(&spinner, &format!("Loaded {} shipments", dataset.len()));
    }
    IngestSummary::new(vec![dataset.report().clone()])
        .with_quality(dataset.quality())
        .display();
    if dataset.is_empty() {
        print_warning("No shipments were accepted; every view will be empty");
    }

    print_step_header(2, "Compute Views");
    let views: Vec<ShipmentView> = match view {
        Some(v) => vec![v],
        None => ShipmentView::all().to_vec(),
    };
    let selections = if interactive(query) {
        prompt_selections(&views, &base, |field| dataset.distinct_values(field))?
    } else {
        Vec::new()
    };
    let results = compute_views(&views, &base, &selections, query, |v, f| {
        dataset.compute_view(v, f)
    })?;

    if let Some(output) = &output {
        let mut export = DashboardExport::new(
            "shipments",
            vec![input.display().to_string()],
            dataset.version().map(|v| v.to_string()),
            summary,
        );
        export.ingest.push(dataset.report().clone());
        export.views = results;
        write_output(&export, output, query)?;
    }

    print_completion("Dashboard complete!");
    Ok(())
}

pub fn run_pricing(
    orders: &Path,
    vendor_a: &Path,
    vendor_b: &Path,
    view: Option<PricingView>,
    query: &QueryArgs,
) -> Result<()> {
    let schema = SchemaConfig::load_or_default(query.schema.as_deref())?;
    let base = base_filter::<crate::pipeline::PricingField>(query)?;
    let summary = FilterSummary::from_filter(&base);
    let output = query.output_path(orders);

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&run_card(
        "Pricing dashboard",
        vec![orders, vendor_a, vendor_b],
        &summary,
        output.as_deref(),
    ));

    print_step_header(1, "Load And Join Pricing");
    let spinner = create_spinner("Joining orders with vendor quotes...");
    let dataset = PricingDataset::load(
        orders,
        vendor_a,
        vendor_b,
        &schema.pricing,
        query.infer_schema_length,
    )?;
    finish_with_success(
        &spinner,
        &format!(
            "Joined {} orders (total overspend {:.2})",
            dataset.len(),
            dataset.total_overspend()
        ),
    );
    IngestSummary::new(dataset.reports().to_vec())
        .with_join(dataset.join_stats())
        .display();
    if dataset.is_empty() {
        print_warning("No orders were accepted; every view will be empty");
    }

    print_step_header(2, "Compute Views");
    let views: Vec<PricingView> = match view {
        Some(v) => vec![v],
        None => PricingView::all().to_vec(),
    };
    let selections = if interactive(query) {
        prompt_selections(&views, &base, |field| dataset.distinct_values(field))?
    } else {
        Vec::new()
    };
    let results = compute_views(&views, &base, &selections, query, |v, f| {
        dataset.compute_view(v, f)
    })?;

    if let Some(output) = &output {
        let mut export = DashboardExport::new(
            "pricing",
            [orders, vendor_a, vendor_b]
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            None,
            summary,
        );
        export.ingest = dataset.reports().to_vec();
        export.join = Some(dataset.join_stats());
        export.views = results;
        write_output(&export, output, query)?;
    }

    print_completion("Dashboard complete!");
    Ok(())
}

/// Ingest a shipment file into its snapshot directory.
pub fn run_snapshot(
    input: &Path,
    cache_dir: Option<&Path>,
    schema: Option<&Path>,
    infer_schema_length: usize,
) -> Result<()> {
    let schema = SchemaConfig::load_or_default(schema)?;
    let dir = cache_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_cache_dir(input));
    let store = SnapshotStore::new(&dir);

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&RunCard {
        title: "Enriched snapshot",
        inputs: vec![input],
        date_range: "all".to_string(),
        filters: Vec::new(),
        output: Some(dir.as_path()),
    });

    print_step_header(1, "Ingest Shipments");
    let spinner = create_spinner("Ingesting shipments...");
    let dataset =
        ShipmentDataset::load_cached(input, &schema.shipments, infer_schema_length, &store)?;
    finish_with_success(&spinner, "Shipments ingested");

    match dataset.cache_status() {
        CacheStatus::Hit => print_info("Snapshot already up to date"),
        _ => print_success("Snapshot written"),
    }
    print_info(&format!(
        "{} rows, version {}",
        dataset.len(),
        dataset.version().map(|v| v.to_string()).unwrap_or_default()
    ));

    print_completion("Snapshot complete!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::OutputFormat;
    use crate::pipeline::ShipmentField;

    fn query(filters: Vec<(&str, &str)>) -> QueryArgs {
        QueryArgs {
            start: None,
            end: None,
            filters: filters
                .into_iter()
                .map(|(f, v)| (f.to_string(), v.to_string()))
                .collect(),
            format: OutputFormat::Table,
            output: None,
            max_rows: crate::report::DEFAULT_MAX_ROWS,
            schema: None,
            infer_schema_length: 100,
            no_confirm: true,
        }
    }

    #[test]
    fn test_base_filter_rejects_unknown_field() {
        let err = base_filter::<ShipmentField>(&query(vec![("warehouse", "x")])).unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { .. }));
    }

    #[test]
    fn test_selection_only_applies_to_views_that_expose_it() {
        let base = base_filter::<ShipmentField>(&query(vec![("state", "Ohio")])).unwrap();
        let selections = vec![(ShipmentField::Product, "A1".to_string())];

        let modes = filter_for_view(ShipmentView::TransportModes, &base, &selections);
        assert_eq!(modes.value_for(ShipmentField::Product), None);
        assert_eq!(modes.value_for(ShipmentField::State), Some("Ohio"));

        let by_product = filter_for_view(ShipmentView::TransportByProduct, &base, &selections);
        assert_eq!(by_product.value_for(ShipmentField::Product), Some("A1"));
    }
}
