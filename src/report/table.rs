//! Terminal tables for computed views

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{AggregateResult, ChoroplethResult, HierarchyResult, ViewResult};

/// Rows shown per view before the rest are summarised.
pub const DEFAULT_MAX_ROWS: usize = 25;

fn format_value(value: f64, aggregate: &str) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else if aggregate == "count" {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn header(names: impl IntoIterator<Item = String>) -> Vec<Cell> {
    names
        .into_iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table
}

fn value_cell(value: f64, aggregate: &str) -> Cell {
    Cell::new(format_value(value, aggregate))
        .fg(Color::Green)
        .set_alignment(CellAlignment::Right)
}

pub fn aggregate_table(result: &AggregateResult, max_rows: usize) -> Table {
    let mut table = new_table();
    let mut columns = result.dimensions.clone();
    columns.push("count".to_string());
    if result.aggregate != "count" {
        columns.push(result.aggregate.clone());
    }
    table.set_header(header(columns));

    for row in result.rows.iter().take(max_rows) {
        let mut cells: Vec<Cell> = row.key.iter().map(|v| Cell::new(v.to_string())).collect();
        cells.push(Cell::new(row.count).set_alignment(CellAlignment::Right));
        if result.aggregate != "count" {
            cells.push(value_cell(row.value, &result.aggregate));
        }
        table.add_row(cells);
    }
    table
}

pub fn choropleth_table(result: &ChoroplethResult, max_rows: usize) -> Table {
    let mut table = new_table();
    table.set_header(header(vec![
        result.region_field.clone(),
        "count".to_string(),
        result.aggregate.clone(),
    ]));

    for region in result.regions.iter().take(max_rows) {
        table.add_row(vec![
            Cell::new(&region.region),
            Cell::new(region.count).set_alignment(CellAlignment::Right),
            value_cell(region.value, &result.aggregate),
        ]);
    }
    table
}

/// Hierarchy as an indented tree, parents before their children.
pub fn hierarchy_table(result: &HierarchyResult, max_rows: usize) -> Table {
    let mut table = new_table();
    table.set_header(header(vec![
        result.levels.join(" › "),
        "count".to_string(),
        result.aggregate.clone(),
    ]));

    let mut ordered = Vec::with_capacity(result.nodes.len());
    let mut stack: Vec<&crate::pipeline::HierarchyNode> =
        result.nodes.iter().filter(|n| n.depth == 1).rev().collect();
    while let Some(node) = stack.pop() {
        ordered.push(node);
        let mut children: Vec<_> = result.children(&node.path).collect();
        children.reverse();
        stack.extend(children);
    }

    for node in ordered.into_iter().take(max_rows) {
        let label = format!("{}{}", "  ".repeat(node.depth - 1), node.label);
        let label_cell = if node.depth == 1 {
            Cell::new(label).add_attribute(Attribute::Bold)
        } else {
            Cell::new(label)
        };
        table.add_row(vec![
            label_cell,
            Cell::new(node.count).set_alignment(CellAlignment::Right),
            value_cell(node.value, &result.aggregate),
        ]);
    }
    table
}

fn row_count(result: &ViewResult) -> usize {
    match result {
        ViewResult::Table(r) => r.rows.len(),
        ViewResult::Map(r) => r.regions.len(),
        ViewResult::Sunburst(r) => r.nodes.len(),
    }
}

pub fn render_view(result: &ViewResult, max_rows: usize) -> Table {
    match result {
        ViewResult::Table(r) => aggregate_table(r, max_rows),
        ViewResult::Map(r) => choropleth_table(r, max_rows),
        ViewResult::Sunburst(r) => hierarchy_table(r, max_rows),
    }
}

/// Print a view's table indented, or a note when it is empty.
pub fn display_view(result: &ViewResult, max_rows: usize) {
    if result.is_empty() {
        println!("      {}", style("No rows match the current selection").dim());
        return;
    }

    for line in render_view(result, max_rows).to_string().lines() {
        println!("    {}", line);
    }

    let total = row_count(result);
    if total > max_rows {
        println!(
            "      {}",
            style(format!("... {} more rows (use --format json for all)", total - max_rows)).dim()
        );
    }
}
