//! Filtering and grouped aggregation over enriched records
//!
//! Every chart in the dashboards is one of three shapes, all built from the
//! same single-pass group-by:
//!
//! - flat groupings keyed by one or more dimensions ([`aggregate`])
//! - one value per geographic region ([`choropleth`])
//! - a 2 to 4 level hierarchy with per-level totals ([`hierarchy`])
//!
//! Grouping keeps groups in first-seen order and then applies a stable sort
//! by aggregate value (descending), so equal values keep input order.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::error::QueryError;

/// A named categorical dimension of a record type.
pub trait Field: Copy + Eq + Hash + fmt::Debug + fmt::Display + 'static {
    /// Every field, in display order.
    fn all() -> &'static [Self];

    /// Stable identifier used on the command line and in exports.
    fn name(&self) -> &'static str;

    fn parse(name: &str) -> Result<Self, QueryError> {
        let wanted = name.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|field| field.name() == wanted)
            .ok_or_else(|| QueryError::UnknownField {
                name: name.to_string(),
                available: Self::all()
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A record that can be filtered by date and grouped by [`Field`]s.
pub trait Record {
    type Field: Field;
    type Measure: Copy + fmt::Debug + fmt::Display;

    /// Timestamp the date range is applied to.
    fn index_time(&self) -> NaiveDateTime;

    /// Value of a dimension, or `None` when the record has no value for it.
    fn dimension(&self, field: Self::Field) -> Option<DimValue>;

    fn measure(&self, measure: Self::Measure) -> Option<f64>;
}

/// One component of a group key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for DimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimValue::Integer(n) => n.fmt(f),
            DimValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DimValue {
    fn from(value: &str) -> Self {
        DimValue::Text(value.to_string())
    }
}

impl From<String> for DimValue {
    fn from(value: String) -> Self {
        DimValue::Text(value)
    }
}

impl From<i64> for DimValue {
    fn from(value: i64) -> Self {
        DimValue::Integer(value)
    }
}

/// Equality constraint on one field. Values compare by their text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityFilter<F> {
    pub field: F,
    pub value: String,
}

/// Date range plus categorical selections.
///
/// Both date bounds are inclusive calendar days; `None` leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<F> {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub equals: Vec<EqualityFilter<F>>,
}

impl<F> Default for FilterState<F> {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            equals: Vec::new(),
        }
    }
}

impl<F: Field> FilterState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            equals: Vec::new(),
        }
    }

    /// Add or replace the selection for `field`.
    pub fn with(mut self, field: F, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: F, value: impl Into<String>) {
        let value = value.into();
        match self.equals.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.value = value,
            None => self.equals.push(EqualityFilter { field, value }),
        }
    }

    pub fn value_for(&self, field: F) -> Option<&str> {
        self.equals
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.value.as_str())
    }

    /// True when the date bounds cannot match any day.
    pub fn is_empty_range(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(s), Some(e)) if s > e)
    }

    pub fn matches<R: Record<Field = F>>(&self, record: &R) -> bool {
        let day = record.index_time().date();
        if self.start_date.is_some_and(|start| day < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| day > end) {
            return false;
        }
        self.equals.iter().all(|filter| {
            record
                .dimension(filter.field)
                .is_some_and(|value| value.to_string() == filter.value)
        })
    }
}

/// How grouped rows are reduced to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate<M> {
    Count,
    Sum(M),
    Mean(M),
}

impl<M: fmt::Display> fmt::Display for Aggregate<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Count => f.write_str("count"),
            Aggregate::Sum(m) => write!(f, "sum of {}", m),
            Aggregate::Mean(m) => write!(f, "mean of {}", m),
        }
    }
}

/// Grouping dimensions and reduction for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec<F, M> {
    pub group_by: Vec<F>,
    pub aggregate: Aggregate<M>,
    /// Only records whose measure is present and non-zero take part
    pub nonzero: Option<M>,
}

impl<F, M> GroupSpec<F, M> {
    pub fn count(group_by: Vec<F>) -> Self {
        Self {
            group_by,
            aggregate: Aggregate::Count,
            nonzero: None,
        }
    }

    pub fn sum(group_by: Vec<F>, measure: M) -> Self {
        Self {
            group_by,
            aggregate: Aggregate::Sum(measure),
            nonzero: None,
        }
    }

    pub fn mean(group_by: Vec<F>, measure: M) -> Self {
        Self {
            group_by,
            aggregate: Aggregate::Mean(measure),
            nonzero: None,
        }
    }

    pub fn nonzero(mut self, measure: M) -> Self {
        self.nonzero = Some(measure);
        self
    }
}

/// A group key with its row count and aggregate value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: Vec<DimValue>,
    pub count: u64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub dimensions: Vec<String>,
    pub aggregate: String,
    pub rows: Vec<AggregateRow>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Row for an exact key, if present.
    pub fn get(&self, key: &[DimValue]) -> Option<&AggregateRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|row| row.count).sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: u64,
    measured: u64,
    sum: f64,
}

impl Accumulator {
    fn value<M>(&self, aggregate: &Aggregate<M>) -> f64 {
        match aggregate {
            Aggregate::Count => self.count as f64,
            Aggregate::Sum(_) => self.sum,
            Aggregate::Mean(_) if self.measured == 0 => f64::NAN,
            Aggregate::Mean(_) => self.sum / self.measured as f64,
        }
    }
}

/// Descending by value; NaN sorts last.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Records passing the filter (and the non-zero requirement, when set).
pub fn select<'a, R: Record>(
    records: &'a [R],
    filter: &'a FilterState<R::Field>,
    nonzero: Option<R::Measure>,
) -> impl Iterator<Item = &'a R> + 'a {
    let empty_range = filter.is_empty_range();
    records.iter().filter(move |record| {
        !empty_range
            && filter.matches(*record)
            && nonzero.map_or(true, |m| record.measure(m).is_some_and(|v| v != 0.0))
    })
}

/// Sorted distinct values of a field across all records.
pub fn distinct_values<R: Record>(records: &[R], field: R::Field) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.dimension(field))
        .map(|value| value.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Single pass: composite key -> accumulator, groups in first-seen order.
fn accumulate<R: Record>(
    records: &[R],
    filter: &FilterState<R::Field>,
    spec: &GroupSpec<R::Field, R::Measure>,
) -> Vec<(Vec<DimValue>, Accumulator)> {
    let mut index: HashMap<Vec<DimValue>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<DimValue>, Accumulator)> = Vec::new();

    for record in select(records, filter, spec.nonzero) {
        let key: Option<Vec<DimValue>> = spec
            .group_by
            .iter()
            .map(|field| record.dimension(*field))
            .collect();
        let Some(key) = key else {
            continue;
        };

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, Accumulator::default()));
                groups.len() - 1
            }
        };

        let acc = &mut groups[slot].1;
        acc.count += 1;
        if let Aggregate::Sum(m) | Aggregate::Mean(m) = spec.aggregate {
            if let Some(v) = record.measure(m) {
                acc.measured += 1;
                acc.sum += v;
            }
        }
    }

    groups
}

/// Group the filtered records and reduce each group.
pub fn aggregate<R: Record>(
    records: &[R],
    filter: &FilterState<R::Field>,
    spec: &GroupSpec<R::Field, R::Measure>,
) -> Result<AggregateResult, QueryError> {
    if spec.group_by.is_empty() {
        return Err(QueryError::EmptyGrouping);
    }

    let mut rows: Vec<AggregateRow> = accumulate(records, filter, spec)
        .into_iter()
        .map(|(key, acc)| AggregateRow {
            key,
            count: acc.count,
            value: acc.value(&spec.aggregate),
        })
        .collect();
    rows.sort_by(|a, b| descending(a.value, b.value));

    Ok(AggregateResult {
        dimensions: spec.group_by.iter().map(|f| f.name().to_string()).collect(),
        aggregate: spec.aggregate.to_string(),
        rows,
    })
}

/// One region's value on a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    pub region: String,
    pub count: u64,
    pub value: f64,
}

/// Values keyed by region. Regions without data are absent, not zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethResult {
    pub region_field: String,
    pub aggregate: String,
    pub regions: Vec<RegionValue>,
}

impl ChoroplethResult {
    pub fn value_for(&self, region: &str) -> Option<f64> {
        self.regions
            .iter()
            .find(|r| r.region == region)
            .map(|r| r.value)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

pub fn choropleth<R: Record>(
    records: &[R],
    filter: &FilterState<R::Field>,
    region: R::Field,
    aggregate_by: Aggregate<R::Measure>,
    nonzero: Option<R::Measure>,
) -> ChoroplethResult {
    let spec = GroupSpec {
        group_by: vec![region],
        aggregate: aggregate_by,
        nonzero,
    };
    let regions = accumulate(records, filter, &spec)
        .into_iter()
        .map(|(mut key, acc)| RegionValue {
            region: key.remove(0).to_string(),
            count: acc.count,
            value: acc.value(&spec.aggregate),
        });
    let mut regions: Vec<RegionValue> = regions.collect();
    regions.sort_by(|a, b| descending(a.value, b.value));

    ChoroplethResult {
        region_field: region.name().to_string(),
        aggregate: spec.aggregate.to_string(),
        regions,
    }
}

/// One node of a hierarchy: a path prefix and the total beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// Escaped path components joined with `/`
    pub id: String,
    pub parent: Option<String>,
    pub label: DimValue,
    pub path: Vec<DimValue>,
    /// 1 for the outermost ring
    pub depth: usize,
    pub count: u64,
    pub value: f64,
}

/// Pre-aggregated nodes for every level, outermost level first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyResult {
    pub levels: Vec<String>,
    pub aggregate: String,
    pub nodes: Vec<HierarchyNode>,
}

impl HierarchyResult {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, path: &[DimValue]) -> Option<&HierarchyNode> {
        self.nodes.iter().find(|n| n.path == path)
    }

    pub fn children<'a>(&'a self, path: &'a [DimValue]) -> impl Iterator<Item = &'a HierarchyNode> {
        self.nodes
            .iter()
            .filter(move |n| n.depth == path.len() + 1 && n.path.starts_with(path))
    }

    pub fn leaves(&self) -> impl Iterator<Item = &HierarchyNode> {
        let depth = self.levels.len();
        self.nodes.iter().filter(move |n| n.depth == depth)
    }
}

pub const MIN_HIERARCHY_DEPTH: usize = 2;
pub const MAX_HIERARCHY_DEPTH: usize = 4;

/// Path components joined with `/`; `\` and `/` inside a component are
/// backslash-escaped so distinct paths never share an id.
fn path_id(path: &[DimValue]) -> String {
    let mut id = String::new();
    for (i, value) in path.iter().enumerate() {
        if i > 0 {
            id.push('/');
        }
        for c in value.to_string().chars() {
            if c == '/' || c == '\\' {
                id.push('\\');
            }
            id.push(c);
        }
    }
    id
}

/// Aggregate along a dimension path, emitting a node for every prefix.
///
/// Leaves are the full-path groups; each ancestor is rolled up from the
/// leaves below it, so a parent's value always equals the sum of its
/// children. Only `Count` and `Sum` can be rolled up this way.
pub fn hierarchy<R: Record>(
    records: &[R],
    filter: &FilterState<R::Field>,
    spec: &GroupSpec<R::Field, R::Measure>,
) -> Result<HierarchyResult, QueryError> {
    let depth = spec.group_by.len();
    if !(MIN_HIERARCHY_DEPTH..=MAX_HIERARCHY_DEPTH).contains(&depth) {
        return Err(QueryError::InvalidHierarchyDepth(depth));
    }
    if matches!(spec.aggregate, Aggregate::Mean(_)) {
        return Err(QueryError::MeanInHierarchy);
    }

    let leaves = aggregate(records, filter, spec)?;
    let mut nodes = Vec::new();

    for level in 1..=depth {
        let mut index: HashMap<&[DimValue], usize> = HashMap::new();
        let mut level_nodes: Vec<HierarchyNode> = Vec::new();

        for leaf in &leaves.rows {
            let prefix = &leaf.key[..level];
            let slot = match index.get(prefix) {
                Some(&slot) => slot,
                None => {
                    index.insert(prefix, level_nodes.len());
                    level_nodes.push(HierarchyNode {
                        id: path_id(prefix),
                        parent: (level > 1).then(|| path_id(&prefix[..level - 1])),
                        label: prefix[level - 1].clone(),
                        path: prefix.to_vec(),
                        depth: level,
                        count: 0,
                        value: 0.0,
                    });
                    level_nodes.len() - 1
                }
            };
            level_nodes[slot].count += leaf.count;
            level_nodes[slot].value += leaf.value;
        }

        level_nodes.sort_by(|a, b| descending(a.value, b.value));
        nodes.extend(level_nodes);
    }

    Ok(HierarchyResult {
        levels: leaves.dimensions,
        aggregate: leaves.aggregate,
        nodes,
    })
}
