//! Tests for filtering, grouping, choropleth and hierarchy queries

use chrono::NaiveDate;
use parcelview::pipeline::{
    aggregate, choropleth, distinct_values, hierarchy, Aggregate, DimValue, FilterState,
    GroupSpec, QueryError, ShipmentField, ShipmentMeasure,
};
use rand::seq::SliceRandom;

#[path = "common/mod.rs"]
mod common;

use common::{at, enriched, sample_shipments, shipment};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 10, d).unwrap()
}

#[test]
fn test_count_by_transport_mode_sorted_descending() {
    let records = sample_shipments();
    let result = aggregate(
        &records,
        &FilterState::new(),
        &GroupSpec::count(vec![ShipmentField::TransportMode]),
    )
    .unwrap();

    let keys: Vec<String> = result.rows.iter().map(|r| r.key[0].to_string()).collect();
    assert_eq!(keys, vec!["ground", "express", "same-day"]);
    assert_eq!(result.rows[0].count, 3);
    assert_eq!(result.total_count(), 6);
}

#[test]
fn test_equal_values_keep_first_seen_order() {
    let records = enriched(vec![
        shipment(at(1, 8), 5, "ground", "A1", "Utah", 10.0),
        shipment(at(1, 8), 5, "air", "A1", "Ohio", 10.0),
        shipment(at(1, 8), 5, "express", "A1", "Iowa", 10.0),
    ]);
    let result = aggregate(
        &records,
        &FilterState::new(),
        &GroupSpec::count(vec![ShipmentField::State]),
    )
    .unwrap();
    let keys: Vec<String> = result.rows.iter().map(|r| r.key[0].to_string()).collect();
    assert_eq!(keys, vec!["Utah", "Ohio", "Iowa"]);
}

#[test]
fn test_start_after_end_is_empty() {
    let records = sample_shipments();
    let filter = FilterState::between(day(5), day(1));
    let result = aggregate(
        &records,
        &filter,
        &GroupSpec::count(vec![ShipmentField::TransportMode]),
    )
    .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_unmatched_filter_value_is_empty() {
    let records = sample_shipments();
    let filter = FilterState::new().with(ShipmentField::Product, "no-such-product");
    let result = aggregate(
        &records,
        &filter,
        &GroupSpec::count(vec![ShipmentField::State]),
    )
    .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_date_range_is_inclusive_on_delivery_day() {
    let records = sample_shipments();
    // Deliveries land on Oct 1, 3, 8, 4, 5 and 8
    let filter = FilterState::between(day(3), day(4));
    let result = aggregate(
        &records,
        &filter,
        &GroupSpec::count(vec![ShipmentField::TransportMode]),
    )
    .unwrap();
    assert_eq!(result.total_count(), 2);

    let open_end = FilterState {
        start_date: Some(day(8)),
        end_date: None,
        equals: Vec::new(),
    };
    let result = aggregate(
        &records,
        &open_end,
        &GroupSpec::count(vec![ShipmentField::TransportMode]),
    )
    .unwrap();
    assert_eq!(result.total_count(), 2);
}

#[test]
fn test_grouping_is_independent_of_input_order() {
    let records = sample_shipments();
    let spec = GroupSpec::count(vec![ShipmentField::State, ShipmentField::TransportMode]);
    let expected = aggregate(&records, &FilterState::new(), &spec).unwrap();

    let mut shuffled = records.clone();
    shuffled.shuffle(&mut rand::thread_rng());
    let actual = aggregate(&shuffled, &FilterState::new(), &spec).unwrap();

    assert_eq!(actual.len(), expected.len());
    for row in &expected.rows {
        let other = actual.get(&row.key).unwrap();
        assert_eq!(other.count, row.count);
    }
}

#[test]
fn test_mean_of_distance() {
    let records = sample_shipments();
    let filter = FilterState::new().with(ShipmentField::State, "Texas");
    let result = aggregate(
        &records,
        &filter,
        &GroupSpec::mean(vec![ShipmentField::State], ShipmentMeasure::DistanceMiles),
    )
    .unwrap();
    assert_eq!(result.len(), 1);
    assert!((result.rows[0].value - 200.0).abs() < 1e-9);
}

#[test]
fn test_absent_dimension_is_left_out() {
    let mut records = sample_shipments();
    records[0].record.group = None;
    let result = aggregate(
        &records,
        &FilterState::new(),
        &GroupSpec::count(vec![ShipmentField::Group]),
    )
    .unwrap();
    assert_eq!(result.total_count(), 5);
}

#[test]
fn test_empty_grouping_is_rejected() {
    let records = sample_shipments();
    let err = aggregate(&records, &FilterState::new(), &GroupSpec::count(vec![])).unwrap_err();
    assert_eq!(err, QueryError::EmptyGrouping);
}

#[test]
fn test_choropleth_omits_regions_without_data() {
    let records = sample_shipments();
    let filter = FilterState::new().with(ShipmentField::TransportMode, "ground");
    let map = choropleth(&records, &filter, ShipmentField::State, Aggregate::Count, None);

    assert_eq!(map.value_for("Ohio"), Some(2.0));
    assert_eq!(map.value_for("Texas"), Some(1.0));
    assert_eq!(map.value_for("Utah"), None);
    assert_eq!(map.regions.len(), 2);
}

#[test]
fn test_hierarchy_parent_equals_sum_of_children() {
    let records = sample_shipments();
    let spec = GroupSpec::sum(
        vec![
            ShipmentField::State,
            ShipmentField::FulfillmentCenter,
            ShipmentField::TransportMode,
        ],
        ShipmentMeasure::DistanceMiles,
    );
    let tree = hierarchy(&records, &FilterState::new(), &spec).unwrap();

    for node in tree.nodes.iter().filter(|n| n.depth < 3) {
        let children: Vec<_> = tree.children(&node.path).collect();
        assert!(!children.is_empty());
        let count: u64 = children.iter().map(|c| c.count).sum();
        let value: f64 = children.iter().map(|c| c.value).sum();
        assert_eq!(node.count, count, "count at {}", node.id);
        assert!((node.value - value).abs() < 1e-9, "value at {}", node.id);
    }

    let ohio = tree.node(&[DimValue::from("Ohio")]).unwrap();
    assert_eq!(ohio.count, 3);
    assert!((ohio.value - 232.0).abs() < 1e-9);
    assert_eq!(ohio.parent, None);

    let leaf = tree
        .node(&[
            DimValue::from("Ohio"),
            DimValue::from("FC1"),
            DimValue::from("ground"),
        ])
        .unwrap();
    assert_eq!(leaf.parent.as_deref(), Some("Ohio/FC1"));
}

#[test]
fn test_hierarchy_ids_stay_distinct_when_values_contain_slashes() {
    let mut records = vec![
        shipment(at(1, 8), 10, "ground", "A1", "A/B", 10.0),
        shipment(at(1, 8), 10, "ground", "A1", "A", 10.0),
    ];
    records[0].fulfillment_center = "C".to_string();
    records[1].fulfillment_center = "B/C".to_string();
    let records = enriched(records);
    let spec = GroupSpec::count(vec![ShipmentField::State, ShipmentField::FulfillmentCenter]);

    let tree = hierarchy(&records, &FilterState::new(), &spec).unwrap();
    let leaves: Vec<_> = tree.leaves().collect();
    assert_eq!(leaves.len(), 2);
    assert_ne!(leaves[0].id, leaves[1].id);

    let first = tree
        .node(&[DimValue::from("A/B"), DimValue::from("C")])
        .unwrap();
    assert_eq!(first.id, "A\\/B/C");
    assert_eq!(first.parent.as_deref(), Some("A\\/B"));

    let second = tree
        .node(&[DimValue::from("A"), DimValue::from("B/C")])
        .unwrap();
    assert_eq!(second.id, "A/B\\/C");
    assert_eq!(second.parent.as_deref(), Some("A"));

    for leaf in tree.leaves() {
        let parent = leaf.parent.as_deref().unwrap();
        assert_eq!(tree.node(&leaf.path[..1]).unwrap().id, parent);
    }
}

#[test]
fn test_hierarchy_rejects_invalid_shapes() {
    let records = sample_shipments();
    let shallow = GroupSpec::count(vec![ShipmentField::State]);
    assert_eq!(
        hierarchy(&records, &FilterState::new(), &shallow).unwrap_err(),
        QueryError::InvalidHierarchyDepth(1)
    );

    let deep = GroupSpec::count(vec![
        ShipmentField::State,
        ShipmentField::FulfillmentCenter,
        ShipmentField::TransportMode,
        ShipmentField::Product,
        ShipmentField::Group,
    ]);
    assert_eq!(
        hierarchy(&records, &FilterState::new(), &deep).unwrap_err(),
        QueryError::InvalidHierarchyDepth(5)
    );

    let mean = GroupSpec::mean(
        vec![ShipmentField::State, ShipmentField::TransportMode],
        ShipmentMeasure::TransitDays,
    );
    assert_eq!(
        hierarchy(&records, &FilterState::new(), &mean).unwrap_err(),
        QueryError::MeanInHierarchy
    );
}

#[test]
fn test_distinct_values_are_sorted() {
    let records = sample_shipments();
    assert_eq!(
        distinct_values(&records, ShipmentField::State),
        vec!["Ohio", "Texas", "Utah"]
    );
}
