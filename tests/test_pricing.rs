//! Tests for the vendor join and optimal-vendor selection

use parcelview::pipeline::{
    compare_prices, merge_pricing, optimal_vendor, PricingDataset, PricingField, PricingView,
    QuoteIndex, Vendor, ViewResult,
};
use parcelview::pipeline::{FilterState, PricingMeasure, Record};
use rand::Rng;

#[path = "common/mod.rs"]
mod common;

use common::{merged, order, quote};

#[test]
fn test_all_prices_equal_keeps_actual_carrier() {
    let c = compare_prices(10.0, Some(10.0), Some(10.0));
    assert_eq!(c.optimal_vendor, Vendor::VendorC);
    assert_eq!(c.optimal_price, 10.0);
    assert_eq!(c.pricing_difference, 0.0);
}

#[test]
fn test_cheapest_vendor_wins() {
    let c = compare_prices(10.0, Some(8.0), Some(9.0));
    assert_eq!(c.optimal_vendor, Vendor::VendorA);
    assert_eq!(c.optimal_price, 8.0);
    assert_eq!(c.pricing_difference, 2.0);
    assert_eq!(c.lowest_price_available, Some(8.0));

    let c = compare_prices(10.0, Some(9.5), Some(7.25));
    assert_eq!(c.optimal_vendor, Vendor::VendorB);
    assert_eq!(c.optimal_price, 7.25);
}

#[test]
fn test_no_quotes_degrades_to_actual() {
    let c = compare_prices(10.0, None, None);
    assert_eq!(c.optimal_vendor, Vendor::VendorC);
    assert_eq!(c.optimal_price, 10.0);
    assert_eq!(c.pricing_difference, 0.0);
    assert_eq!(c.lowest_price_available, None);
}

#[test]
fn test_quote_above_actual_is_not_optimal() {
    let c = compare_prices(10.0, Some(12.0), None);
    assert_eq!(c.optimal_vendor, Vendor::VendorC);
    assert_eq!(c.optimal_price, 10.0);
    assert_eq!(c.lowest_price_available, Some(12.0));
}

#[test]
fn test_tie_with_actual_goes_to_actual_carrier() {
    assert_eq!(optimal_vendor(8.0, Some(8.0), Some(9.0)), Vendor::VendorC);
    assert_eq!(optimal_vendor(8.0, None, Some(8.0)), Vendor::VendorC);
}

#[test]
fn test_optimal_price_bounds_hold_for_random_prices() {
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
        let actual: f64 = rng.gen_range(1.0..50.0);
        let a = rng.gen_bool(0.8).then(|| rng.gen_range(1.0..50.0));
        let b = rng.gen_bool(0.8).then(|| rng.gen_range(1.0..50.0));
        let c = compare_prices(actual, a, b);

        assert!(c.optimal_price <= actual);
        assert!(c.pricing_difference >= 0.0);
        let min_vendor = a
            .unwrap_or(f64::INFINITY)
            .min(b.unwrap_or(f64::INFINITY));
        assert!(c.optimal_price <= min_vendor);

        let chosen = match c.optimal_vendor {
            Vendor::VendorA => a,
            Vendor::VendorB => b,
            Vendor::VendorC => Some(actual),
        };
        assert_eq!(chosen, Some(c.optimal_price));
    }
}

#[test]
fn test_join_counts_matches() {
    let orders = vec![
        order("A1", "Ohio", "22001", 10.0),
        order("A1", "Ohio", "22002", 10.0),
        order("B2", "Texas", "22003", 10.0),
        order("B2", "Texas", "22004", 10.0),
    ];
    let a = QuoteIndex::build(&[quote("22001", "43004", 8.0), quote("22002", "43004", 9.0)]);
    let b = QuoteIndex::build(&[
        quote("22001", "43004", 9.0),
        quote("22003", "43004", 7.0),
        quote("22003", "43004", 1.0),
    ]);

    let (records, stats) = merge_pricing(orders, &a, &b);

    assert_eq!(records.len(), 4);
    assert_eq!(stats.matched_both, 1);
    assert_eq!(stats.matched_vendor_a_only, 1);
    assert_eq!(stats.matched_vendor_b_only, 1);
    assert_eq!(stats.unmatched, 1);
    assert_eq!(stats.duplicate_quotes, 1);
    // First duplicate quote wins
    assert_eq!(records[2].vendor_b_price, Some(7.0));
    assert_eq!(records[3].comparison.optimal_vendor, Vendor::VendorC);
}

#[test]
fn test_join_preserves_order_rows() {
    let orders = vec![
        order("A1", "Ohio", "22001", 10.0),
        order("B2", "Texas", "22001", 4.0),
    ];
    let records = merged(orders.clone(), &[("22001", 5.0)], &[]);
    let joined: Vec<_> = records.iter().map(|r| r.order.clone()).collect();
    assert_eq!(joined, orders);
    assert_eq!(records[0].measure(PricingMeasure::PricingDifference), Some(5.0));
    assert_eq!(records[1].measure(PricingMeasure::PricingDifference), Some(0.0));
}

#[test]
fn test_overspend_sunburst_skips_zero_difference() {
    let orders = vec![
        order("A1", "Ohio", "22001", 10.0),
        order("A1", "Ohio", "22002", 10.0),
        order("B2", "Texas", "22001", 6.0),
    ];
    let dataset = PricingDataset::from_parts(
        orders,
        &[quote("22001", "43004", 8.0)],
        &[quote("22002", "43004", 7.5)],
        Vec::new(),
    );

    let result = dataset
        .compute_view(PricingView::OverspendSunburst, &FilterState::new())
        .unwrap();
    let ViewResult::Sunburst(tree) = result else {
        panic!("expected a sunburst");
    };

    let vendors: Vec<String> = tree
        .nodes
        .iter()
        .filter(|n| n.depth == 1)
        .map(|n| n.label.to_string())
        .collect();
    assert_eq!(vendors, vec!["Vendor B".to_string(), "Vendor A".to_string()]);
    assert!(tree.leaves().all(|leaf| leaf.value > 0.0));
    assert_eq!(tree.leaves().count(), 2);
    assert!((dataset.total_overspend() - 4.5).abs() < 1e-9);
}

#[test]
fn test_overspend_map_is_keyed_by_state_abbreviation() {
    let orders = vec![
        order("A1", "Ohio", "22001", 10.0),
        order("A1", "Texas", "22001", 10.0),
        order("A1", "Texas", "22002", 10.0),
    ];
    let dataset = PricingDataset::from_parts(
        orders,
        &[quote("22001", "43004", 8.0)],
        &[],
        Vec::new(),
    );
    let filter = FilterState::new().with(PricingField::SendingZip, "22001");
    let ViewResult::Map(map) = dataset
        .compute_view(PricingView::OverspendMap, &filter)
        .unwrap()
    else {
        panic!("expected a map");
    };

    assert_eq!(map.value_for("OH"), Some(2.0));
    assert_eq!(map.value_for("TE"), Some(2.0));
    assert_eq!(map.regions.len(), 2);
}
