//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use parcelview::pipeline::{
    enrich_shipment, EnrichedShipment, MergedPricingRecord, OrderRecord, QuoteIndex,
    ShipmentRecord, VendorQuote,
};
use tempfile::TempDir;

pub const SHIPMENT_HEADER: &str = "purchase_time,delivery_date,transportmode,product_name,fc,recipient_state,recipient_county,haversine_distance_miles,group";

pub const ORDER_HEADER: &str =
    "purchase_time_index,product,state,state_abbr,county,sending_zip_code,delivery_zipcode,shipping_price";

/// Write `lines` (header first) to `dir/name`.
pub fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 10, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// A shipment purchased at `purchase` and delivered `elapsed_hours` later.
pub fn shipment(
    purchase: NaiveDateTime,
    elapsed_hours: i64,
    transport_mode: &str,
    product: &str,
    state: &str,
    distance_miles: f64,
) -> ShipmentRecord {
    ShipmentRecord {
        purchase_time: purchase,
        delivery_time: purchase + chrono::Duration::hours(elapsed_hours),
        product: product.to_string(),
        fulfillment_center: "FC1".to_string(),
        transport_mode: transport_mode.to_string(),
        state: state.to_string(),
        county: None,
        distance_miles,
        group: Some("home".to_string()),
    }
}

pub fn enriched(records: Vec<ShipmentRecord>) -> Vec<EnrichedShipment> {
    records.into_iter().map(enrich_shipment).collect()
}

/// A small mixed dataset: three transport modes over three states.
pub fn sample_shipments() -> Vec<EnrichedShipment> {
    enriched(vec![
        shipment(at(1, 8), 10, "ground", "A1", "Ohio", 12.0),
        shipment(at(1, 9), 46, "ground", "A1", "Ohio", 40.0),
        shipment(at(2, 8), 150, "express", "B2", "Texas", 320.0),
        shipment(at(3, 8), 30, "ground", "B2", "Texas", 80.0),
        shipment(at(4, 8), 20, "same-day", "A1", "Utah", 3.0),
        shipment(at(5, 8), 70, "express", "A1", "Ohio", 180.0),
    ])
}

pub fn order(product: &str, state: &str, sending_zip: &str, price: f64) -> OrderRecord {
    OrderRecord {
        purchase_time: at(1, 12),
        product: product.to_string(),
        state: state.to_string(),
        state_abbr: state[..2].to_uppercase(),
        county: Some(format!("{} County", state)),
        sending_zip: sending_zip.to_string(),
        receiving_zip: "43004".to_string(),
        shipping_price: price,
    }
}

pub fn quote(sending_zip: &str, receiving_zip: &str, price: f64) -> VendorQuote {
    VendorQuote {
        sending_zip: sending_zip.to_string(),
        receiving_zip: receiving_zip.to_string(),
        price,
    }
}

/// Orders joined against vendor lists built from `(sending_zip, price)` pairs.
pub fn merged(
    orders: Vec<OrderRecord>,
    vendor_a: &[(&str, f64)],
    vendor_b: &[(&str, f64)],
) -> Vec<MergedPricingRecord> {
    let a: Vec<VendorQuote> = vendor_a
        .iter()
        .map(|(zip, p)| quote(zip, "43004", *p))
        .collect();
    let b: Vec<VendorQuote> = vendor_b
        .iter()
        .map(|(zip, p)| quote(zip, "43004", *p))
        .collect();
    let (records, _) = parcelview::pipeline::merge_pricing(
        orders,
        &QuoteIndex::build(&a),
        &QuoteIndex::build(&b),
    );
    records
}

/// Temporary directory holding a shipment CSV with one malformed row and
/// one excluded row among five.
pub fn create_shipments_csv() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_csv(
        temp_dir.path(),
        "shipments.csv",
        &[
            SHIPMENT_HEADER,
            "2022-10-01 08:00:00,2022-10-01 17:36:00,ground,A1,FC1,Ohio,Franklin,12.2,home",
            "2022-10-01 08:00:00,2022-10-02 05:36:00,,A1,FC1,Ohio,,40,home",
            "2022-10-02 08:00:00,2022-10-08 12:48:00,express,B2,FC2,Texas,Travis,320.4,garden",
            "2022-10-02 08:00:00,not a date,ground,B2,FC2,Texas,Travis,80,garden",
            "2022-10-03 08:00:00,2022-10-04 08:00:00,0,B2,FC2,Texas,Travis,80,garden",
        ],
    );
    (temp_dir, path)
}

/// Temporary directory holding an order CSV and both vendor quote lists.
pub fn create_pricing_csvs() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let orders = write_csv(
        temp_dir.path(),
        "orders.csv",
        &[
            ORDER_HEADER,
            "2022-10-01 09:00:00,A1,Ohio,OH,Franklin,22001,43004,10.0",
            "2022-10-01 10:00:00,A1,Ohio,OH,Franklin,22001,43210,10.0",
            "2022-10-02 10:00:00,B2,Texas,TX,Travis,22002,73301,12.5",
        ],
    );
    let vendor_a = write_csv(
        temp_dir.path(),
        "vendor_a.csv",
        &[
            "sending_zip,receiving_zip,vendor_A_pricing",
            "22001,43004,8.0",
            "22002,73301,13.0",
        ],
    );
    let vendor_b = write_csv(
        temp_dir.path(),
        "vendor_b.csv",
        &[
            "sending_zip,receiving_zip,vendor_B_pricing",
            "22001,43004,9.0",
            "22002,73301,11.5",
        ],
    );
    (temp_dir, orders, vendor_a, vendor_b)
}
