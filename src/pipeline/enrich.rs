//! Shipment enrichment: transit time and distance buckets

use chrono::NaiveDateTime;
use serde::Serialize;

use super::bucket::{Bucket, DistanceBucket, TransitBucket, DISTANCE_BUCKETS, TRANSIT_BUCKETS};
use super::records::ShipmentRecord;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A shipment with derived columns appended. The source fields are untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedShipment {
    #[serde(flatten)]
    pub record: ShipmentRecord,
    /// Delivery minus purchase, in fractional days
    pub elapsed_days: f64,
    /// Ceiling of `elapsed_days`, never below zero
    pub transit_days: i64,
    /// Delivery precedes purchase; the transit bucket is unclassified
    pub negative_transit: bool,
    pub transit_bucket: Bucket<TransitBucket>,
    /// Distance rounded to the nearest mile
    pub distance_whole_miles: i64,
    pub distance_bucket: Bucket<DistanceBucket>,
}

impl EnrichedShipment {
    pub fn index_time(&self) -> NaiveDateTime {
        self.record.delivery_time
    }
}

/// Fractional days between two timestamps.
pub fn elapsed_days(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000.0)
}

/// Whole transit days, rounded up. Negative spans clamp to zero.
pub fn transit_days(elapsed_days: f64) -> i64 {
    (elapsed_days.ceil() as i64).max(0)
}

pub fn transit_bucket(elapsed_days: f64) -> Bucket<TransitBucket> {
    TRANSIT_BUCKETS.classify(elapsed_days)
}

pub fn distance_bucket(whole_miles: i64) -> Bucket<DistanceBucket> {
    DISTANCE_BUCKETS.classify(whole_miles as f64)
}

/// Derive every enriched column for one shipment.
pub fn enrich_shipment(record: ShipmentRecord) -> EnrichedShipment {
    let elapsed = elapsed_days(record.purchase_time, record.delivery_time);
    let whole_miles = record.distance_miles.round() as i64;

    EnrichedShipment {
        elapsed_days: elapsed,
        transit_days: transit_days(elapsed),
        negative_transit: elapsed < 0.0,
        transit_bucket: transit_bucket(elapsed),
        distance_whole_miles: whole_miles,
        distance_bucket: distance_bucket(whole_miles),
        record,
    }
}

/// Enrich a batch, preserving input order.
pub fn enrich_all(records: Vec<ShipmentRecord>) -> Vec<EnrichedShipment> {
    records.into_iter().map(enrich_shipment).collect()
}
