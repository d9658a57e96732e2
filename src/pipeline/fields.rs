//! Dimensions and measures exposed by the two record types

use std::fmt;

use chrono::NaiveDateTime;

use super::bucket::{Bucket, DistanceBucket};
use super::enrich::EnrichedShipment;
use super::pricing::MergedPricingRecord;
use super::query::{DimValue, Field, Record};

fn distance_bucket_value(bucket: Bucket<DistanceBucket>) -> DimValue {
    match bucket {
        Bucket::Labeled(miles) => DimValue::Integer(i64::from(miles.0)),
        Bucket::Unclassified => DimValue::Text(bucket.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipmentField {
    TransportMode,
    Product,
    FulfillmentCenter,
    State,
    County,
    Group,
    TransitBucket,
    DistanceBucket,
    TransitDays,
    DistanceMiles,
}

impl Field for ShipmentField {
    fn all() -> &'static [Self] {
        &[
            ShipmentField::TransportMode,
            ShipmentField::Product,
            ShipmentField::FulfillmentCenter,
            ShipmentField::State,
            ShipmentField::County,
            ShipmentField::Group,
            ShipmentField::TransitBucket,
            ShipmentField::DistanceBucket,
            ShipmentField::TransitDays,
            ShipmentField::DistanceMiles,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            ShipmentField::TransportMode => "transport_mode",
            ShipmentField::Product => "product",
            ShipmentField::FulfillmentCenter => "fc",
            ShipmentField::State => "state",
            ShipmentField::County => "county",
            ShipmentField::Group => "group",
            ShipmentField::TransitBucket => "transit_bucket",
            ShipmentField::DistanceBucket => "distance_bucket",
            ShipmentField::TransitDays => "transit_days",
            ShipmentField::DistanceMiles => "distance_miles",
        }
    }
}

impl fmt::Display for ShipmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentMeasure {
    DistanceMiles,
    TransitDays,
    ElapsedDays,
}

impl fmt::Display for ShipmentMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShipmentMeasure::DistanceMiles => "distance_miles",
            ShipmentMeasure::TransitDays => "transit_days",
            ShipmentMeasure::ElapsedDays => "elapsed_days",
        };
        f.write_str(name)
    }
}

impl Record for EnrichedShipment {
    type Field = ShipmentField;
    type Measure = ShipmentMeasure;

    fn index_time(&self) -> NaiveDateTime {
        EnrichedShipment::index_time(self)
    }

    fn dimension(&self, field: ShipmentField) -> Option<DimValue> {
        let r = &self.record;
        match field {
            ShipmentField::TransportMode => Some(r.transport_mode.as_str().into()),
            ShipmentField::Product => Some(r.product.as_str().into()),
            ShipmentField::FulfillmentCenter => Some(r.fulfillment_center.as_str().into()),
            ShipmentField::State => Some(r.state.as_str().into()),
            ShipmentField::County => r.county.as_deref().map(DimValue::from),
            ShipmentField::Group => r.group.as_deref().map(DimValue::from),
            // "6+" is not numeric, so transit buckets group as text
            ShipmentField::TransitBucket => Some(DimValue::Text(self.transit_bucket.to_string())),
            ShipmentField::DistanceBucket => Some(distance_bucket_value(self.distance_bucket)),
            ShipmentField::TransitDays => Some(DimValue::Integer(self.transit_days)),
            ShipmentField::DistanceMiles => Some(DimValue::Integer(self.distance_whole_miles)),
        }
    }

    fn measure(&self, measure: ShipmentMeasure) -> Option<f64> {
        match measure {
            ShipmentMeasure::DistanceMiles => Some(self.record.distance_miles),
            ShipmentMeasure::TransitDays => Some(self.transit_days as f64),
            ShipmentMeasure::ElapsedDays => Some(self.elapsed_days),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PricingField {
    Product,
    State,
    StateAbbr,
    County,
    SendingZip,
    ReceivingZip,
    OptimalVendor,
}

impl Field for PricingField {
    fn all() -> &'static [Self] {
        &[
            PricingField::Product,
            PricingField::State,
            PricingField::StateAbbr,
            PricingField::County,
            PricingField::SendingZip,
            PricingField::ReceivingZip,
            PricingField::OptimalVendor,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            PricingField::Product => "product",
            PricingField::State => "state",
            PricingField::StateAbbr => "state_abbr",
            PricingField::County => "county",
            PricingField::SendingZip => "sending_zip",
            PricingField::ReceivingZip => "receiving_zip",
            PricingField::OptimalVendor => "optimal_vendor",
        }
    }
}

impl fmt::Display for PricingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMeasure {
    ShippingPrice,
    VendorAPrice,
    VendorBPrice,
    LowestPriceAvailable,
    OptimalPrice,
    PricingDifference,
}

impl fmt::Display for PricingMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PricingMeasure::ShippingPrice => "shipping_price",
            PricingMeasure::VendorAPrice => "vendor_a_price",
            PricingMeasure::VendorBPrice => "vendor_b_price",
            PricingMeasure::LowestPriceAvailable => "lowest_price_available",
            PricingMeasure::OptimalPrice => "optimal_price",
            PricingMeasure::PricingDifference => "pricing_difference",
        };
        f.write_str(name)
    }
}

impl Record for MergedPricingRecord {
    type Field = PricingField;
    type Measure = PricingMeasure;

    fn index_time(&self) -> NaiveDateTime {
        MergedPricingRecord::index_time(self)
    }

    fn dimension(&self, field: PricingField) -> Option<DimValue> {
        let o = &self.order;
        match field {
            PricingField::Product => Some(o.product.as_str().into()),
            PricingField::State => Some(o.state.as_str().into()),
            PricingField::StateAbbr => Some(o.state_abbr.as_str().into()),
            PricingField::County => o.county.as_deref().map(DimValue::from),
            PricingField::SendingZip => Some(o.sending_zip.as_str().into()),
            PricingField::ReceivingZip => Some(o.receiving_zip.as_str().into()),
            PricingField::OptimalVendor => {
                Some(DimValue::Text(self.comparison.optimal_vendor.to_string()))
            }
        }
    }

    fn measure(&self, measure: PricingMeasure) -> Option<f64> {
        match measure {
            PricingMeasure::ShippingPrice => Some(self.order.shipping_price),
            PricingMeasure::VendorAPrice => self.vendor_a_price,
            PricingMeasure::VendorBPrice => self.vendor_b_price,
            PricingMeasure::LowestPriceAvailable => self.comparison.lowest_price_available,
            PricingMeasure::OptimalPrice => Some(self.comparison.optimal_price),
            PricingMeasure::PricingDifference => Some(self.comparison.pricing_difference),
        }
    }
}
