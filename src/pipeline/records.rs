//! Typed input records and row-level parsing
//!
//! The loader extracts each row into a `Raw*Row` of optional strings and
//! numbers; the `parse` methods turn those into typed records or a
//! [`RowError`] explaining why the row was rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::error::RowError;
use super::schema::{PricingSchema, QuoteSchema, ShipmentSchema};

/// Datetime layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts; the time is midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp in any of the supported layouts.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Normalize a zip code read from a possibly numeric column.
pub fn normalize_zip(value: &str) -> String {
    let trimmed = value.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).to_string()
}

fn required(value: Option<String>, field: &str) -> Result<String, RowError> {
    value.ok_or_else(|| RowError::MissingField {
        field: field.to_string(),
    })
}

fn required_timestamp(value: Option<String>, field: &str) -> Result<NaiveDateTime, RowError> {
    let raw = required(value, field)?;
    parse_timestamp(&raw).ok_or(RowError::InvalidTimestamp {
        field: field.to_string(),
        value: raw,
    })
}

fn required_number(value: Option<f64>, field: &str) -> Result<f64, RowError> {
    match value {
        None => Err(RowError::MissingField {
            field: field.to_string(),
        }),
        Some(v) if !v.is_finite() => Err(RowError::InvalidNumber {
            field: field.to_string(),
        }),
        Some(v) => Ok(v),
    }
}

/// One shipment as delivered by the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRecord {
    pub purchase_time: NaiveDateTime,
    pub delivery_time: NaiveDateTime,
    pub product: String,
    pub fulfillment_center: String,
    pub transport_mode: String,
    pub state: String,
    pub county: Option<String>,
    pub distance_miles: f64,
    pub group: Option<String>,
}

/// Untyped shipment row. Strings are trimmed and `None` when empty.
#[derive(Debug, Clone, Default)]
pub struct RawShipmentRow {
    pub purchase_time: Option<String>,
    pub delivery_time: Option<String>,
    pub transport_mode: Option<String>,
    pub product: Option<String>,
    pub fulfillment_center: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub distance_miles: Option<f64>,
    pub group: Option<String>,
}

impl RawShipmentRow {
    pub fn parse(self, schema: &ShipmentSchema) -> Result<ShipmentRecord, RowError> {
        let transport_mode = self
            .transport_mode
            .unwrap_or_else(|| schema.default_transport_mode.clone());
        if schema.excluded_transport_modes.contains(&transport_mode) {
            return Err(RowError::ExcludedTransportMode {
                value: transport_mode,
            });
        }

        Ok(ShipmentRecord {
            purchase_time: required_timestamp(self.purchase_time, &schema.purchase_time)?,
            delivery_time: required_timestamp(self.delivery_time, &schema.delivery_time)?,
            product: required(self.product, &schema.product)?,
            fulfillment_center: required(self.fulfillment_center, &schema.fulfillment_center)?,
            transport_mode,
            state: required(self.state, &schema.state)?,
            county: self.county,
            distance_miles: required_number(self.distance_miles, &schema.distance_miles)?,
            group: self.group,
        })
    }
}

/// One order in the pricing dataset, before the vendor join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub purchase_time: NaiveDateTime,
    pub product: String,
    pub state: String,
    pub state_abbr: String,
    pub county: Option<String>,
    pub sending_zip: String,
    pub receiving_zip: String,
    pub shipping_price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RawOrderRow {
    pub purchase_time: Option<String>,
    pub product: Option<String>,
    pub state: Option<String>,
    pub state_abbr: Option<String>,
    pub county: Option<String>,
    pub sending_zip: Option<String>,
    pub receiving_zip: Option<String>,
    pub shipping_price: Option<f64>,
}

impl RawOrderRow {
    pub fn parse(self, schema: &PricingSchema) -> Result<OrderRecord, RowError> {
        Ok(OrderRecord {
            purchase_time: required_timestamp(self.purchase_time, &schema.purchase_time)?,
            product: required(self.product, &schema.product)?,
            state: required(self.state, &schema.state)?,
            state_abbr: required(self.state_abbr, &schema.state_abbr)?,
            county: self.county,
            sending_zip: normalize_zip(&required(self.sending_zip, &schema.sending_zip)?),
            receiving_zip: normalize_zip(&required(self.receiving_zip, &schema.receiving_zip)?),
            shipping_price: required_number(self.shipping_price, &schema.shipping_price)?,
        })
    }
}

/// A vendor's quoted price for one zip pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorQuote {
    pub sending_zip: String,
    pub receiving_zip: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RawQuoteRow {
    pub sending_zip: Option<String>,
    pub receiving_zip: Option<String>,
    pub price: Option<f64>,
}

impl RawQuoteRow {
    pub fn parse(self, schema: &QuoteSchema) -> Result<VendorQuote, RowError> {
        Ok(VendorQuote {
            sending_zip: normalize_zip(&required(self.sending_zip, &schema.sending_zip)?),
            receiving_zip: normalize_zip(&required(self.receiving_zip, &schema.receiving_zip)?),
            price: required_number(self.price, &schema.price)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment_row() -> RawShipmentRow {
        RawShipmentRow {
            purchase_time: Some("2022-10-01 08:00:00".to_string()),
            delivery_time: Some("2022-10-03 12:00:00".to_string()),
            transport_mode: Some("express".to_string()),
            product: Some("Product B".to_string()),
            fulfillment_center: Some("Location B".to_string()),
            state: Some("OH".to_string()),
            county: None,
            distance_miles: Some(42.0),
            group: Some("Group B".to_string()),
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 10, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2022-10-01 08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2022-10-01T08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2022-10-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("10/01/2022 08:30"), Some(expected));
        assert_eq!(
            parse_timestamp("2022-10-01"),
            NaiveDate::from_ymd_opt(2022, 10, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_missing_transport_mode_defaults() {
        let row = RawShipmentRow {
            transport_mode: None,
            ..shipment_row()
        };
        let record = row.parse(&ShipmentSchema::default()).unwrap();
        assert_eq!(record.transport_mode, "same-day");
    }

    #[test]
    fn test_placeholder_transport_mode_is_excluded() {
        let row = RawShipmentRow {
            transport_mode: Some("0".to_string()),
            ..shipment_row()
        };
        let err = row.parse(&ShipmentSchema::default()).unwrap_err();
        assert!(err.is_exclusion());
    }

    #[test]
    fn test_bad_timestamp_names_the_column() {
        let row = RawShipmentRow {
            delivery_time: Some("not a date".to_string()),
            ..shipment_row()
        };
        let err = row.parse(&ShipmentSchema::default()).unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidTimestamp {
                field: "delivery_date".to_string(),
                value: "not a date".to_string(),
            }
        );
    }

    #[test]
    fn test_zip_normalization() {
        assert_eq!(normalize_zip(" 22001.0 "), "22001");
        assert_eq!(normalize_zip("02134"), "02134");
    }
}
