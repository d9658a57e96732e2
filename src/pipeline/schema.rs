//! Column mapping configuration
//!
//! Every input column is addressed by name through these structs so that
//! differently-labelled exports can be loaded without code changes. Defaults
//! match the column names of the outbound shipping and pricing exports.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Transport mode assigned when the column is empty.
pub const DEFAULT_TRANSPORT_MODE: &str = "same-day";

/// Column names for the shipment dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentSchema {
    pub purchase_time: String,
    pub delivery_time: String,
    pub transport_mode: String,
    pub product: String,
    pub fulfillment_center: String,
    pub state: String,
    pub county: String,
    pub distance_miles: String,
    pub group: String,
    /// Value substituted for a missing transport mode
    pub default_transport_mode: String,
    /// Transport mode values that mark a row as not shipped
    pub excluded_transport_modes: Vec<String>,
}

impl Default for ShipmentSchema {
    fn default() -> Self {
        Self {
            purchase_time: "purchase_time".to_string(),
            delivery_time: "delivery_date".to_string(),
            transport_mode: "transportmode".to_string(),
            product: "product_name".to_string(),
            fulfillment_center: "fc".to_string(),
            state: "recipient_state".to_string(),
            county: "recipient_county".to_string(),
            distance_miles: "haversine_distance_miles".to_string(),
            group: "group".to_string(),
            default_transport_mode: DEFAULT_TRANSPORT_MODE.to_string(),
            excluded_transport_modes: vec!["0".to_string()],
        }
    }
}

impl ShipmentSchema {
    /// Columns whose absence aborts the load.
    pub fn required_columns(&self) -> Vec<&str> {
        vec![
            self.purchase_time.as_str(),
            self.delivery_time.as_str(),
            self.product.as_str(),
            self.fulfillment_center.as_str(),
            self.state.as_str(),
            self.distance_miles.as_str(),
        ]
    }
}

/// Column names for one vendor's quote list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSchema {
    pub sending_zip: String,
    pub receiving_zip: String,
    pub price: String,
}

impl QuoteSchema {
    fn with_price(price: &str) -> Self {
        Self {
            sending_zip: "sending_zip".to_string(),
            receiving_zip: "receiving_zip".to_string(),
            price: price.to_string(),
        }
    }

    pub fn required_columns(&self) -> Vec<&str> {
        vec![
            self.sending_zip.as_str(),
            self.receiving_zip.as_str(),
            self.price.as_str(),
        ]
    }
}

/// Column names for the order dataset and both vendor quote lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSchema {
    pub purchase_time: String,
    pub product: String,
    pub state: String,
    pub state_abbr: String,
    pub county: String,
    pub sending_zip: String,
    pub receiving_zip: String,
    pub shipping_price: String,
    pub vendor_a: QuoteSchema,
    pub vendor_b: QuoteSchema,
}

impl Default for PricingSchema {
    fn default() -> Self {
        Self {
            purchase_time: "purchase_time_index".to_string(),
            product: "product".to_string(),
            state: "state".to_string(),
            state_abbr: "state_abbr".to_string(),
            county: "county".to_string(),
            sending_zip: "sending_zip_code".to_string(),
            receiving_zip: "delivery_zipcode".to_string(),
            shipping_price: "shipping_price".to_string(),
            vendor_a: QuoteSchema::with_price("vendor_A_pricing"),
            vendor_b: QuoteSchema::with_price("vendor_B_pricing"),
        }
    }
}

impl PricingSchema {
    pub fn required_columns(&self) -> Vec<&str> {
        vec![
            self.purchase_time.as_str(),
            self.product.as_str(),
            self.state.as_str(),
            self.state_abbr.as_str(),
            self.sending_zip.as_str(),
            self.receiving_zip.as_str(),
            self.shipping_price.as_str(),
        ]
    }
}

/// Top-level schema file: `{"shipments": {...}, "pricing": {...}}`.
/// Omitted sections and keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub shipments: ShipmentSchema,
    pub pricing: PricingSchema,
}

impl SchemaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse schema file: {}", path.display()))
    }

    /// Load from an optional path, defaulting when none is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
