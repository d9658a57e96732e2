//! Vendor price join and optimal-vendor selection
//!
//! Orders are left-joined against two vendor quote lists on the
//! (sending zip, receiving zip) pair. For each order the cheapest carrier is
//! chosen and the overspend relative to that carrier is computed.
//!
//! # Selection rule
//!
//! Absent vendor prices count as +infinity. Vendor A wins when its price is
//! strictly below the actual price and no higher than vendor B's. Vendor B
//! wins when strictly below both. Otherwise the actual carrier ("Vendor C")
//! is optimal, which includes every tie with the actual price.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use super::records::{OrderRecord, VendorQuote};

/// Carrier that would have been cheapest for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Vendor {
    #[serde(rename = "Vendor A")]
    VendorA,
    #[serde(rename = "Vendor B")]
    VendorB,
    /// The carrier that actually shipped the order
    #[serde(rename = "Vendor C")]
    VendorC,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Vendor::VendorA => "Vendor A",
            Vendor::VendorB => "Vendor B",
            Vendor::VendorC => "Vendor C",
        };
        f.write_str(name)
    }
}

/// Outcome of comparing the actual price with both vendor quotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceComparison {
    /// Cheaper of the two vendor quotes, ignoring absent ones
    pub lowest_price_available: Option<f64>,
    pub optimal_vendor: Vendor,
    pub optimal_price: f64,
    /// Actual price minus optimal price
    pub pricing_difference: f64,
}

pub fn optimal_vendor(actual: f64, vendor_a: Option<f64>, vendor_b: Option<f64>) -> Vendor {
    let a = vendor_a.unwrap_or(f64::INFINITY);
    let b = vendor_b.unwrap_or(f64::INFINITY);

    if a < actual && a <= b {
        Vendor::VendorA
    } else if b < actual && b < a {
        Vendor::VendorB
    } else {
        Vendor::VendorC
    }
}

pub fn lowest_price_available(vendor_a: Option<f64>, vendor_b: Option<f64>) -> Option<f64> {
    match (vendor_a, vendor_b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

pub fn optimal_price(actual: f64, vendor_a: Option<f64>, vendor_b: Option<f64>) -> f64 {
    match lowest_price_available(vendor_a, vendor_b) {
        Some(lowest) if lowest < actual => lowest,
        _ => actual,
    }
}

/// Compare an order's actual price against the two optional quotes. Never fails.
pub fn compare_prices(actual: f64, vendor_a: Option<f64>, vendor_b: Option<f64>) -> PriceComparison {
    let optimal_price = optimal_price(actual, vendor_a, vendor_b);
    PriceComparison {
        lowest_price_available: lowest_price_available(vendor_a, vendor_b),
        optimal_vendor: optimal_vendor(actual, vendor_a, vendor_b),
        optimal_price,
        pricing_difference: actual - optimal_price,
    }
}

type ZipPair = (String, String);

/// Hash index over one vendor's quotes, keyed by zip pair.
#[derive(Debug, Clone, Default)]
pub struct QuoteIndex {
    prices: HashMap<ZipPair, f64>,
    duplicates: usize,
}

impl QuoteIndex {
    /// Build the index. When a zip pair repeats, the first quote is kept.
    pub fn build(quotes: &[VendorQuote]) -> Self {
        let mut index = Self::default();
        for quote in quotes {
            let key = (quote.sending_zip.clone(), quote.receiving_zip.clone());
            if index.prices.contains_key(&key) {
                index.duplicates += 1;
                continue;
            }
            index.prices.insert(key, quote.price);
        }
        index
    }

    pub fn lookup(&self, sending_zip: &str, receiving_zip: &str) -> Option<f64> {
        // Tuple keys cannot be borrowed as (&str, &str), so allocate the lookup key.
        self.prices
            .get(&(sending_zip.to_string(), receiving_zip.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Quotes ignored because their zip pair was already indexed.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// An order joined with both vendor quotes and its price comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedPricingRecord {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub vendor_a_price: Option<f64>,
    pub vendor_b_price: Option<f64>,
    #[serde(flatten)]
    pub comparison: PriceComparison,
}

impl MergedPricingRecord {
    pub fn index_time(&self) -> NaiveDateTime {
        self.order.purchase_time
    }

    pub fn shipping_price(&self) -> f64 {
        self.order.shipping_price
    }
}

/// Match counts from a pricing join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub orders: usize,
    pub matched_both: usize,
    pub matched_vendor_a_only: usize,
    pub matched_vendor_b_only: usize,
    pub unmatched: usize,
    pub duplicate_quotes: usize,
}

/// Left-join orders with both quote lists and compute the price comparison.
pub fn merge_pricing(
    orders: Vec<OrderRecord>,
    vendor_a: &QuoteIndex,
    vendor_b: &QuoteIndex,
) -> (Vec<MergedPricingRecord>, JoinStats) {
    let mut stats = JoinStats {
        orders: orders.len(),
        duplicate_quotes: vendor_a.duplicates() + vendor_b.duplicates(),
        ..Default::default()
    };

    let merged = orders
        .into_iter()
        .map(|order| {
            let a = vendor_a.lookup(&order.sending_zip, &order.receiving_zip);
            let b = vendor_b.lookup(&order.sending_zip, &order.receiving_zip);
            match (a.is_some(), b.is_some()) {
                (true, true) => stats.matched_both += 1,
                (true, false) => stats.matched_vendor_a_only += 1,
                (false, true) => stats.matched_vendor_b_only += 1,
                (false, false) => stats.unmatched += 1,
            }
            let comparison = compare_prices(order.shipping_price, a, b);
            MergedPricingRecord {
                order,
                vendor_a_price: a,
                vendor_b_price: b,
                comparison,
            }
        })
        .collect();

    debug!(
        orders = stats.orders,
        matched_both = stats.matched_both,
        unmatched = stats.unmatched,
        "Joined orders with vendor quotes"
    );

    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_vendor_quotes_below_actual_prefer_vendor_a() {
        let comparison = compare_prices(10.0, Some(7.0), Some(7.0));
        assert_eq!(comparison.optimal_vendor, Vendor::VendorA);
        assert_eq!(comparison.optimal_price, 7.0);
        assert_eq!(comparison.pricing_difference, 3.0);
    }

    #[test]
    fn test_single_quote_is_compared_against_actual() {
        let comparison = compare_prices(10.0, None, Some(6.5));
        assert_eq!(comparison.optimal_vendor, Vendor::VendorB);
        assert_eq!(comparison.lowest_price_available, Some(6.5));
        assert_eq!(comparison.pricing_difference, 3.5);
    }

    #[test]
    fn test_quote_index_keeps_first_duplicate() {
        let quotes = vec![
            VendorQuote {
                sending_zip: "22001".to_string(),
                receiving_zip: "43004".to_string(),
                price: 5.0,
            },
            VendorQuote {
                sending_zip: "22001".to_string(),
                receiving_zip: "43004".to_string(),
                price: 4.0,
            },
        ];
        let index = QuoteIndex::build(&quotes);
        assert_eq!(index.len(), 1);
        assert_eq!(index.duplicates(), 1);
        assert_eq!(index.lookup("22001", "43004"), Some(5.0));
        assert_eq!(index.lookup("22001", "99999"), None);
    }

    #[test]
    fn test_vendor_display_matches_serialized_name() {
        assert_eq!(Vendor::VendorC.to_string(), "Vendor C");
        assert_eq!(
            serde_json::to_string(&Vendor::VendorA).unwrap(),
            "\"Vendor A\""
        );
    }
}
