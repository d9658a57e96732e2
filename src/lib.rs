//! Parcelview: outbound shipping analytics
//!
//! Loads shipment and order datasets, enriches them with transit-time and
//! distance buckets and vendor price comparisons, and answers the fixed set
//! of grouped, choropleth and hierarchical queries behind two dashboards.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
