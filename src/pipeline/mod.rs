//! Pipeline module - ingestion, enrichment, pricing join and aggregation

pub mod bucket;
pub mod dataset;
pub mod enrich;
pub mod error;
pub mod fields;
pub mod loader;
pub mod pricing;
pub mod query;
pub mod records;
pub mod schema;
pub mod snapshot;
pub mod views;

pub use bucket::{
    Bound, Bucket, BucketRange, BucketTable, DistanceBucket, TransitBucket, DISTANCE_BUCKETS,
    TRANSIT_BUCKETS,
};
pub use dataset::{CacheStatus, PricingDataset, QualityStats, ShipmentDataset};
pub use enrich::*;
pub use error::{QueryError, RowError};
pub use fields::*;
pub use loader::*;
pub use pricing::*;
pub use query::*;
pub use records::*;
pub use schema::*;
pub use snapshot::{IngestionVersion, SnapshotStore};
pub use views::*;
