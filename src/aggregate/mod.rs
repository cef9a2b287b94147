//! Grouping and summarising readings.

pub mod bucket;
pub mod entity;
pub mod stats;
pub mod summary;

pub use bucket::{Bucket, BucketAggregate, by_bucket};
pub use entity::{EntityAggregate, by_entity, grand_total, merge_partials, peak, ranked};
pub use stats::Stats;
pub use summary::Summary;
