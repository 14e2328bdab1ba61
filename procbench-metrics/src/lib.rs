pub mod agg;
pub mod fields;
pub mod trial;

pub use agg::{AggregateRecord, Aggregator, RunningStats};
pub use fields::{CpuMetric, CpuSnapshot, MemMetric, MemSnapshot, Snapshot};
pub use trial::{MetricError, TrialRecord};
