//! Metric records handed to the transmission client.
//!
//! Each probed target yields three scalar metrics tagged with
//! human-readable names, and one `nqm-metrics` record whose tags carry the
//! id-keyed statistics.

mod record;
mod tags;

pub use record::*;
pub use tags::*;

use thiserror::Error;

/// Violations of the transfer service's record checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    #[error("metric name is empty")]
    EmptyMetric,
    #[error("endpoint is empty")]
    EmptyEndpoint,
    #[error("value is empty")]
    EmptyValue,
    #[error("step must be positive, got {0}")]
    InvalidStep(i64),
    #[error("metric {metric} with tags is {len} bytes, over the {max} byte limit", max = MAX_METRIC_AND_TAGS_LEN)]
    TooLong { metric: String, len: usize },
}
