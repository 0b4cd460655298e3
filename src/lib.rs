//! NQM agent - network quality metrics from fping output.
//!
//! Parses fping result lines, derives per-target latency and loss
//! statistics, and packages them as tagged metric records for the
//! transfer service.

pub mod config;
pub mod metric;
pub mod pipeline;
pub mod probe;
pub mod task;
pub mod topology;

pub use config::{AgentConfig, ReportConfig, RowPolicy};
pub use metric::{MetricRecord, MetricValue};
pub use pipeline::{marshal_all, marshal_all_now, MarshalError, Marshalled};
pub use probe::ProbeStatistics;
pub use task::{task, Fping, TaskError, TaskResponse};
