//! Metric record type and builders.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{assemble_tags, scalar_tags, MetricError};
use crate::config::ReportConfig;
use crate::probe::ProbeStatistics;
use crate::topology::{Agent, EndpointDescriptor, Target};

/// Name of the aggregate record whose tags hold the full statistics.
pub const AGGREGATE_METRIC: &str = "nqm-metrics";
pub const PACKETS_SENT: &str = "packets-sent";
pub const PACKETS_RECEIVED: &str = "packets-received";
pub const TRANSMISSION_TIME: &str = "transmission-time";

/// Longest accepted `metric` + `tags`, in bytes.
pub const MAX_METRIC_AND_TAGS_LEN: usize = 510;

/// How the backend interprets successive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CounterType {
    Gauge,
    Counter,
    Derive,
}

impl CounterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterType::Gauge => "GAUGE",
            CounterType::Counter => "COUNTER",
            CounterType::Derive => "DERIVE",
        }
    }
}

/// A metric value. Serialized bare, as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    fn is_empty(&self) -> bool {
        matches!(self, MetricValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

/// One record in the transfer service's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub metric: String,
    pub endpoint: String,
    pub value: MetricValue,
    pub counter_type: CounterType,
    pub tags: String,
    pub timestamp: i64,
    pub step: i64,
}

impl MetricRecord {
    /// A per-target scalar metric tagged with agent and target names.
    pub fn scalar(
        target: &Target,
        agent: &Agent,
        metric: &str,
        value: MetricValue,
        report: &ReportConfig,
        timestamp: i64,
    ) -> Self {
        Self {
            metric: metric.to_string(),
            endpoint: report.hostname.clone(),
            value,
            counter_type: CounterType::Gauge,
            tags: scalar_tags(target, agent),
            timestamp,
            step: report.step,
        }
    }

    /// The `nqm-metrics` record. Its value is always `"0"`; the data is in `tags`.
    pub fn aggregate(tags: String, report: &ReportConfig, timestamp: i64) -> Self {
        Self {
            metric: AGGREGATE_METRIC.to_string(),
            endpoint: report.hostname.clone(),
            value: MetricValue::from("0"),
            counter_type: CounterType::Gauge,
            tags,
            timestamp,
            step: report.step,
        }
    }

    /// Check the record against the transfer service's acceptance rules.
    pub fn validate(&self) -> Result<(), MetricError> {
        if self.metric.is_empty() {
            return Err(MetricError::EmptyMetric);
        }
        if self.endpoint.is_empty() {
            return Err(MetricError::EmptyEndpoint);
        }
        if self.value.is_empty() {
            return Err(MetricError::EmptyValue);
        }
        if self.step <= 0 {
            return Err(MetricError::InvalidStep(self.step));
        }
        let len = self.metric.len() + self.tags.len();
        if len > MAX_METRIC_AND_TAGS_LEN {
            return Err(MetricError::TooLong {
                metric: self.metric.clone(),
                len,
            });
        }
        Ok(())
    }
}

impl fmt::Display for MetricRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{metric: {}, endpoint: {}, value: {}, counterType: {}, tags: {}, timestamp: {}, step: {}}}",
            self.metric,
            self.endpoint,
            self.value,
            self.counter_type.as_str(),
            self.tags,
            self.timestamp,
            self.step
        )
    }
}

/// Build the four records for one probed target, in emission order:
/// packets sent, packets received, transmission time, then the aggregate.
pub fn target_records(
    stats: &ProbeStatistics,
    target: &Target,
    agent: &Agent,
    report: &ReportConfig,
    timestamp: i64,
) -> [MetricRecord; 4] {
    let scalar = |metric: &str, value: &str| {
        MetricRecord::scalar(target, agent, metric, MetricValue::from(value), report, timestamp)
    };

    let tags = assemble_tags(
        &EndpointDescriptor::from(target),
        &EndpointDescriptor::from(agent),
        stats,
    );

    [
        scalar(PACKETS_SENT, stats.pkt_transmit.as_str()),
        scalar(PACKETS_RECEIVED, stats.pkt_receive.as_str()),
        scalar(TRANSMISSION_TIME, stats.rtt_avg.as_str()),
        MetricRecord::aggregate(tags, report, timestamp),
    ]
}
