//! Turns a batch of fping result lines into metric records.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{ReportConfig, RowPolicy};
use crate::metric::{target_records, MetricError, MetricRecord};
use crate::probe::{tokenize, ProbeError, ProbeStatistics};
use crate::topology::{Agent, Target};

/// Why a single row produced no records.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("no remaining target for this row")]
    MissingTarget,
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// Batch-level failures, raised under [`RowPolicy::FailFast`].
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error("row {row} matches no remaining target")]
    UnmatchedRow { row: usize },
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: RowError,
    },
}

/// A result line paired with the target it was probed for.
#[derive(Debug, Clone, Copy)]
pub struct ProbeRow<'a> {
    pub index: usize,
    pub line: &'a str,
    pub target: &'a Target,
}

/// Pair lines with targets by host, in order.
///
/// Each line is paired with the next unused target whose host equals the
/// line's first token. Targets passed over got no result line. Returns the
/// pairs and the indices of lines that matched no remaining target.
pub fn pair_rows<'a, S: AsRef<str>>(
    lines: &'a [S],
    targets: &'a [Target],
) -> (Vec<ProbeRow<'a>>, Vec<usize>) {
    let mut rows = Vec::with_capacity(lines.len());
    let mut unmatched = Vec::new();
    let mut next = 0;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let host = tokenize(line).get(0).ok();
        let offset = host.and_then(|host| targets[next..].iter().position(|t| t.host == host));

        match offset {
            Some(offset) => {
                for skipped in &targets[next..next + offset] {
                    tracing::warn!("No result line for target {}", skipped.host);
                }
                let target = &targets[next + offset];
                next += offset + 1;
                rows.push(ProbeRow {
                    index,
                    line,
                    target,
                });
            }
            None => unmatched.push(index),
        }
    }

    (rows, unmatched)
}

/// A row left out of the output under [`RowPolicy::Isolate`].
#[derive(Debug)]
pub struct RowRejection {
    pub row: usize,
    pub error: RowError,
}

/// Result of a marshal run.
#[derive(Debug, Default)]
pub struct Marshalled {
    /// Records for all accepted rows, four per row, in row order.
    pub records: Vec<MetricRecord>,
    pub rejected: Vec<RowRejection>,
}

/// Build the records for one row, checking each before it is returned.
pub fn marshal_row(
    row: &ProbeRow<'_>,
    agent: &Agent,
    report: &ReportConfig,
    timestamp: i64,
) -> Result<[MetricRecord; 4], RowError> {
    let stats = ProbeStatistics::from_line(row.line)?;
    let records = target_records(&stats, row.target, agent, report, timestamp);
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}

/// Marshal every line into metric records.
///
/// Lines are paired with targets by [`pair_rows`]. All records share the
/// timestamp `now`.
pub fn marshal_all<S: AsRef<str>>(
    lines: &[S],
    targets: &[Target],
    agent: &Agent,
    report: &ReportConfig,
    policy: RowPolicy,
    now: DateTime<Utc>,
) -> Result<Marshalled, MarshalError> {
    let (rows, unmatched) = pair_rows(lines, targets);
    if policy == RowPolicy::FailFast {
        if let Some(&row) = unmatched.first() {
            return Err(MarshalError::UnmatchedRow { row });
        }
    }

    let timestamp = now.timestamp();
    let mut out = Marshalled {
        records: Vec::with_capacity(rows.len() * 4),
        rejected: Vec::new(),
    };

    for row in &rows {
        match marshal_row(row, agent, report, timestamp) {
            Ok(records) => out.records.extend(records),
            Err(error) => match policy {
                RowPolicy::FailFast => {
                    return Err(MarshalError::Row {
                        row: row.index,
                        source: error,
                    })
                }
                RowPolicy::Isolate => {
                    tracing::warn!("Skipping row {} ({}): {}", row.index, row.target.host, error);
                    out.rejected.push(RowRejection {
                        row: row.index,
                        error,
                    });
                }
            },
        }
    }

    for row in unmatched {
        tracing::warn!("Skipping row {}: no target", row);
        out.rejected.push(RowRejection {
            row,
            error: RowError::MissingTarget,
        });
    }

    Ok(out)
}

/// [`marshal_all`] stamped with the current time.
pub fn marshal_all_now<S: AsRef<str>>(
    lines: &[S],
    targets: &[Target],
    agent: &Agent,
    report: &ReportConfig,
    policy: RowPolicy,
) -> Result<Marshalled, MarshalError> {
    marshal_all(lines, targets, agent, report, policy, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{CounterType, MetricValue, MAX_METRIC_AND_TAGS_LEN};
    use chrono::TimeZone;

    fn report() -> ReportConfig {
        ReportConfig {
            hostname: "unit-test-hostname".to_string(),
            step: 60,
        }
    }

    fn targets(hosts: &[&str]) -> Vec<Target> {
        hosts
            .iter()
            .enumerate()
            .map(|(i, host)| Target {
                id: i as i32,
                host: host.to_string(),
                isp_id: i as i16,
                isp_name: "test isp".to_string(),
                province_id: i as i16,
                province_name: "test province".to_string(),
                city_id: i as i16,
                city_name: "test city".to_string(),
                name_tag: "test nametag".to_string(),
            })
            .collect()
    }

    fn agent() -> Agent {
        Agent {
            id: 1,
            name: "agent_for_test".to_string(),
            isp_id: 2,
            isp_name: "IspName_for_test".to_string(),
            province_id: 3,
            province_name: "ProvinceName_for_test".to_string(),
            city_id: 4,
            city_name: "CityName_for_test".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_marshal_two_rows() {
        let lines = [
            "www.google.com : 13.24 38.90 19.62 9.48 13.62",
            "www.yahoo.com : 6.72 29.08 8.55 7.40 - 6.26",
        ];
        let t = targets(&["www.google.com", "www.yahoo.com"]);
        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::Isolate, now()).unwrap();
        assert!(out.rejected.is_empty());
        assert_eq!(out.records.len(), 8);

        let names: Vec<&str> = out.records.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(
            names,
            [
                "packets-sent",
                "packets-received",
                "transmission-time",
                "nqm-metrics",
                "packets-sent",
                "packets-received",
                "transmission-time",
                "nqm-metrics",
            ]
        );
        assert!(out.records[3].tags.contains(",target-id=0,"));
        assert!(out.records[7].tags.contains(",target-id=1,"));
        assert!(out.records[7].tags.ends_with(",pkttransmit=6,pktreceive=5"));
        assert_eq!(out.records[6].value, MetricValue::from("11.60"));

        for record in &out.records {
            assert!(!record.metric.is_empty());
            assert_eq!(record.endpoint, "unit-test-hostname");
            assert_eq!(record.counter_type, CounterType::Gauge);
            assert_eq!(record.timestamp, 1_700_000_000);
            assert!(record.step > 0);
            assert!(record.metric.len() + record.tags.len() <= MAX_METRIC_AND_TAGS_LEN);
        }
    }

    #[test]
    fn test_marshal_verbose_row() {
        let lines = ["www.google.com : xmt/rcv/%loss = 100/100/0%, min/avg/max = 8.61/14.5/46.5"];
        let t = targets(&["www.google.com"]);
        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::Isolate, now()).unwrap();
        assert_eq!(out.records.len(), 4);
        assert!(out.records[3]
            .tags
            .ends_with("rttmin=8.61,rttmax=46.5,rttavg=14.5,rttmdev=-1,rttmedian=-1,pkttransmit=100,pktreceive=100"));
    }

    #[test]
    fn test_isolate_skips_bad_row() {
        let lines = [
            "www.google.com : xmt/rcv/%loss = 4/3/25%",
            "www.yahoo.com : 6.72 - 8.55",
        ];
        let t = targets(&["www.google.com", "www.yahoo.com"]);
        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::Isolate, now()).unwrap();
        assert_eq!(out.records.len(), 4);
        assert!(out.records[3].tags.contains(",target-id=1,"));
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].row, 0);
        assert!(matches!(
            out.rejected[0].error,
            RowError::Probe(ProbeError::TokenOutOfRange { .. })
        ));
    }

    #[test]
    fn test_fail_fast_aborts_on_bad_row() {
        let lines = ["www.google.com : 1.0", "host : xmt/rcv/%loss = 4/3/25%"];
        let t = targets(&["www.google.com", "host"]);
        let err = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::FailFast, now())
            .unwrap_err();
        assert!(matches!(err, MarshalError::Row { row: 1, .. }));
    }

    #[test]
    fn test_non_finite_row_is_rejected() {
        let lines = ["a : -1.7e308 1.7e308", "b : 1.0 2.0"];
        let t = targets(&["a", "b"]);
        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::Isolate, now()).unwrap();
        assert_eq!(out.records.len(), 4);
        assert!(out.records.iter().all(|r| !r.tags.contains("inf")));
        assert_eq!(out.rejected[0].row, 0);
        assert!(matches!(
            out.rejected[0].error,
            RowError::Probe(ProbeError::NonFiniteStatistics { .. })
        ));
    }

    #[test]
    fn test_extra_rows() {
        let lines = ["a : 1.0", "b : 2.0", "c : 3.0"];
        let t = targets(&["a", "b"]);

        let err = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::FailFast, now())
            .unwrap_err();
        assert!(matches!(err, MarshalError::UnmatchedRow { row: 2 }));

        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::Isolate, now()).unwrap();
        assert_eq!(out.records.len(), 8);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].row, 2);
        assert!(matches!(out.rejected[0].error, RowError::MissingTarget));
    }

    #[test]
    fn test_more_targets_than_rows() {
        let lines = ["a : 1.0"];
        let t = targets(&["a", "b", "c"]);
        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::FailFast, now()).unwrap();
        assert_eq!(out.records.len(), 4);
    }

    #[test]
    fn test_silent_target_keeps_later_rows_aligned() {
        // bad.invalid never resolved, so fping printed no result line for it.
        let lines = [
            "www.google.com : 13.24 38.90",
            "www.yahoo.com : 6.72 29.08",
        ];
        let t = targets(&["bad.invalid", "www.google.com", "www.yahoo.com"]);
        let out = marshal_all(&lines, &t, &agent(), &report(), RowPolicy::FailFast, now()).unwrap();
        assert_eq!(out.records.len(), 8);
        assert!(out.records[3].tags.contains(",target-id=1,"));
        assert!(out.records[7].tags.contains(",target-id=2,"));
    }

    #[test]
    fn test_oversized_tags_are_rejected() {
        let mut long = targets(&["a"]);
        long[0].city_name = "x".repeat(MAX_METRIC_AND_TAGS_LEN);
        let lines = ["a : 1.0"];
        let out =
            marshal_all(&lines, &long, &agent(), &report(), RowPolicy::Isolate, now()).unwrap();
        assert!(out.records.is_empty());
        assert!(matches!(
            out.rejected[0].error,
            RowError::Metric(MetricError::TooLong { .. })
        ));
    }

    #[test]
    fn test_empty_batch() {
        let lines: [&str; 0] = [];
        let out = marshal_all_now(&lines, &[], &agent(), &report(), RowPolicy::FailFast).unwrap();
        assert!(out.records.is_empty());
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn test_pair_rows() {
        let lines = vec![
            "b : 1.0".to_string(),
            "a : 2.0".to_string(),
            "c : 3.0".to_string(),
            String::new(),
        ];
        let t = targets(&["a", "b", "c"]);
        let (rows, unmatched) = pair_rows(&lines, &t);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, "b : 1.0");
        assert_eq!(rows[0].target.id, 1);
        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[1].target.id, 2);
        // "a" was passed over once "b" matched.
        assert_eq!(unmatched, vec![1, 3]);
    }
}
