//! Latency and loss statistics derived from one fping result line.

use super::{tokenize, LineShape, ProbeError, Tokens};

/// Marker fping prints in place of a sample that got no reply.
const MISSING_SAMPLE: &str = "-";

/// Value reported for a statistic that cannot be computed.
pub const SENTINEL: &str = "-1";

/// Summary statistics for one probed target.
///
/// All values are decimal strings. The five `rtt_*` fields are either all
/// [`SENTINEL`] or all formatted numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeStatistics {
    pub rtt_min: String,
    pub rtt_max: String,
    pub rtt_avg: String,
    pub rtt_mdev: String,
    pub rtt_median: String,
    pub pkt_transmit: String,
    pub pkt_receive: String,
}

impl ProbeStatistics {
    /// Tokenize `line` and compute statistics with the extractor matching its shape.
    pub fn from_line(line: &str) -> Result<Self, ProbeError> {
        let tokens = tokenize(line);
        match LineShape::detect(line) {
            LineShape::Verbose => verbose_statistics(&tokens),
            LineShape::Compact | LineShape::Unrecognized => compute_statistics(&tokens),
        }
    }

    /// Key/value pairs in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("rttmin", self.rtt_min.as_str()),
            ("rttmax", self.rtt_max.as_str()),
            ("rttavg", self.rtt_avg.as_str()),
            ("rttmdev", self.rtt_mdev.as_str()),
            ("rttmedian", self.rtt_median.as_str()),
            ("pkttransmit", self.pkt_transmit.as_str()),
            ("pktreceive", self.pkt_receive.as_str()),
        ]
    }

    fn unreachable(pkt_transmit: String, pkt_receive: String) -> Self {
        Self {
            rtt_min: SENTINEL.to_string(),
            rtt_max: SENTINEL.to_string(),
            rtt_avg: SENTINEL.to_string(),
            rtt_mdev: SENTINEL.to_string(),
            rtt_median: SENTINEL.to_string(),
            pkt_transmit,
            pkt_receive,
        }
    }
}

/// Compute statistics from a compact line: `host rtt rtt - rtt ...`.
///
/// Token 0 is the target. Every following token counts as a transmitted
/// packet; `-` markers and unparsable tokens are not received samples.
pub fn compute_statistics(tokens: &Tokens<'_>) -> Result<ProbeStatistics, ProbeError> {
    let host = tokens.get(0)?;
    let samples = &tokens.as_slice()[1..];

    let mut rtts = Vec::with_capacity(samples.len());
    for token in samples {
        if *token == MISSING_SAMPLE {
            continue;
        }
        match token.parse::<f64>() {
            Ok(rtt) if rtt.is_finite() => rtts.push(rtt),
            Ok(rtt) => {
                tracing::warn!("Skipping non-finite rtt sample {} for {}", rtt, host);
            }
            Err(e) => {
                tracing::warn!("Skipping malformed rtt sample {:?} for {}: {}", token, host, e);
            }
        }
    }

    let pkt_transmit = samples.len().to_string();
    let pkt_receive = rtts.len().to_string();

    if rtts.is_empty() {
        return Ok(ProbeStatistics::unreachable(pkt_transmit, pkt_receive));
    }

    let summary = Summary::of(&mut rtts);
    if !summary.is_finite() {
        return Err(ProbeError::NonFiniteStatistics {
            host: host.to_string(),
        });
    }
    Ok(ProbeStatistics {
        rtt_min: format_rtt(summary.min),
        rtt_max: format_rtt(summary.max),
        rtt_avg: format_rtt(summary.mean),
        rtt_mdev: format_rtt(summary.std_dev),
        rtt_median: format_rtt(summary.median),
        pkt_transmit,
        pkt_receive,
    })
}

/// Read statistics from a verbose line at fixed token positions:
///
/// ```text
/// www.yahoo.com : xmt/rcv/%loss = 100/99/1%, min/avg/max = 5.42/10.9/35.9
/// 0               1   2    3      4   5  6   7   8   9     10   11   12
/// ```
///
/// Deviation and median are not available in this format and are always
/// [`SENTINEL`]. A host with no replies has no `min/avg/max` group; its
/// rtt fields are all [`SENTINEL`] as well.
pub fn verbose_statistics(tokens: &Tokens<'_>) -> Result<ProbeStatistics, ProbeError> {
    let pkt_transmit = tokens.get(4)?.to_string();
    let pkt_receive = tokens.get(5)?.to_string();

    if pkt_receive == "0" && tokens.len() <= 7 {
        return Ok(ProbeStatistics::unreachable(pkt_transmit, pkt_receive));
    }

    Ok(ProbeStatistics {
        rtt_min: tokens.get(10)?.to_string(),
        rtt_max: tokens.get(12)?.to_string(),
        rtt_avg: tokens.get(11)?.to_string(),
        rtt_mdev: SENTINEL.to_string(),
        rtt_median: SENTINEL.to_string(),
        pkt_transmit,
        pkt_receive,
    })
}

struct Summary {
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
    median: f64,
}

impl Summary {
    /// Summarize a non-empty sample set. Sorts `values` in place.
    ///
    /// Mean and variance are accumulated incrementally so large finite
    /// samples do not overflow an intermediate sum.
    fn of(values: &mut [f64]) -> Self {
        values.sort_by(f64::total_cmp);

        let mut mean = 0.0_f64;
        let mut m2 = 0.0_f64;
        for (i, &v) in values.iter().enumerate() {
            let delta = v - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (v - mean);
        }
        let variance = m2 / values.len() as f64;

        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            let (lo, hi) = (values[mid - 1], values[mid]);
            lo + (hi - lo) / 2.0
        } else {
            values[mid]
        };

        Self {
            min: values[0],
            max: values[values.len() - 1],
            mean,
            std_dev: variance.sqrt(),
            median,
        }
    }

    fn is_finite(&self) -> bool {
        [self.min, self.max, self.mean, self.std_dev, self.median]
            .iter()
            .all(|v| v.is_finite())
    }
}

fn format_rtt(value: f64) -> String {
    format!("{:.2}", value)
}
