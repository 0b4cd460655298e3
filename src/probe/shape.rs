//! Recognizes which fping output format a result line uses.

use std::sync::OnceLock;

use regex::Regex;

use super::tokenize;

/// The fping result line formats, plus anything else fping prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    /// `host : xmt/rcv/%loss = 100/99/1%, min/avg/max = 5.42/10.9/35.9`
    Verbose,
    /// `host : 6.72 29.08 8.55 7.40 - 6.26`
    Compact,
    /// Diagnostics such as `bad.invalid: Name or service not known`.
    Unrecognized,
}

impl LineShape {
    pub fn detect(line: &str) -> Self {
        static VERBOSE: OnceLock<Regex> = OnceLock::new();
        let re = VERBOSE.get_or_init(|| {
            Regex::new(r"^\s*\S+\s*:\s*xmt/rcv/%loss\s*=").expect("valid verbose line pattern")
        });

        if re.is_match(line) {
            return LineShape::Verbose;
        }

        // A compact line has at least one sample or missing-sample marker after the host.
        let tokens = tokenize(line);
        let has_sample = tokens
            .as_slice()
            .iter()
            .skip(1)
            .any(|token| *token == "-" || token.parse::<f64>().is_ok());
        if has_sample {
            LineShape::Compact
        } else {
            LineShape::Unrecognized
        }
    }

    /// Whether the line is a per-target result fping prints.
    pub fn is_result(self) -> bool {
        self != LineShape::Unrecognized
    }
}
