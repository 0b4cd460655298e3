//! Configuration module for the NQM agent.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Configuration error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Default reporting interval in seconds.
pub const DEFAULT_STEP: i64 = 60;

/// How the pipeline reacts to a row it cannot turn into metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Skip the row, record why, keep going.
    #[default]
    Isolate,
    /// Abort the whole batch on the first bad row.
    FailFast,
}

impl FromStr for RowPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(RowPolicy::Isolate),
            "fail-fast" | "failfast" => Ok(RowPolicy::FailFast),
            _ => Err(()),
        }
    }
}

/// Identity and interval stamped on every emitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Endpoint the records are reported as.
    pub hostname: String,
    /// Reporting interval in seconds.
    pub step: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            step: DEFAULT_STEP,
        }
    }
}

fn default_hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Agent configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub report: ReportConfig,
    /// Row failure handling (default: isolate)
    pub row_policy: RowPolicy,
    /// Path to the JSON task file (default: "nqm-task.json")
    pub task_path: PathBuf,
    /// Captured probe output to use instead of running the probing command
    pub raw_path: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            row_policy: RowPolicy::default(),
            task_path: PathBuf::from("nqm-task.json"),
            raw_path: None,
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NQM_HOSTNAME`: report-as endpoint (default: `$HOSTNAME`, else "localhost")
    /// - `NQM_STEP`: reporting interval in seconds (default: 60)
    /// - `NQM_ROW_POLICY`: "isolate" or "fail-fast" (default: "isolate")
    /// - `NQM_TASK_PATH`: task file path (default: "nqm-task.json")
    /// - `NQM_RAW_PATH`: captured probe output file (default: unset)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(hostname) = lookup("NQM_HOSTNAME") {
            if hostname.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "NQM_HOSTNAME",
                    value: hostname,
                });
            }
            cfg.report.hostname = hostname;
        }

        if let Some(step_str) = lookup("NQM_STEP") {
            match step_str.trim().parse::<i64>() {
                Ok(step) if step > 0 => cfg.report.step = step,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "NQM_STEP",
                        value: step_str,
                    })
                }
            }
        }

        if let Some(policy_str) = lookup("NQM_ROW_POLICY") {
            cfg.row_policy = policy_str.parse::<RowPolicy>().map_err(|_| ConfigError::Invalid {
                var: "NQM_ROW_POLICY",
                value: policy_str.clone(),
            })?;
        }

        if let Some(task_path) = lookup("NQM_TASK_PATH") {
            cfg.task_path = PathBuf::from(task_path);
        }

        if let Some(raw_path) = lookup("NQM_RAW_PATH").filter(|p| !p.is_empty()) {
            cfg.raw_path = Some(PathBuf::from(raw_path));
        }

        Ok(cfg)
    }
}
