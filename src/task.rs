//! Task acquisition: what to probe this cycle and with which command.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::{Agent, Target};

/// Task error types.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Nothing to probe this cycle. Not a failure.
    #[error("[ {util} ] No tasks assigned.")]
    NoTask { util: String },
    #[error("task response is missing {0}")]
    MissingField(&'static str),
    #[error("failed to read task file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse task response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The control service's answer to "what should I probe".
///
/// When `need_ping` is false the other fields are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskResponse {
    pub need_ping: bool,
    pub agent: Option<Agent>,
    pub targets: Option<Vec<Target>>,
    /// Command prefix to run; the target hosts are appended to it.
    pub command: Option<Vec<String>>,
}

impl TaskResponse {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaskError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// A probing tool the agent knows how to drive.
pub trait ProbeUtility {
    fn name(&self) -> &str;

    /// Full command line probing `targets`, one result line per target in order.
    fn probing_command(&self, prefix: Option<&[String]>, targets: &[String]) -> Vec<String>;
}

/// fping with per-target summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fping;

/// 4 probes per target, one compact summary line per target on stderr.
const FPING_DEFAULT_COMMAND: [&str; 8] = ["fping", "-p", "20", "-i", "10", "-C", "4", "-q"];

impl ProbeUtility for Fping {
    fn name(&self) -> &str {
        "fping"
    }

    fn probing_command(&self, prefix: Option<&[String]>, targets: &[String]) -> Vec<String> {
        let mut argv: Vec<String> = match prefix {
            Some(prefix) if !prefix.is_empty() => prefix.to_vec(),
            _ => FPING_DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
        };
        argv.extend(targets.iter().cloned());
        argv
    }
}

/// Everything needed to run and marshal one probing cycle.
#[derive(Debug, Clone)]
pub struct ProbeTask {
    pub command: Vec<String>,
    pub agent: Agent,
    /// Targets in the order they appear on the command line.
    pub targets: Vec<Target>,
}

/// Host addresses of `targets`, in order.
pub fn target_address_list(targets: &[Target]) -> Vec<String> {
    targets.iter().map(|t| t.host.clone()).collect()
}

/// Turn a task response into a runnable task.
///
/// Returns [`TaskError::NoTask`] when the control service assigned no probing.
pub fn task<U: ProbeUtility>(utility: &U, response: TaskResponse) -> Result<ProbeTask, TaskError> {
    if !response.need_ping {
        return Err(TaskError::NoTask {
            util: utility.name().to_string(),
        });
    }

    let agent = response.agent.ok_or(TaskError::MissingField("agent"))?;
    let targets = response.targets.ok_or(TaskError::MissingField("targets"))?;

    let addresses = target_address_list(&targets);
    let command = utility.probing_command(response.command.as_deref(), &addresses);

    Ok(ProbeTask {
        command,
        agent,
        targets,
    })
}
