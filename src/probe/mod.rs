//! Probe output handling.
//!
//! Splits raw fping result lines into tokens and derives per-target
//! latency and loss statistics. Also runs the probing command itself.

mod command;
mod shape;
mod stats;
mod tokenize;

pub use command::*;
pub use shape::*;
pub use stats::*;
pub use tokenize::*;

use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("token index {index} out of range for line with {len} tokens")]
    TokenOutOfRange { index: usize, len: usize },
    #[error("statistics for {host} are not finite")]
    NonFiniteStatistics { host: String },
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
