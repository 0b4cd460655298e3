//! Runs the probing command and captures its result lines.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::{LineShape, ProbeError};

/// Highest fping exit status that still means "probing ran".
///
/// 1 = some targets unreachable, 2 = some hosts could not be resolved.
const MAX_NORMAL_EXIT: i32 = 2;

/// Run a probing command line and return its per-target result lines.
///
/// fping writes `-C`/`-q` summaries to stderr, so stdout lines come first
/// and stderr lines follow. Diagnostics such as unresolvable-host messages
/// are logged and dropped.
pub async fn run_probing_command(argv: &[String]) -> Result<Vec<String>, ProbeError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| ProbeError::Command("empty probing command".to_string()))?;

    tracing::debug!("Running probing command: {}", argv.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ProbeError::Command(format!("failed to execute {}: {}", program, e)))?;

    match output.status.code() {
        Some(code) if code <= MAX_NORMAL_EXIT => {}
        status => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::Command(format!(
                "{} exited with {:?}: {}",
                program,
                status,
                stderr.trim()
            )));
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(collect_lines(&stdout, &stderr))
}

/// Read previously captured probe output from a file, keeping result lines only.
pub fn read_raw_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ProbeError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(collect_lines(&contents, ""))
}

fn collect_lines(stdout: &str, stderr: &str) -> Vec<String> {
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            let keep = LineShape::detect(line).is_result();
            if !keep {
                tracing::warn!("Dropping non-result fping output: {}", line);
            }
            keep
        })
        .map(str::to_string)
        .collect()
}
