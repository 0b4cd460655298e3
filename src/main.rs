//! NQM agent - runs one probing cycle and prints metric records as JSON.

use nqm_agent::pipeline::marshal_all_now;
use nqm_agent::probe::{read_raw_lines, run_probing_command};
use nqm_agent::{task, AgentConfig, Fping, TaskError, TaskResponse};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Logs go to stderr; stdout carries the records
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("nqm_agent=info".parse()?))
        .init();

    let cfg = AgentConfig::load()?;
    tracing::info!("Reporting as {} every {}s", cfg.report.hostname, cfg.report.step);
    tracing::info!("Using task file {}", cfg.task_path.display());

    let response = TaskResponse::from_file(&cfg.task_path)?;
    let probe_task = match task(&Fping, response) {
        Ok(probe_task) => probe_task,
        Err(e @ TaskError::NoTask { .. }) => {
            tracing::info!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let lines = match &cfg.raw_path {
        Some(path) => {
            tracing::info!("Reading probe output from {}", path.display());
            read_raw_lines(path)?
        }
        None => {
            tracing::info!("Probing {} targets", probe_task.targets.len());
            run_probing_command(&probe_task.command).await?
        }
    };

    let out = marshal_all_now(&lines, &probe_task.targets, &probe_task.agent, &cfg.report, cfg.row_policy)?;
    tracing::info!(
        "Marshalled {} records from {} rows ({} rejected)",
        out.records.len(),
        lines.len(),
        out.rejected.len()
    );

    println!("{}", serde_json::to_string_pretty(&out.records)?);

    Ok(())
}
