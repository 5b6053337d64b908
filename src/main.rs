use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use preflight::checklist::definition::ChecklistDefinition;
use preflight::checklist::engine::{ChecklistEngine, StatusResponse};
use preflight::checklist::session::{SessionStore, StepStatus};
use preflight::checklist::telemetry::TelemetrySnapshot;
use preflight::config::PreflightConfig;
use preflight::observability::{init_telemetry, shutdown_telemetry};

#[derive(Parser)]
#[command(name = "preflight")]
#[command(about = "Pre-flight checklist validation against recorded telemetry")]
#[command(
    long_about = "Preflight walks an operator through a multi-step pre-flight checklist, \
                  validating each step against a recorded telemetry snapshot and reporting \
                  pass/caution/warning/fail/no-data outcomes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the loaded checklist end to end, polling each step to resolution
    Run {
        /// Override the configured checklist definition path
        #[arg(long, help = "Path to the checklist definition JSON document")]
        definition: Option<PathBuf>,
        /// Override the configured telemetry snapshot path
        #[arg(long, help = "Path to the telemetry snapshot JSON document")]
        telemetry: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    PreflightConfig::load_env_file()?;
    let config = PreflightConfig::load()?;
    init_telemetry(
        &config.observability.log_level,
        config.observability.json_logs,
    )?;

    match cli.command {
        Commands::Run {
            definition,
            telemetry,
        } => {
            let definition_path = definition
                .or_else(|| config.checklist.definition_path.clone().map(PathBuf::from));
            let telemetry_path =
                telemetry.or_else(|| config.telemetry.snapshot_path.clone().map(PathBuf::from));

            let definition = definition_path
                .map(|path| {
                    ChecklistDefinition::load(&path)
                        .with_context(|| format!("loading checklist definition {}", path.display()))
                })
                .transpose()?
                .map(Arc::new);
            let telemetry = telemetry_path
                .map(|path| {
                    TelemetrySnapshot::load(&path)
                        .with_context(|| format!("loading telemetry snapshot {}", path.display()))
                })
                .transpose()?
                .map(Arc::new);

            let store = Arc::new(SessionStore::new());
            let engine = ChecklistEngine::new(store, definition, telemetry);
            run_checklist(&engine).await?;
        }
    }

    shutdown_telemetry();
    Ok(())
}

async fn run_checklist(engine: &ChecklistEngine) -> Result<()> {
    let started = engine.start()?;
    info!(
        checklist_id = %started.checklist_id,
        steps = started.steps.len(),
        "{}",
        started.message
    );

    for step in &started.steps {
        let next = engine.next(&started.checklist_id, &step.step_id)?;
        info!(step_id = %next.step_id, step_name = %next.step_name, "{}", next.message);

        let status = poll_until_resolved(engine, &started.checklist_id, &step.step_id).await?;
        match status.status {
            StepStatus::Passed => {
                info!(step_id = %step.step_id, message = ?status.message, "Step passed")
            }
            StepStatus::Caution | StepStatus::NoData => {
                warn!(step_id = %step.step_id, message = ?status.message, "Step needs attention")
            }
            _ => {
                warn!(
                    step_id = %step.step_id,
                    error = ?status.error,
                    "Step did not pass"
                )
            }
        }
    }

    let completed = engine.complete(&started.checklist_id)?;
    info!(
        passed = completed.summary.passed,
        caution = completed.summary.caution,
        warning = completed.summary.warning,
        failed = completed.summary.failed,
        no_data = completed.summary.no_data,
        "{}",
        completed.message
    );
    Ok(())
}

async fn poll_until_resolved(
    engine: &ChecklistEngine,
    checklist_id: &str,
    step_id: &str,
) -> Result<StatusResponse> {
    // Evaluations are pure in-memory computations and resolve well inside
    // this window; the cap guards against a lost background task.
    for _ in 0..200 {
        let status = engine.status(checklist_id, step_id)?;
        if status.status.is_terminal() {
            return Ok(status);
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    bail!("step {step_id} did not resolve in time");
}
