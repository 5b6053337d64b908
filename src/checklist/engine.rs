//! Checklist session engine: lifecycle orchestration, fire-and-forget step
//! evaluation, status reads and next-step routing.
//!
//! `next` returns as soon as the pending transition is recorded; the actual
//! evaluation runs on a spawned task and writes its terminal outcome through
//! the store. A `status` call issued after that write always observes it.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::checklist::definition::ChecklistDefinition;
use crate::checklist::evaluator::evaluate;
use crate::checklist::session::{SessionStore, StepState, StepStatus};
use crate::checklist::telemetry::TelemetrySnapshot;
use crate::error::ChecklistError;

#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub step_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub checklist_id: String,
    pub steps: Vec<StepSummary>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextResponse {
    pub step_id: String,
    pub step_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub step_id: String,
    pub status: StepStatus,
    pub next_step_id: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Count of resolved steps by outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub passed: u32,
    pub caution: u32,
    pub warning: u32,
    pub failed: u32,
    pub no_data: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteResponse {
    pub checklist_id: String,
    pub message: String,
    pub summary: OutcomeTally,
    pub completed_steps: usize,
    pub total_steps: usize,
}

/// Orchestrates checklist sessions over an injected store.
///
/// The definition and telemetry snapshot are read-only and shared across all
/// sessions; the store is the only mutable shared structure.
pub struct ChecklistEngine {
    store: Arc<SessionStore>,
    definition: Option<Arc<ChecklistDefinition>>,
    telemetry: Option<Arc<TelemetrySnapshot>>,
}

impl ChecklistEngine {
    pub fn new(
        store: Arc<SessionStore>,
        definition: Option<Arc<ChecklistDefinition>>,
        telemetry: Option<Arc<TelemetrySnapshot>>,
    ) -> Self {
        Self {
            store,
            definition,
            telemetry,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Start a new checklist session.
    pub fn start(&self) -> Result<StartResponse, ChecklistError> {
        let definition = self
            .definition
            .as_ref()
            .ok_or(ChecklistError::DefinitionUnavailable)?;
        let session = self.store.create(definition);
        info!(
            checklist_id = %session.checklist_id(),
            steps = definition.len(),
            "Checklist session started"
        );
        Ok(StartResponse {
            checklist_id: session.checklist_id().to_string(),
            steps: definition
                .steps()
                .iter()
                .map(|step| StepSummary {
                    step_id: step.step_id.clone(),
                    name: step.name.clone(),
                    description: step.description.clone(),
                })
                .collect(),
            message: "Checklist started. Use /checklist/next/<step_id> to proceed with each step."
                .to_string(),
        })
    }

    /// Record a step as pending and schedule its evaluation in the
    /// background. Returns before the evaluation runs; callers poll
    /// `status` for the terminal outcome. Re-triggering a step that is
    /// already pending or resolved simply re-evaluates and overwrites.
    pub fn next(&self, checklist_id: &str, step_id: &str) -> Result<NextResponse, ChecklistError> {
        let definition = self
            .definition
            .as_ref()
            .ok_or(ChecklistError::DefinitionUnavailable)?;
        let session_id = parse_checklist_id(checklist_id)?;
        let session = self.store.get(session_id)?;
        if !session.contains_step(step_id) {
            return Err(ChecklistError::step_not_found(step_id));
        }
        let step = definition
            .step(step_id)
            .ok_or_else(|| ChecklistError::step_not_found(step_id))?
            .clone();

        // Pending must be durably recorded before this call returns.
        self.store
            .update_step(session_id, step_id, StepState::pending())?;
        info!(
            checklist_id = %session_id,
            step_id = %step_id,
            step_name = %step.name,
            "Step evaluation scheduled"
        );

        let store = Arc::clone(&self.store);
        let telemetry = self.telemetry.clone();
        let next_step_id = definition.successor_of(step_id).map(str::to_string);
        let step_name = step.name.clone();
        let owned_step_id = step_id.to_string();
        tokio::spawn(async move {
            // An absent telemetry source behaves like an empty snapshot: every
            // required column is missing, so the step resolves no_data.
            let empty = TelemetrySnapshot::default();
            let snapshot = telemetry.as_deref().unwrap_or(&empty);
            let outcome = evaluate(&step, snapshot);
            let state = StepState::resolved(&outcome, next_step_id);
            info!(
                checklist_id = %session_id,
                step_id = %owned_step_id,
                status = ?state.status,
                "Step evaluation resolved"
            );
            if let Err(e) = store.update_step(session_id, &owned_step_id, state) {
                warn!(
                    checklist_id = %session_id,
                    step_id = %owned_step_id,
                    error = %e,
                    "Failed to record step outcome"
                );
            }
        });

        let message = format!(
            "Processing {}. Use /checklist/status/{}?checklist_id={} to check status.",
            step_name, step_id, session_id
        );
        Ok(NextResponse {
            step_id: step_id.to_string(),
            step_name,
            message,
        })
    }

    /// Read-only view of one step's state.
    pub fn status(
        &self,
        checklist_id: &str,
        step_id: &str,
    ) -> Result<StatusResponse, ChecklistError> {
        let session_id = parse_checklist_id(checklist_id)?;
        let session = self.store.get(session_id)?;
        let state = session
            .step_state(step_id)
            .ok_or_else(|| ChecklistError::step_not_found(step_id))?;
        Ok(StatusResponse {
            step_id: step_id.to_string(),
            status: state.status,
            next_step_id: state.next_step_id,
            error: state.error,
            message: state.message,
        })
    }

    /// Finalize a session once every step has a terminal outcome.
    pub fn complete(&self, checklist_id: &str) -> Result<CompleteResponse, ChecklistError> {
        let session_id = parse_checklist_id(checklist_id)?;
        let session = self.store.get(session_id)?;

        let mut unresolved = Vec::new();
        let mut summary = OutcomeTally::default();
        for step_id in session.step_order() {
            let state = session
                .step_state(step_id)
                .ok_or_else(|| ChecklistError::step_not_found(step_id))?;
            match state.status {
                StepStatus::NotStarted | StepStatus::Pending => unresolved.push(step_id.clone()),
                StepStatus::Passed => summary.passed += 1,
                StepStatus::Caution => summary.caution += 1,
                StepStatus::Warning => summary.warning += 1,
                StepStatus::Failed => summary.failed += 1,
                StepStatus::NoData => summary.no_data += 1,
            }
        }
        if !unresolved.is_empty() {
            return Err(ChecklistError::IncompleteChecklist {
                unresolved: unresolved.join(", "),
            });
        }

        let total_steps = session.step_order().len();
        info!(
            checklist_id = %session_id,
            passed = summary.passed,
            caution = summary.caution,
            warning = summary.warning,
            failed = summary.failed,
            no_data = summary.no_data,
            "Checklist completed"
        );
        Ok(CompleteResponse {
            checklist_id: session_id.to_string(),
            message: "Checklist completed successfully. Aircraft is ready for takeoff.".to_string(),
            summary,
            completed_steps: total_steps,
            total_steps,
        })
    }
}

/// A missing, empty, or malformed checklist id never resolves to a session,
/// so it reports as not found rather than producing an unresolvable
/// reference in a response.
fn parse_checklist_id(raw: &str) -> Result<Uuid, ChecklistError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ChecklistError::session_not_found(raw))
}
