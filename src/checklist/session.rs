//! Session state: per-run checklist sessions and their step statuses.
//!
//! The store is the only mutable shared structure in the engine. Sessions
//! live for the process lifetime (no garbage collection of stale sessions);
//! writes to the same `(checklist_id, step_id)` pair are serialized by the
//! map entry while writes to different pairs proceed in parallel.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::checklist::definition::{ChecklistDefinition, OutcomeKind};
use crate::checklist::evaluator::Outcome;
use crate::error::ChecklistError;

/// Execution status of a single step within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    Pending,
    Passed,
    Caution,
    Warning,
    Failed,
    NoData,
}

impl StepStatus {
    /// Everything except not_started/pending is terminal for the step.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepStatus::NotStarted | StepStatus::Pending)
    }
}

impl From<OutcomeKind> for StepStatus {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Passed => StepStatus::Passed,
            OutcomeKind::Caution => StepStatus::Caution,
            OutcomeKind::Warning => StepStatus::Warning,
            OutcomeKind::Failed => StepStatus::Failed,
            OutcomeKind::NoData => StepStatus::NoData,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepState {
    pub status: StepStatus,
    pub next_step_id: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StepState {
    pub fn not_started() -> Self {
        Self {
            status: StepStatus::NotStarted,
            next_step_id: None,
            error: None,
            message: None,
            updated_at: Utc::now(),
        }
    }

    pub fn pending() -> Self {
        Self {
            status: StepStatus::Pending,
            next_step_id: None,
            error: None,
            message: Some("Validation in progress".to_string()),
            updated_at: Utc::now(),
        }
    }

    /// Terminal state for a resolved evaluation. Warning/failed outcomes
    /// carry their message in the error slot as well so callers that only
    /// look at errors still see what went wrong.
    pub fn resolved(outcome: &Outcome, next_step_id: Option<String>) -> Self {
        let error = match outcome.kind {
            OutcomeKind::Warning | OutcomeKind::Failed => Some(outcome.message.clone()),
            _ => None,
        };
        Self {
            status: outcome.kind.into(),
            next_step_id,
            error,
            message: Some(outcome.message.clone()),
            updated_at: Utc::now(),
        }
    }
}

/// One run-through of a checklist definition.
#[derive(Debug)]
pub struct ChecklistSession {
    checklist_id: Uuid,
    step_order: Vec<String>,
    states: DashMap<String, StepState>,
}

impl ChecklistSession {
    fn new(definition: &ChecklistDefinition) -> Self {
        let step_order: Vec<String> = definition
            .steps()
            .iter()
            .map(|s| s.step_id.clone())
            .collect();
        let states = step_order
            .iter()
            .map(|id| (id.clone(), StepState::not_started()))
            .collect();
        Self {
            checklist_id: Uuid::new_v4(),
            step_order,
            states,
        }
    }

    pub fn checklist_id(&self) -> Uuid {
        self.checklist_id
    }

    pub fn step_order(&self) -> &[String] {
        &self.step_order
    }

    pub fn contains_step(&self, step_id: &str) -> bool {
        self.states.contains_key(step_id)
    }

    /// A consistent snapshot of one step's state (never a partial write).
    pub fn step_state(&self, step_id: &str) -> Option<StepState> {
        self.states.get(step_id).map(|entry| entry.value().clone())
    }
}

/// Process-wide registry of active checklist sessions.
///
/// Injectable rather than a process singleton: created once at startup and
/// passed through the engine's constructor.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<ChecklistSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new session with every step initialized to not_started.
    pub fn create(&self, definition: &ChecklistDefinition) -> Arc<ChecklistSession> {
        let session = Arc::new(ChecklistSession::new(definition));
        self.sessions
            .insert(session.checklist_id(), Arc::clone(&session));
        session
    }

    pub fn get(&self, checklist_id: Uuid) -> Result<Arc<ChecklistSession>, ChecklistError> {
        self.sessions
            .get(&checklist_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ChecklistError::session_not_found(checklist_id.to_string()))
    }

    /// Atomically replace one step's state. Last write wins for repeated
    /// evaluations of the same step.
    pub fn update_step(
        &self,
        checklist_id: Uuid,
        step_id: &str,
        state: StepState,
    ) -> Result<(), ChecklistError> {
        let session = self.get(checklist_id)?;
        let mut entry = session
            .states
            .get_mut(step_id)
            .ok_or_else(|| ChecklistError::step_not_found(step_id))?;
        *entry = state;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
