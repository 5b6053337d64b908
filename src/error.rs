use thiserror::Error;

/// Errors surfaced to callers of the checklist session engine.
///
/// Evaluation-time data problems (missing columns, out-of-range values) are
/// never errors - they resolve as terminal step outcomes so polling stays
/// uniform. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("Checklist {checklist_id} not found")]
    SessionNotFound { checklist_id: String },

    #[error("Step {step_id} not found")]
    StepNotFound { step_id: String },

    #[error("No checklist definition loaded")]
    DefinitionUnavailable,

    #[error("Checklist has unresolved steps: {unresolved}")]
    IncompleteChecklist { unresolved: String },
}

impl ChecklistError {
    pub fn session_not_found(checklist_id: impl Into<String>) -> Self {
        Self::SessionNotFound {
            checklist_id: checklist_id.into(),
        }
    }

    pub fn step_not_found(step_id: impl Into<String>) -> Self {
        Self::StepNotFound {
            step_id: step_id.into(),
        }
    }
}
