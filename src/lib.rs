// Preflight Library - Checklist Session Engine
// This exposes the core components for testing and integration

pub mod checklist;
pub mod config;
pub mod error;
pub mod observability;

// Re-export key types for easy access
pub use checklist::definition::{
    ChecklistDefinition, DefinitionError, OutcomeKind, StepDefinition, ThresholdRule, ValueMode,
};
pub use checklist::engine::{
    ChecklistEngine, CompleteResponse, NextResponse, OutcomeTally, StartResponse, StatusResponse,
    StepSummary,
};
pub use checklist::evaluator::{evaluate, Outcome};
pub use checklist::session::{ChecklistSession, SessionStore, StepState, StepStatus};
pub use checklist::telemetry::TelemetrySnapshot;
pub use config::{config, init_config, PreflightConfig};
pub use error::ChecklistError;
pub use observability::{init_telemetry, shutdown_telemetry};
