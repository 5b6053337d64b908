//! Checklist definition model.
//!
//! Definitions are produced offline by the manual-extraction tool and
//! consumed here as static JSON configuration. Once loaded they are
//! immutable; the declared step order defines the default next-step chain.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Terminal classification of a step's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Passed,
    Caution,
    Warning,
    Failed,
    NoData,
}

/// How a step with several telemetry columns reduces them to one check value.
///
/// `Sum` exists for gauges that are physically split across sensors (left and
/// right fuel tanks report separately but the checklist cares about total
/// fuel on board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    #[default]
    First,
    Sum,
}

/// One declarative range rule. Rules are matched in declared order and the
/// first match wins. An open bound means the rule extends to infinity on
/// that side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub outcome: OutcomeKind,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl ThresholdRule {
    pub fn matches(&self, value: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= value && value <= max,
            (Some(min), None) => value >= min,
            (None, Some(max)) => value <= max,
            (None, None) => true,
        }
    }

    /// Human-readable description of the rule's range, e.g. "passed: 30-60 psi".
    pub fn describe(&self, unit: Option<&str>) -> String {
        let kind = match self.outcome {
            OutcomeKind::Passed => "passed",
            OutcomeKind::Caution => "caution",
            OutcomeKind::Warning => "warning",
            OutcomeKind::Failed => "failed",
            OutcomeKind::NoData => "no_data",
        };
        let range = match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{min}-{max}"),
            (Some(min), None) => format!(">={min}"),
            (None, Some(max)) => format!("<={max}"),
            (None, None) => "any".to_string(),
        };
        match unit {
            Some(unit) if !unit.is_empty() => format!("{kind}: {range} {unit}"),
            _ => format!("{kind}: {range}"),
        }
    }
}

/// One atomic check in the checklist.
///
/// Steps with no `required_columns` and no `thresholds` are manual checks
/// (e.g. "verify doors are latched") that cannot be validated against
/// telemetry. Steps with thresholds evaluate the value derived from
/// `required_columns` according to `value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_columns: Vec<String>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdRule>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub value: ValueMode,
}

impl StepDefinition {
    pub fn is_manual(&self) -> bool {
        self.required_columns.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Checklist definition has no steps")]
    Empty,

    #[error("Duplicate step id: {step_id}")]
    DuplicateStepId { step_id: String },

    #[error("Step {step_id} declares thresholds but no telemetry columns")]
    MissingColumns { step_id: String },

    #[error("Step {step_id} declares telemetry columns but no thresholds")]
    MissingThresholds { step_id: String },

    #[error("Step {step_id} has a no_data threshold rule; no_data is reserved for absent telemetry")]
    ReservedOutcome { step_id: String },

    #[error("Failed to parse checklist definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read checklist definition: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, immutable sequence of checklist steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistDefinition {
    steps: Vec<StepDefinition>,
}

impl ChecklistDefinition {
    pub fn from_steps(steps: Vec<StepDefinition>) -> Result<Self, DefinitionError> {
        let definition = Self { steps };
        definition.validate()?;
        Ok(definition)
    }

    /// Parse a definition from its JSON document form (a bare array of steps).
    pub fn from_json(document: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(document)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let document = std::fs::read_to_string(path)?;
        Self::from_json(&document)
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        if self.steps.is_empty() {
            return Err(DefinitionError::Empty);
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.step_id.as_str()) {
                return Err(DefinitionError::DuplicateStepId {
                    step_id: step.step_id.clone(),
                });
            }
            // Thresholds read exactly the value derived from required_columns,
            // so each implies the other.
            if !step.thresholds.is_empty() && step.required_columns.is_empty() {
                return Err(DefinitionError::MissingColumns {
                    step_id: step.step_id.clone(),
                });
            }
            if step.thresholds.is_empty() && !step.required_columns.is_empty() {
                return Err(DefinitionError::MissingThresholds {
                    step_id: step.step_id.clone(),
                });
            }
            if step.thresholds.iter().any(|r| r.outcome == OutcomeKind::NoData) {
                return Err(DefinitionError::ReservedOutcome {
                    step_id: step.step_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// The step immediately following `step_id` in declared order, or None
    /// for the last step or an unknown id.
    pub fn successor_of(&self, step_id: &str) -> Option<&str> {
        let index = self.steps.iter().position(|s| s.step_id == step_id)?;
        self.steps.get(index + 1).map(|s| s.step_id.as_str())
    }
}
