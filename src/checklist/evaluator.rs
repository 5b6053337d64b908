//! Step evaluation: pure mapping from (step definition, telemetry snapshot)
//! to an outcome. Identical inputs always yield an identical outcome, which
//! is what makes status polling idempotent and re-evaluation safe.

use crate::checklist::definition::{OutcomeKind, StepDefinition, ValueMode};
use crate::checklist::telemetry::TelemetrySnapshot;

/// Result of evaluating one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub message: String,
}

impl Outcome {
    fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Evaluate a step against a telemetry snapshot.
///
/// Missing required columns resolve as `no_data` with a message listing
/// exactly the missing columns in declared order. With all columns present,
/// threshold rules apply in declared order and the first match wins; a value
/// matching no rule resolves as `failed`. Data problems are outcomes here,
/// never errors.
pub fn evaluate(step: &StepDefinition, telemetry: &TelemetrySnapshot) -> Outcome {
    if step.is_manual() {
        return Outcome::new(
            OutcomeKind::Passed,
            "Visual check required - no telemetry validation",
        );
    }

    let mut missing = Vec::new();
    let mut values = Vec::new();
    for column in &step.required_columns {
        match telemetry.get(column) {
            Some(value) => values.push(value),
            None => missing.push(column.as_str()),
        }
    }
    if !missing.is_empty() {
        return Outcome::new(
            OutcomeKind::NoData,
            format!(
                "No telemetry data available for columns: {}",
                missing.join(", ")
            ),
        );
    }

    let check_value = match step.value {
        ValueMode::Sum => values.iter().sum(),
        ValueMode::First => values[0],
    };
    let unit = step.unit.as_deref();
    let description = match step.value {
        ValueMode::Sum => format!(
            "Total {}: {}",
            step.required_columns.join("+"),
            quantity(check_value, unit, 1)
        ),
        ValueMode::First => format!(
            "{}: {}",
            step.required_columns[0],
            quantity(check_value, unit, 1)
        ),
    };

    for rule in &step.thresholds {
        if rule.matches(check_value) {
            let message = match rule.outcome {
                OutcomeKind::Passed => format!("OK: {description} - Within normal range"),
                OutcomeKind::Caution => format!("CAUTION: {description} - Requires attention"),
                OutcomeKind::Warning => format!("WARNING: {description} - In warning range"),
                OutcomeKind::Failed => format!("FAILED: {description} - Outside acceptable range"),
                // Definitions reject no_data rules at load; unreachable in practice.
                OutcomeKind::NoData => description.clone(),
            };
            return Outcome::new(rule.outcome, message);
        }
    }

    let ranges = step
        .thresholds
        .iter()
        .map(|rule| rule.describe(unit))
        .collect::<Vec<_>>()
        .join(" | ");
    Outcome::new(
        OutcomeKind::Failed,
        format!(
            "Value {} is outside all defined ranges. Expected ranges: {}",
            quantity(check_value, unit, 2),
            ranges
        ),
    )
}

fn quantity(value: f64, unit: Option<&str>, precision: usize) -> String {
    match unit {
        Some(unit) if !unit.is_empty() => format!("{value:.precision$} {unit}"),
        _ => format!("{value:.precision$}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::definition::ThresholdRule;

    fn fuel_step() -> StepDefinition {
        StepDefinition {
            step_id: "step_1".to_string(),
            name: "Fuel Quantity".to_string(),
            description: "Confirm fuel quantity is adequate".to_string(),
            required_columns: vec!["FQtyL".to_string(), "FQtyR".to_string()],
            thresholds: vec![
                ThresholdRule {
                    outcome: OutcomeKind::Passed,
                    min: Some(20.0),
                    max: None,
                },
                ThresholdRule {
                    outcome: OutcomeKind::Caution,
                    min: Some(10.0),
                    max: Some(20.0),
                },
            ],
            unit: Some("gal".to_string()),
            value: ValueMode::Sum,
        }
    }

    fn oil_step() -> StepDefinition {
        StepDefinition {
            step_id: "step_2".to_string(),
            name: "Oil Pressure".to_string(),
            description: "Check oil pressure is in the green arc".to_string(),
            required_columns: vec!["OilP".to_string()],
            thresholds: vec![
                ThresholdRule {
                    outcome: OutcomeKind::Warning,
                    min: None,
                    max: Some(10.0),
                },
                ThresholdRule {
                    outcome: OutcomeKind::Passed,
                    min: Some(30.0),
                    max: Some(60.0),
                },
            ],
            unit: Some("psi".to_string()),
            value: ValueMode::First,
        }
    }

    #[test]
    fn missing_column_yields_no_data_with_exact_message() {
        let telemetry = TelemetrySnapshot::new([("FQtyL".to_string(), 14.2)]);
        let outcome = evaluate(&fuel_step(), &telemetry);
        assert_eq!(outcome.kind, OutcomeKind::NoData);
        assert_eq!(
            outcome.message,
            "No telemetry data available for columns: FQtyR"
        );
    }

    #[test]
    fn missing_columns_listed_in_declared_order() {
        let outcome = evaluate(&fuel_step(), &TelemetrySnapshot::default());
        assert_eq!(outcome.kind, OutcomeKind::NoData);
        assert_eq!(
            outcome.message,
            "No telemetry data available for columns: FQtyL, FQtyR"
        );
    }

    #[test]
    fn sum_mode_passes_on_combined_value() {
        let telemetry = TelemetrySnapshot::new([
            ("FQtyL".to_string(), 14.2),
            ("FQtyR".to_string(), 13.7),
        ]);
        let outcome = evaluate(&fuel_step(), &telemetry);
        assert_eq!(outcome.kind, OutcomeKind::Passed);
        assert_eq!(
            outcome.message,
            "OK: Total FQtyL+FQtyR: 27.9 gal - Within normal range"
        );
    }

    #[test]
    fn first_matching_rule_wins_in_declared_order() {
        // 8 psi matches the warning rule before anything else.
        let telemetry = TelemetrySnapshot::new([("OilP".to_string(), 8.0)]);
        let outcome = evaluate(&oil_step(), &telemetry);
        assert_eq!(outcome.kind, OutcomeKind::Warning);
        assert_eq!(outcome.message, "WARNING: OilP: 8.0 psi - In warning range");

        // 45 psi falls through to the green band.
        let telemetry = TelemetrySnapshot::new([("OilP".to_string(), 45.0)]);
        let outcome = evaluate(&oil_step(), &telemetry);
        assert_eq!(outcome.kind, OutcomeKind::Passed);
    }

    #[test]
    fn unmatched_value_fails_with_range_listing() {
        let telemetry = TelemetrySnapshot::new([("OilP".to_string(), 20.0)]);
        let outcome = evaluate(&oil_step(), &telemetry);
        assert_eq!(outcome.kind, OutcomeKind::Failed);
        assert_eq!(
            outcome.message,
            "Value 20.00 psi is outside all defined ranges. \
             Expected ranges: warning: <=10 psi | passed: 30-60 psi"
        );
    }

    #[test]
    fn caution_band_includes_its_bounds() {
        let telemetry = TelemetrySnapshot::new([
            ("FQtyL".to_string(), 5.0),
            ("FQtyR".to_string(), 5.0),
        ]);
        let outcome = evaluate(&fuel_step(), &telemetry);
        assert_eq!(outcome.kind, OutcomeKind::Caution);
        assert_eq!(
            outcome.message,
            "CAUTION: Total FQtyL+FQtyR: 10.0 gal - Requires attention"
        );
    }

    #[test]
    fn manual_step_passes_without_telemetry() {
        let step = StepDefinition {
            step_id: "step_0".to_string(),
            name: "Doors".to_string(),
            description: "Verify doors are latched".to_string(),
            required_columns: Vec::new(),
            thresholds: Vec::new(),
            unit: None,
            value: ValueMode::First,
        };
        let outcome = evaluate(&step, &TelemetrySnapshot::default());
        assert_eq!(outcome.kind, OutcomeKind::Passed);
        assert_eq!(
            outcome.message,
            "Visual check required - no telemetry validation"
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let telemetry = TelemetrySnapshot::new([
            ("FQtyL".to_string(), 14.2),
            ("FQtyR".to_string(), 13.7),
        ]);
        let first = evaluate(&fuel_step(), &telemetry);
        for _ in 0..10 {
            assert_eq!(evaluate(&fuel_step(), &telemetry), first);
        }
    }
}
