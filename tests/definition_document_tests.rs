//! Tests for loading the external documents the engine consumes: the
//! checklist definition produced by the offline manual-extraction tool and
//! the telemetry snapshot table.

use std::io::Write;

use preflight::{ChecklistDefinition, DefinitionError, TelemetrySnapshot, ValueMode};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[test]
fn loads_definition_document_from_disk() {
    let file = write_temp(
        r#"[
            {
                "step_id": "step_1",
                "name": "Fuel Quantity",
                "description": "Confirm fuel quantity is adequate",
                "required_columns": ["FQtyL", "FQtyR"],
                "unit": "gal",
                "value": "sum",
                "thresholds": [{"outcome": "passed", "min": 20.0}]
            },
            {
                "step_id": "step_2",
                "name": "Doors",
                "description": "Verify doors are latched"
            }
        ]"#,
    );

    let definition = ChecklistDefinition::load(file.path()).expect("load definition");
    assert_eq!(definition.len(), 2);
    let fuel = definition.step("step_1").expect("step_1");
    assert_eq!(fuel.value, ValueMode::Sum);
    assert_eq!(fuel.unit.as_deref(), Some("gal"));
    assert!(definition.step("step_2").expect("step_2").is_manual());
}

#[test]
fn rejects_invalid_definition_document() {
    // Thresholds without columns violate the definition invariant.
    let file = write_temp(
        r#"[
            {
                "step_id": "step_1",
                "name": "Fuel Quantity",
                "thresholds": [{"outcome": "passed", "min": 20.0}]
            }
        ]"#,
    );
    let result = ChecklistDefinition::load(file.path());
    assert!(matches!(result, Err(DefinitionError::MissingColumns { .. })));
}

#[test]
fn rejects_unparseable_definition_document() {
    let file = write_temp("not json");
    let result = ChecklistDefinition::load(file.path());
    assert!(matches!(result, Err(DefinitionError::Parse(_))));
}

#[test]
fn missing_definition_document_is_an_io_error() {
    let result = ChecklistDefinition::load("/nonexistent/checklist.json");
    assert!(matches!(result, Err(DefinitionError::Io(_))));
}

#[test]
fn loads_telemetry_snapshot_from_disk() {
    let file = write_temp(r#"{"FQtyL": 14.2, "FQtyR": "13.7", "AltInd": null}"#);
    let snapshot = TelemetrySnapshot::load(file.path()).expect("load snapshot");
    assert_eq!(snapshot.get("FQtyL"), Some(14.2));
    assert_eq!(snapshot.get("FQtyR"), Some(13.7));
    assert_eq!(snapshot.get("AltInd"), None);
}
