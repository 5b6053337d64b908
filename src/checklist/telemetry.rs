//! Recorded flight telemetry, reduced to a single snapshot of column values.
//!
//! How the snapshot gets produced (CSV parsing, row selection) is an external
//! concern; the engine only sees a read-only table keyed by column name.
//! Column names are normalized by trimming whitespace, since the recorder
//! pads its headers.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    values: HashMap<String, f64>,
}

impl TelemetrySnapshot {
    pub fn new(values: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(column, value)| (column.trim().to_string(), value))
                .collect(),
        }
    }

    /// Parse a snapshot from its JSON document form: an object mapping column
    /// names to values. Nulls and non-numeric entries are treated as not
    /// recorded; numeric strings are accepted since the recorder emits them.
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        let table: HashMap<String, serde_json::Value> = serde_json::from_str(document)?;
        Ok(Self::new(table.into_iter().filter_map(|(column, value)| {
            let value = match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            value.map(|v| (column, v))
        })))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let document = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&document)?)
    }

    /// The recorded value for a column, or None if it was not recorded.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
