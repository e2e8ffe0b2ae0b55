//! Feasibility report domain types
//!
//! A finished execution carries the full report body. The engine's payload
//! shape is loose, so the report is read best-effort from several field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Feasibility report extracted from a finished execution payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Vec<ReportStep>,
}

/// One section of a report, in the order the engine produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStep {
    pub name: String,
    /// Raw textual or markdown output of the step
    pub output: String,
}

const STEP_COLLECTIONS: [&str; 3] = ["steps", "flow_steps", "results"];
const STEP_NAMES: [&str; 3] = ["name", "title", "step_name"];
const STEP_OUTPUTS: [&str; 3] = ["output", "raw_output", "result"];

impl Report {
    /// Build a report view from a terminal payload
    ///
    /// Missing fields are left empty; unnamed steps are numbered from 1.
    pub fn from_payload(payload: &Value) -> Self {
        let title = string_field(payload, &["title", "name"]);
        let description = string_field(payload, &["description", "summary"]);

        let steps = STEP_COLLECTIONS
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_array))
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| ReportStep::from_value(index, item))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title,
            description,
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.steps.is_empty()
    }
}

impl ReportStep {
    fn from_value(index: usize, item: &Value) -> Option<Self> {
        if let Some(text) = item.as_str() {
            return Some(Self {
                name: format!("Step {}", index + 1),
                output: text.to_string(),
            });
        }

        let name = string_field(item, &STEP_NAMES).unwrap_or_else(|| format!("Step {}", index + 1));
        let output = STEP_OUTPUTS.iter().find_map(|key| match item.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })?;

        Some(Self { name, output })
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
