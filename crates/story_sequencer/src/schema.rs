// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pipeline description and UI field metadata.
//!
//! This is presentation only. Labels, ordering and widget hints tell the
//! host how to draw its controls; none of it changes how [`TickParams`]
//! are decoded or clamped.
//!
//! [`TickParams`]: crate::params::TickParams

use crate::error::Result;
use crate::params::{
    DEFAULT_JSON_FILENAME, DEFAULT_TRANSITION_DURATION, MAX_TRANSITION_DURATION,
    MIN_TRANSITION_DURATION,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Identifier the host registers this pipeline under
pub const PIPELINE_ID: &str = "scope-story-sequencer";

/// Human readable pipeline name
pub const PIPELINE_NAME: &str = "Story Sequencer";

/// Short pipeline description
pub const PIPELINE_DESCRIPTION: &str =
    "A real-time prompt sequencer that cross-fades between scene prompts.";

/// Value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    String,
    /// Floating point number
    Number,
    /// Whole number
    Integer,
    /// Checkbox or pulse
    Boolean,
}

/// Widget hints for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiHints {
    /// Field label
    pub label: String,
    /// Sort key; lower comes first
    pub order: u32,
    /// Help text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Widget to draw (`textarea`, `pulse`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Extra widget properties
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub props: Map<String, Value>,
}

/// Schema of one host parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Value type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Value the host UI starts with
    pub default: Value,
    /// Inclusive lower bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Presentation hints
    pub ui: UiHints,
}

impl FieldSchema {
    fn new(field_type: FieldType, default: Value, label: &str, order: u32) -> Self {
        Self {
            field_type,
            default,
            minimum: None,
            maximum: None,
            ui: UiHints {
                label: label.to_string(),
                order,
                description: None,
                component: None,
                props: Map::new(),
            },
        }
    }

    /// Text field
    pub fn text(default: &str, label: &str, order: u32) -> Self {
        Self::new(FieldType::String, json!(default), label, order)
    }

    /// Floating point field
    pub fn number(default: f64, label: &str, order: u32) -> Self {
        Self::new(FieldType::Number, json!(default), label, order)
    }

    /// Integer field
    pub fn integer(default: i64, label: &str, order: u32) -> Self {
        Self::new(FieldType::Integer, json!(default), label, order)
    }

    /// Boolean field
    pub fn boolean(default: bool, label: &str, order: u32) -> Self {
        Self::new(FieldType::Boolean, json!(default), label, order)
    }

    /// Set the inclusive numeric range
    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Set the help text
    pub fn with_description(mut self, description: &str) -> Self {
        self.ui.description = Some(description.to_string());
        self
    }

    /// Set the widget and its properties
    pub fn with_component(mut self, component: &str, props: Map<String, Value>) -> Self {
        self.ui.component = Some(component.to_string());
        self.ui.props = props;
        self
    }
}

/// Input mode the pipeline supports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSchema {
    /// Whether this mode is selected by default
    pub default: bool,
}

/// Full description of the pipeline for the host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSchema {
    /// Registration id
    pub pipeline_id: String,
    /// Display name
    pub pipeline_name: String,
    /// Description
    pub pipeline_description: String,
    /// Supported input modes
    pub modes: IndexMap<String, ModeSchema>,
    /// Parameter fields in declaration order
    #[serde(rename = "properties")]
    pub fields: IndexMap<String, FieldSchema>,
}

fn textarea(rows: u32) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("rows".to_string(), json!(rows));
    props
}

impl PipelineSchema {
    /// Schema of the story sequencer pipeline
    pub fn story_sequencer() -> Self {
        let mut modes = IndexMap::new();
        modes.insert("video".to_string(), ModeSchema { default: true });

        let mut fields = IndexMap::new();
        fields.insert(
            "current_prompt".to_string(),
            FieldSchema::text("A calm landscape", "Current Scene", 10)
                .with_description("The active scene description.")
                .with_component("textarea", textarea(2)),
        );
        fields.insert(
            "next_prompt".to_string(),
            FieldSchema::text("A stormy ocean", "Next Scene", 20)
                .with_description("Queue the next scene description here.")
                .with_component("textarea", textarea(2)),
        );
        fields.insert(
            "transition_duration".to_string(),
            FieldSchema::number(DEFAULT_TRANSITION_DURATION, "Transition Duration (s)", 30)
                .with_range(MIN_TRANSITION_DURATION, MAX_TRANSITION_DURATION)
                .with_description("Time to cross-fade between scenes."),
        );
        fields.insert(
            "trigger_transition".to_string(),
            FieldSchema::boolean(false, "Trigger Transition", 40)
                .with_description("Start the blend to the next scene.")
                .with_component("pulse", Map::new()),
        );
        fields.insert(
            "is_recording".to_string(),
            FieldSchema::boolean(false, "Record Sequence", 50)
                .with_description("Record every triggered transition with its timestamp."),
        );
        fields.insert(
            "export_json".to_string(),
            FieldSchema::boolean(false, "Export JSON", 60)
                .with_description("Write the recorded sequence to the file below.")
                .with_component("pulse", Map::new()),
        );
        fields.insert(
            "json_filename".to_string(),
            FieldSchema::text(DEFAULT_JSON_FILENAME, "Export File", 70),
        );

        // Model parameters forwarded untouched to the downstream step.
        fields.insert(
            "model_id".to_string(),
            FieldSchema::text("memflow", "Model ID", 100),
        );
        fields.insert(
            "guidance_scale".to_string(),
            FieldSchema::number(1.5, "Guidance Scale", 110).with_range(1.0, 20.0),
        );
        fields.insert(
            "num_inference_steps".to_string(),
            FieldSchema::integer(4, "Steps", 120).with_range(1.0, 50.0),
        );

        Self {
            pipeline_id: PIPELINE_ID.to_string(),
            pipeline_name: PIPELINE_NAME.to_string(),
            pipeline_description: PIPELINE_DESCRIPTION.to_string(),
            modes,
            fields,
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Fields sorted by their UI order
    pub fn fields_in_order(&self) -> Vec<(&str, &FieldSchema)> {
        let mut fields: Vec<_> = self
            .fields
            .iter()
            .map(|(name, field)| (name.as_str(), field))
            .collect();
        fields.sort_by_key(|(_, field)| field.ui.order);
        fields
    }

    /// Keyword map holding every field's UI default
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.default.clone()))
            .collect()
    }

    /// Render as a JSON object for the host
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
