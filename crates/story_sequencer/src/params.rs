// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-tick parameter snapshot supplied by the host.
//!
//! The host decodes its UI schema into a keyword map on every call. This
//! module turns that map into a [`TickParams`] value:
//! - Recognised fields are type-checked and defaulted
//! - Unknown keys are kept aside as pass-through extras
//! - Transition duration is clamped to the supported range

use crate::error::{Result, SequencerError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Transition length used when the host sends nothing usable
pub const DEFAULT_TRANSITION_DURATION: f64 = 2.0;

/// Shortest non-instant transition, in seconds
pub const MIN_TRANSITION_DURATION: f64 = 0.1;

/// Longest transition, in seconds
pub const MAX_TRANSITION_DURATION: f64 = 10.0;

/// Export file name used when the host sends an empty one
pub const DEFAULT_JSON_FILENAME: &str = "story_sequence.json";

/// Clamp a requested transition duration into the supported range.
///
/// Non-positive values mean an instant cut and map to `0.0`. NaN maps to
/// [`DEFAULT_TRANSITION_DURATION`]. Everything else lands in
/// `[MIN_TRANSITION_DURATION, MAX_TRANSITION_DURATION]`.
pub fn clamp_duration(seconds: f64) -> f64 {
    if seconds.is_nan() {
        DEFAULT_TRANSITION_DURATION
    } else if seconds <= 0.0 {
        0.0
    } else {
        seconds.clamp(MIN_TRANSITION_DURATION, MAX_TRANSITION_DURATION)
    }
}

/// Validated parameter values for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickParams {
    /// Text of the "current scene" field
    pub current_prompt: String,
    /// Text of the "next scene" field
    pub next_prompt: String,
    /// Requested transition length in seconds (unclamped)
    pub transition_duration: f64,
    /// Transition trigger pulse
    pub trigger_transition: bool,
    /// Recording toggle
    pub is_recording: bool,
    /// Export request
    pub export_json: bool,
    /// Export target file name
    pub json_filename: String,
    /// Host keys this crate does not interpret, forwarded to the sink
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,
}

impl Default for TickParams {
    fn default() -> Self {
        Self {
            current_prompt: String::new(),
            next_prompt: String::new(),
            transition_duration: DEFAULT_TRANSITION_DURATION,
            trigger_transition: false,
            is_recording: false,
            export_json: false,
            json_filename: DEFAULT_JSON_FILENAME.to_string(),
            extras: Map::new(),
        }
    }
}

impl TickParams {
    /// Create params with both prompts set and everything else defaulted
    pub fn prompts(current: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            current_prompt: current.into(),
            next_prompt: next.into(),
            ..Self::default()
        }
    }

    /// Set the transition duration
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.transition_duration = seconds;
        self
    }

    /// Set the trigger flag
    pub fn with_trigger(mut self, trigger: bool) -> Self {
        self.trigger_transition = trigger;
        self
    }

    /// Set the recording flag
    pub fn with_recording(mut self, recording: bool) -> Self {
        self.is_recording = recording;
        self
    }

    /// Request an export to the given file
    pub fn with_export(mut self, filename: impl Into<String>) -> Self {
        self.export_json = true;
        self.json_filename = filename.into();
        self
    }

    /// Decode a host keyword map, failing on the first badly typed field.
    ///
    /// `null` values leave the field at its default. Unknown keys go to
    /// [`TickParams::extras`].
    pub fn try_from_kwargs(kwargs: &Map<String, Value>) -> Result<Self> {
        let mut params = Self::default();
        for (key, value) in kwargs {
            params.apply(key, value)?;
        }
        Ok(params)
    }

    /// Decode a host keyword map, defaulting any badly typed field.
    pub fn from_kwargs(kwargs: &Map<String, Value>) -> Self {
        let mut params = Self::default();
        for (key, value) in kwargs {
            if let Err(e) = params.apply(key, value) {
                tracing::warn!("{e}; using default");
            }
        }
        params
    }

    /// Transition duration after clamping
    pub fn clamped_duration(&self) -> f64 {
        clamp_duration(self.transition_duration)
    }

    /// Export file name, falling back to the default when blank
    pub fn export_filename(&self) -> &str {
        if self.json_filename.trim().is_empty() {
            DEFAULT_JSON_FILENAME
        } else {
            &self.json_filename
        }
    }

    fn apply(&mut self, key: &str, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }

        match key {
            "current_prompt" => self.current_prompt = expect_str(key, value)?,
            "next_prompt" => self.next_prompt = expect_str(key, value)?,
            "transition_duration" => self.transition_duration = expect_f64(key, value)?,
            "trigger_transition" => self.trigger_transition = expect_bool(key, value)?,
            "is_recording" => self.is_recording = expect_bool(key, value)?,
            "export_json" => self.export_json = expect_bool(key, value)?,
            "json_filename" => self.json_filename = expect_str(key, value)?,
            _ => {
                self.extras.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> SequencerError {
    SequencerError::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn expect_str(name: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(name, format!("expected a string, got {value}")))
}

fn expect_f64(name: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| invalid(name, format!("expected a number, got {value}")))
}

// Hosts sometimes deliver pulse widgets as 0/1.
fn expect_bool(name: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => n
            .as_f64()
            .map(|v| v != 0.0)
            .ok_or_else(|| invalid(name, format!("expected a boolean, got {value}"))),
        _ => Err(invalid(name, format!("expected a boolean, got {value}"))),
    }
}
