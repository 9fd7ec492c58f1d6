// SPDX-License-Identifier: MIT OR Apache-2.0
//! Prompt transition sequencer.
//!
//! The sequencer is driven by the host once per pipeline step. Each tick it:
//! 1. Follows the recording toggle
//! 2. Starts a transition on trigger, unless one is already running
//! 3. Advances the blend weight of the running transition
//! 4. Writes the recording to disk on request
//!
//! and returns an [`OutputDescriptor`] for the host's generation step.

use crate::error::Result;
use crate::params::{TickParams, DEFAULT_TRANSITION_DURATION};
use crate::recording::RecordingLog;
use crate::transition::{Transition, TransitionProgress};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a boolean host flag is turned into an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Act on every tick the flag is set
    #[default]
    Level,
    /// Act only when the flag goes from unset to set
    Edge,
}

impl TriggerMode {
    /// Whether the flag fires this tick
    pub fn fires(&self, current: bool, previous: bool) -> bool {
        match self {
            Self::Level => current,
            Self::Edge => current && !previous,
        }
    }
}

/// Sequencer behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// How `trigger_transition` starts transitions
    pub trigger_mode: TriggerMode,
    /// How `export_json` requests exports
    pub export_mode: TriggerMode,
    /// Directory relative export file names are resolved against
    pub export_dir: Option<PathBuf>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            trigger_mode: TriggerMode::Level,
            export_mode: TriggerMode::Edge,
            export_dir: None,
        }
    }
}

/// What the host should condition generation on this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    /// Prompt in effect
    pub prompt: String,
    /// Prompt being faded in; empty when idle
    pub queued_prompt: String,
    /// 0.0 = fully `prompt`, 1.0 = fully `queued_prompt`
    pub blend_weight: f64,
}

/// Snapshot of the sequencer's transition state
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerState {
    /// Prompt currently in effect
    pub active_prompt: String,
    /// Prompt being transitioned toward; empty when idle
    pub queued_prompt: String,
    /// Whether a cross-fade is running
    pub transition_active: bool,
    /// Start time of the running transition
    pub transition_start: f64,
    /// Length of the running (or last) transition
    pub duration: f64,
    /// Current blend weight
    pub blend_weight: f64,
}

impl SequencerState {
    fn new() -> Self {
        Self {
            active_prompt: String::new(),
            queued_prompt: String::new(),
            transition_active: false,
            transition_start: 0.0,
            duration: DEFAULT_TRANSITION_DURATION,
            blend_weight: 0.0,
        }
    }

    /// The running transition, if any
    pub fn transition(&self) -> Option<Transition> {
        self.transition_active.then(|| {
            Transition::new(
                self.active_prompt.clone(),
                self.queued_prompt.clone(),
                self.transition_start,
                self.duration,
            )
        })
    }
}

/// Timed cross-fade state machine with a recording log
#[derive(Debug)]
pub struct TransitionSequencer {
    config: SequencerConfig,
    state: SequencerState,
    recording: RecordingLog,
    last_trigger: bool,
    last_export: bool,
}

impl TransitionSequencer {
    /// Create an idle sequencer with default settings
    pub fn new() -> Self {
        Self::with_config(SequencerConfig::default())
    }

    /// Create an idle sequencer with the given settings
    pub fn with_config(config: SequencerConfig) -> Self {
        Self {
            config,
            state: SequencerState::new(),
            recording: RecordingLog::new(),
            last_trigger: false,
            last_export: false,
        }
    }

    /// Current settings
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Current transition state
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Recorded transitions
    pub fn recording(&self) -> &RecordingLog {
        &self.recording
    }

    /// Whether a cross-fade is running
    pub fn is_transition_active(&self) -> bool {
        self.state.transition_active
    }

    /// Advance the sequencer by one host step.
    ///
    /// `now` must not go backwards between calls. Export failures are
    /// logged and never affect the returned descriptor.
    pub fn tick(&mut self, params: &TickParams, now: f64) -> OutputDescriptor {
        self.update_recording(params.is_recording, now);

        if self.state.active_prompt.is_empty() && !params.current_prompt.is_empty() {
            self.state.active_prompt = params.current_prompt.clone();
        }

        let trigger = self
            .config
            .trigger_mode
            .fires(params.trigger_transition, self.last_trigger);
        self.last_trigger = params.trigger_transition;
        if trigger {
            self.begin_transition(params, now);
        }

        self.update_blend(params, now);

        let export = self
            .config
            .export_mode
            .fires(params.export_json, self.last_export);
        self.last_export = params.export_json;
        if export {
            self.export_requested(params);
        }

        self.output()
    }

    /// Write the recording to `path` outside the tick flow.
    ///
    /// Returns the number of events written.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        self.recording.export(path)
    }

    /// Resolve the export target for the given params
    pub fn export_path(&self, params: &TickParams) -> PathBuf {
        let name = Path::new(params.export_filename());
        match &self.config.export_dir {
            Some(dir) if name.is_relative() => dir.join(name),
            _ => name.to_path_buf(),
        }
    }

    fn update_recording(&mut self, record: bool, now: f64) {
        match (record, self.recording.is_recording()) {
            (true, false) => {
                let session = self.recording.start(now);
                tracing::info!(session = %session.id, "Started recording story sequence");
            }
            (false, true) => {
                if let Some(session) = self.recording.stop() {
                    tracing::info!(
                        session = %session.id,
                        events = self.recording.len(),
                        "Stopped recording story sequence"
                    );
                }
            }
            _ => {}
        }
    }

    fn begin_transition(&mut self, params: &TickParams, now: f64) {
        if self.state.transition_active {
            tracing::debug!("Transition already in flight, ignoring trigger");
            return;
        }

        let duration = params.clamped_duration();
        if duration != params.transition_duration {
            tracing::warn!(
                requested = params.transition_duration,
                applied = duration,
                "Transition duration out of range, clamped"
            );
        }

        let state = &mut self.state;
        state.transition_active = true;
        state.transition_start = now;
        state.duration = duration;
        state.active_prompt = params.current_prompt.clone();
        state.queued_prompt = params.next_prompt.clone();

        tracing::info!(
            from = %state.active_prompt,
            to = %state.queued_prompt,
            duration,
            "Transition started"
        );

        if let Some(event) = self.recording.record(
            now,
            state.active_prompt.as_str(),
            state.queued_prompt.as_str(),
            duration,
        ) {
            tracing::debug!(offset = event.offset, "Recorded transition");
        }
    }

    fn update_blend(&mut self, params: &TickParams, now: f64) {
        let Some(transition) = self.state.transition() else {
            self.state.blend_weight = 0.0;
            self.state.active_prompt = params.current_prompt.clone();
            return;
        };

        match transition.progress(now) {
            TransitionProgress::Blending(weight) => self.state.blend_weight = weight,
            TransitionProgress::Complete => {
                self.state.blend_weight = 1.0;
                self.state.transition_active = false;
                self.state.active_prompt = std::mem::take(&mut self.state.queued_prompt);
                tracing::info!(prompt = %self.state.active_prompt, "Transition complete");
            }
        }
    }

    fn export_requested(&self, params: &TickParams) {
        if self.recording.is_empty() {
            tracing::debug!("Export requested but nothing has been recorded");
            return;
        }

        let path = self.export_path(params);
        match self.recording.export(&path) {
            Ok(count) => {
                tracing::info!("Exported {} events to {}", count, path.display());
            }
            Err(e) => {
                tracing::error!("Failed to export story sequence: {e}");
            }
        }
    }

    fn output(&self) -> OutputDescriptor {
        OutputDescriptor {
            prompt: self.state.active_prompt.clone(),
            queued_prompt: if self.state.transition_active {
                self.state.queued_prompt.clone()
            } else {
                String::new()
            },
            blend_weight: self.state.blend_weight,
        }
    }
}

impl Default for TransitionSequencer {
    fn default() -> Self {
        Self::new()
    }
}
