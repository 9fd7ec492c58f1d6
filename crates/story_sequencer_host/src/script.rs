// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted host sessions.
//!
//! A session script is a RON file holding sequencer settings and a list of
//! timed parameter snapshots. Running it replays the snapshots against a
//! [`StoryPipeline`] on a manual clock, one tick per step.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use story_sequencer::{
    ManualClock, OutputDescriptor, PassThrough, SequencerConfig, SequencerError, StoryPipeline,
    TickParams,
};
use thiserror::Error;

/// Script errors
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script file could not be read
    #[error("Failed to read script {path:?}: {source}")]
    Read {
        /// Script path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Script is not valid RON
    #[error("Failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Step times go backwards
    #[error("Step {index} at {at}s comes before the previous step at {previous}s")]
    OutOfOrder {
        /// Offending step index
        index: usize,
        /// Its time
        at: f64,
        /// Time of the step before it
        previous: f64,
    },

    /// Writing output failed
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    /// JSON encoding failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sequencer error
    #[error(transparent)]
    Sequencer(#[from] SequencerError),
}

/// Result type for script operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// One timed parameter snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Clock time of the tick, in seconds
    pub at: f64,
    /// Parameters the host sends on this tick
    #[serde(default)]
    pub params: TickParams,
}

/// A scripted host session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionScript {
    /// Sequencer settings
    pub config: SequencerConfig,
    /// Ticks in time order
    pub steps: Vec<ScriptStep>,
}

/// Totals from a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Ticks executed
    pub ticks: usize,
    /// Events in the recording log at the end
    pub recorded_events: usize,
}

/// One line of run output
#[derive(Serialize)]
struct StepReport<'a> {
    at: f64,
    #[serde(flatten)]
    descriptor: &'a OutputDescriptor,
}

impl SessionScript {
    /// Parse a script from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let script: SessionScript = ron::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    /// Load a script file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content)
    }

    /// Check that step times never go backwards
    pub fn validate(&self) -> Result<()> {
        for (index, pair) in self.steps.windows(2).enumerate() {
            if pair[1].at < pair[0].at {
                return Err(ScriptError::OutOfOrder {
                    index: index + 1,
                    at: pair[1].at,
                    previous: pair[0].at,
                });
            }
        }
        Ok(())
    }

    /// Replay the session, writing one JSON line per tick to `out`
    pub fn run(&self, out: &mut impl Write) -> Result<RunSummary> {
        let mut pipeline =
            StoryPipeline::new(self.config.clone(), PassThrough, ManualClock::default());

        for (index, step) in self.steps.iter().enumerate() {
            pipeline.clock_mut().set(step.at);
            let output = pipeline.process_params(vec![index], &step.params);

            let report = StepReport {
                at: step.at,
                descriptor: &output.descriptor,
            };
            serde_json::to_writer(&mut *out, &report)?;
            writeln!(out)?;
        }

        Ok(RunSummary {
            ticks: self.steps.len(),
            recorded_events: pipeline.sequencer().recording().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_sequencer::{RecordingLog, TriggerMode};
    use tempfile::tempdir;

    const SCENARIO: &str = r#"(
        steps: [
            (at: 0.0, params: (current_prompt: "A", next_prompt: "B", transition_duration: 2.0, trigger_transition: true)),
            (at: 1.0, params: (current_prompt: "A", next_prompt: "B")),
            (at: 2.0, params: (current_prompt: "A", next_prompt: "B")),
        ],
    )"#;

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_defaults() {
        let script = SessionScript::from_ron("(steps: [(at: 0.5)])").unwrap();
        assert_eq!(script.config, SequencerConfig::default());
        assert_eq!(script.steps.len(), 1);
        assert_eq!(script.steps[0].params, TickParams::default());
    }

    #[test]
    fn test_parse_config() {
        let script = SessionScript::from_ron(
            r#"(config: (trigger_mode: Edge, export_dir: Some("out")), steps: [])"#,
        )
        .unwrap();
        assert_eq!(script.config.trigger_mode, TriggerMode::Edge);
        assert_eq!(script.config.export_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        let err = SessionScript::from_ron("(steps: [(at: 2.0), (at: 1.0)])").unwrap_err();
        match err {
            ScriptError::OutOfOrder { index, at, previous } => {
                assert_eq!(index, 1);
                assert_eq!(at, 1.0);
                assert_eq!(previous, 2.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_scenario() {
        let script = SessionScript::from_ron(SCENARIO).unwrap();
        let mut out = Vec::new();
        let summary = script.run(&mut out).unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.recorded_events, 0);

        let lines = lines(&out);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["prompt"], "A");
        assert_eq!(lines[0]["queued_prompt"], "B");
        assert_eq!(lines[0]["blend_weight"], 0.0);
        assert_eq!(lines[1]["blend_weight"], 0.5);
        assert_eq!(lines[2]["prompt"], "B");
        assert_eq!(lines[2]["queued_prompt"], "");
        assert_eq!(lines[2]["blend_weight"], 1.0);
        assert_eq!(lines[2]["at"], 2.0);
    }

    #[test]
    fn test_run_records_and_exports() {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("session.ron");
        let export_dir = dir.path().to_string_lossy().replace('\\', "/");
        std::fs::write(
            &script_path,
            format!(
                r#"(
                    config: (export_dir: Some("{export_dir}")),
                    steps: [
                        (at: 0.0, params: (current_prompt: "forest", next_prompt: "desert", is_recording: true)),
                        (at: 1.0, params: (current_prompt: "forest", next_prompt: "desert", is_recording: true, trigger_transition: true, transition_duration: 0.5)),
                        (at: 2.0, params: (current_prompt: "desert", next_prompt: "ocean", is_recording: true, export_json: true, json_filename: "story.json", extras: {{"negative_prompt": "blurry"}})),
                    ],
                )"#
            ),
        )
        .unwrap();

        let script = SessionScript::load(&script_path).unwrap();
        assert_eq!(script.steps[2].params.extras["negative_prompt"], "blurry");

        let summary = script.run(&mut Vec::<u8>::new()).unwrap();
        assert_eq!(summary.recorded_events, 1);

        let log = RecordingLog::load(&dir.path().join("story.json")).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].prompt_from, "forest");
        assert_eq!(log.events()[0].prompt_to, "desert");
        assert_eq!(log.events()[0].duration, 0.5);
        assert!((log.events()[0].offset - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_script() {
        let dir = tempdir().unwrap();
        let err = SessionScript::load(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ScriptError::Read { .. }));
    }
}
