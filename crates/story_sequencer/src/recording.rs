// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording of triggered transitions and JSON export.
//!
//! The log is append-only while a session is running. Starting a new
//! session clears it; stopping one keeps it around for export.

use crate::error::{Result, SequencerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Seconds since the recording session started
    #[serde(rename = "time")]
    pub offset: f64,
    /// Prompt faded out
    pub prompt_from: String,
    /// Prompt faded in
    pub prompt_to: String,
    /// Transition length in seconds
    pub duration: f64,
}

/// A running recording session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingSession {
    /// Session id for log correlation
    pub id: Uuid,
    /// Time the session started, in seconds
    pub started_at: f64,
}

/// Ordered log of recorded transitions
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    events: Vec<RecordedEvent>,
    session: Option<RecordingSession>,
}

impl RecordingLog {
    /// Create an empty, idle log
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an idle log from existing events
    pub fn from_events(events: Vec<RecordedEvent>) -> Self {
        Self {
            events,
            session: None,
        }
    }

    /// Start a new session at `now`, discarding previous events
    pub fn start(&mut self, now: f64) -> RecordingSession {
        let session = RecordingSession {
            id: Uuid::new_v4(),
            started_at: now,
        };
        self.events.clear();
        self.session = Some(session);
        session
    }

    /// Stop the current session. Events are kept.
    pub fn stop(&mut self) -> Option<RecordingSession> {
        self.session.take()
    }

    /// Whether a session is running
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// The running session, if any
    pub fn session(&self) -> Option<RecordingSession> {
        self.session
    }

    /// Append a transition if a session is running
    pub fn record(
        &mut self,
        now: f64,
        prompt_from: impl Into<String>,
        prompt_to: impl Into<String>,
        duration: f64,
    ) -> Option<&RecordedEvent> {
        let session = self.session?;
        self.events.push(RecordedEvent {
            offset: now - session.started_at,
            prompt_from: prompt_from.into(),
            prompt_to: prompt_to.into(),
            duration,
        });
        self.events.last()
    }

    /// Recorded events in order
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Render the log as a pretty-printed JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    /// Write the log to `path`, replacing any existing file.
    ///
    /// Returns the number of events written.
    pub fn export(&self, path: &Path) -> Result<usize> {
        let content = self.to_json()?;
        std::fs::write(path, content).map_err(|source| SequencerError::ExportIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.events.len())
    }

    /// Read a previously exported file into an idle log
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SequencerError::LoadIo {
            path: path.to_path_buf(),
            source,
        })?;
        let events: Vec<RecordedEvent> = serde_json::from_str(&content)?;
        Ok(Self::from_events(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_requires_session() {
        let mut log = RecordingLog::new();
        assert!(log.record(1.0, "A", "B", 2.0).is_none());
        assert!(log.is_empty());

        log.start(1.0);
        let event = log.record(3.5, "A", "B", 2.0).cloned().unwrap();
        assert_eq!(event.offset, 2.5);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_stop_keeps_events_start_clears() {
        let mut log = RecordingLog::new();
        let first = log.start(0.0);
        log.record(1.0, "A", "B", 2.0);
        log.record(4.0, "B", "C", 1.0);

        assert_eq!(log.stop(), Some(first));
        assert!(!log.is_recording());
        assert_eq!(log.len(), 2);

        let second = log.start(10.0);
        assert_ne!(first.id, second.id);
        assert!(log.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let mut log = RecordingLog::new();
        log.start(0.0);
        log.record(1.25, "A", "B", 2.0);

        let value: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        let event = &value[0];
        assert_eq!(event["time"], serde_json::json!(1.25));
        assert_eq!(event["prompt_from"], "A");
        assert_eq!(event["prompt_to"], "B");
        assert_eq!(event["duration"], serde_json::json!(2.0));
    }

    #[test]
    fn test_export_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("story.json");

        let mut log = RecordingLog::new();
        log.start(100.0);
        log.record(100.1, "forest", "desert", 2.0);
        log.record(103.7, "desert", "ocean", 0.5);
        log.record(109.0, "ocean", "city", 10.0);

        assert_eq!(log.export(&path).unwrap(), 3);

        let loaded = RecordingLog::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        for (original, read) in log.events().iter().zip(loaded.events()) {
            assert!((original.offset - read.offset).abs() < 1e-9);
            assert_eq!(original.prompt_from, read.prompt_from);
            assert_eq!(original.prompt_to, read.prompt_to);
            assert_eq!(original.duration, read.duration);
        }
    }

    #[test]
    fn test_export_overwrites_identically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("story.json");
        std::fs::write(&path, "stale contents").unwrap();

        let mut log = RecordingLog::new();
        log.start(0.0);
        log.record(0.5, "A", "B", 1.0);

        log.export(&path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        log.export(&path).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert!(!first.contains("stale"));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("story.json");

        let mut log = RecordingLog::new();
        log.start(0.0);
        log.record(0.0, "A", "B", 1.0);

        match log.export(&path) {
            Err(SequencerError::ExportIo { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
