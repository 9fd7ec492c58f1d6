// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the story sequencer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by sequencer helpers.
///
/// None of these escape [`TransitionSequencer::tick`](crate::TransitionSequencer::tick);
/// the tick loop logs them and carries on.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// Writing the export file failed
    #[error("Failed to write export file {path:?}: {source}")]
    ExportIo {
        /// Target path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Reading a previously exported file failed
    #[error("Failed to read recording file {path:?}: {source}")]
    LoadIo {
        /// Source path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A host parameter had an unusable value
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as sent by the host
        name: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type for sequencer operations
pub type Result<T> = std::result::Result<T, SequencerError>;
