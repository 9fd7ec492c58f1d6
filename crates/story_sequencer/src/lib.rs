// SPDX-License-Identifier: MIT OR Apache-2.0
//! Prompt cross-fade sequencer for video generation pipelines.
//!
//! This crate decides which scene prompt(s) a host's generation step should
//! use on every frame:
//! - Current/next scene prompt pair
//! - Timed linear cross-fades with a blend weight
//! - Recording of triggered transitions
//! - JSON export of the recording
//!
//! ## Architecture
//!
//! The crate is built on:
//! - [`TransitionSequencer`], a single-threaded state machine ticked by the host
//! - [`StoryPipeline`], which wires it to a [`Clock`] and a [`DownstreamSink`]
//! - [`PipelineSchema`], UI metadata for the host's parameter panel

pub mod clock;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod recording;
pub mod schema;
pub mod sequencer;
pub mod sink;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, SequencerError};
pub use params::{
    clamp_duration, TickParams, DEFAULT_JSON_FILENAME, DEFAULT_TRANSITION_DURATION,
    MAX_TRANSITION_DURATION, MIN_TRANSITION_DURATION,
};
pub use pipeline::{PipelineOutput, StoryPipeline};
pub use recording::{RecordedEvent, RecordingLog, RecordingSession};
pub use schema::{FieldSchema, FieldType, ModeSchema, PipelineSchema, UiHints};
pub use sequencer::{
    OutputDescriptor, SequencerConfig, SequencerState, TransitionSequencer, TriggerMode,
};
pub use sink::{Conditioning, DownstreamSink, PassThrough};
pub use transition::{Transition, TransitionProgress};
