// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-facing pipeline wrapper.
//!
//! [`StoryPipeline`] is what a host instantiates: it decodes the keyword
//! map, reads the clock, ticks the sequencer, and hands the result plus the
//! untouched frames to the configured sink.

use crate::clock::{Clock, SystemClock};
use crate::params::TickParams;
use crate::schema::PipelineSchema;
use crate::sequencer::{OutputDescriptor, SequencerConfig, TransitionSequencer};
use crate::sink::{Conditioning, DownstreamSink, PassThrough};
use serde_json::{Map, Value};

/// Result of one pipeline call
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<F> {
    /// Frames returned by the sink
    pub frames: Vec<F>,
    /// Descriptor computed this tick
    pub descriptor: OutputDescriptor,
}

/// Sequencer wired to a clock and a downstream sink
#[derive(Debug)]
pub struct StoryPipeline<S = PassThrough, C = SystemClock> {
    sequencer: TransitionSequencer,
    sink: S,
    clock: C,
}

impl StoryPipeline<PassThrough, SystemClock> {
    /// Pipeline with no downstream step; frames pass through unchanged
    pub fn passthrough(config: SequencerConfig) -> Self {
        tracing::info!("No downstream sink configured, frames pass through unchanged");
        Self::new(config, PassThrough, SystemClock::new())
    }
}

impl<S, C: Clock> StoryPipeline<S, C> {
    /// Create a pipeline from its parts
    pub fn new(config: SequencerConfig, sink: S, clock: C) -> Self {
        Self {
            sequencer: TransitionSequencer::with_config(config),
            sink,
            clock,
        }
    }

    /// Describe the parameters this pipeline accepts
    pub fn schema(&self) -> PipelineSchema {
        PipelineSchema::story_sequencer()
    }

    /// The wrapped sequencer
    pub fn sequencer(&self) -> &TransitionSequencer {
        &self.sequencer
    }

    /// The downstream sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The time source
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the time source, for manually driven clocks
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Handle one host call with a raw keyword map
    pub fn process<F>(&mut self, frames: Vec<F>, kwargs: &Map<String, Value>) -> PipelineOutput<F>
    where
        S: DownstreamSink<F>,
    {
        let params = TickParams::from_kwargs(kwargs);
        self.process_params(frames, &params)
    }

    /// Handle one host call with already decoded params
    pub fn process_params<F>(&mut self, frames: Vec<F>, params: &TickParams) -> PipelineOutput<F>
    where
        S: DownstreamSink<F>,
    {
        let now = self.clock.now();
        let descriptor = self.sequencer.tick(params, now);

        let conditioning = Conditioning {
            descriptor: &descriptor,
            extras: &params.extras,
        };
        let frames = self.sink.accept(&conditioning, frames);

        PipelineOutput { frames, descriptor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    /// Sink that remembers what it was asked to generate
    #[derive(Default)]
    struct CapturingSink {
        seen: Vec<(OutputDescriptor, Option<String>)>,
    }

    impl DownstreamSink<u32> for CapturingSink {
        fn accept(&mut self, conditioning: &Conditioning<'_>, frames: Vec<u32>) -> Vec<u32> {
            self.seen.push((
                conditioning.descriptor.clone(),
                conditioning.extra_str("negative_prompt").map(str::to_string),
            ));
            frames.into_iter().map(|f| f + 1).collect()
        }
    }

    fn kwargs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_process_uses_clock_and_sink() {
        let mut pipeline = StoryPipeline::new(
            SequencerConfig::default(),
            CapturingSink::default(),
            ManualClock::at(0.0),
        );

        let out = pipeline.process(
            vec![1u32, 2],
            &kwargs(json!({
                "current_prompt": "A",
                "next_prompt": "B",
                "transition_duration": 2.0,
                "trigger_transition": true,
                "negative_prompt": "blurry",
            })),
        );
        assert_eq!(out.frames, vec![2, 3]);
        assert_eq!(out.descriptor.queued_prompt, "B");

        pipeline.clock_mut().set(1.0);
        let out = pipeline.process(
            vec![7u32],
            &kwargs(json!({ "current_prompt": "A", "next_prompt": "B" })),
        );
        assert_eq!(out.descriptor.blend_weight, 0.5);

        let seen = &pipeline.sink().seen;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1.as_deref(), Some("blurry"));
        assert_eq!(seen[1].1, None);
    }

    #[test]
    fn test_passthrough_pipeline() {
        let mut pipeline = StoryPipeline::passthrough(SequencerConfig::default());
        let out = pipeline.process(vec!["frame"], &kwargs(json!({ "current_prompt": "A" })));

        assert_eq!(out.frames, vec!["frame"]);
        assert_eq!(out.descriptor.prompt, "A");
        assert_eq!(out.descriptor.blend_weight, 0.0);
    }

    #[test]
    fn test_bad_kwargs_do_not_break_the_tick() {
        let mut pipeline = StoryPipeline::new(
            SequencerConfig::default(),
            PassThrough,
            ManualClock::default(),
        );

        let out = pipeline.process(
            Vec::<u8>::new(),
            &kwargs(json!({
                "current_prompt": "A",
                "next_prompt": "B",
                "transition_duration": "slow",
                "trigger_transition": true,
            })),
        );

        assert!(pipeline.sequencer().is_transition_active());
        assert_eq!(pipeline.sequencer().state().duration, 2.0);
        assert_eq!(out.descriptor.queued_prompt, "B");
    }

    #[test]
    fn test_schema_exposed() {
        let pipeline = StoryPipeline::passthrough(SequencerConfig::default());
        assert_eq!(pipeline.schema().pipeline_id, "scope-story-sequencer");
    }
}
