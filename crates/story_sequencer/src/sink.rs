// SPDX-License-Identifier: MIT OR Apache-2.0
//! Downstream generation step.
//!
//! The sequencer never touches frames itself. Whatever consumes its
//! descriptor is handed in at construction as a [`DownstreamSink`].

use crate::sequencer::OutputDescriptor;
use serde_json::{Map, Value};

/// Everything the downstream step needs for one tick
#[derive(Debug, Clone, Copy)]
pub struct Conditioning<'a> {
    /// Prompt pair and blend weight
    pub descriptor: &'a OutputDescriptor,
    /// Host parameters the sequencer did not interpret
    pub extras: &'a Map<String, Value>,
}

impl Conditioning<'_> {
    /// Look up a pass-through string parameter such as `negative_prompt`
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extras.get(key).and_then(Value::as_str)
    }
}

/// Consumer of sequencer output, generic over the host's frame type
pub trait DownstreamSink<F> {
    /// Run the downstream step and return the frames to emit
    fn accept(&mut self, conditioning: &Conditioning<'_>, frames: Vec<F>) -> Vec<F>;
}

/// Sink used when no downstream step is wired up: frames are returned unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<F> DownstreamSink<F> for PassThrough {
    fn accept(&mut self, _conditioning: &Conditioning<'_>, frames: Vec<F>) -> Vec<F> {
        frames
    }
}

impl<F, S: DownstreamSink<F> + ?Sized> DownstreamSink<F> for Box<S> {
    fn accept(&mut self, conditioning: &Conditioning<'_>, frames: Vec<F>) -> Vec<F> {
        (**self).accept(conditioning, frames)
    }
}
