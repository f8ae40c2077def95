//! Native input and frame output seams
//!
//! The window session reads input through [`InputSource`] and hands finished
//! frames to a [`Presenter`]. [`ScriptedInput`] and [`FrameRecorder`] are the
//! headless implementations used by tests and demos.

use std::collections::VecDeque;
use std::sync::Arc;

use pact_core::Event;
use parking_lot::Mutex;

use crate::renderable::Surface;

/// Source of native input events
pub trait InputSource: Send {
    /// Drain the events that arrived since the last poll
    fn poll_events(&mut self) -> Vec<Event>;
}

/// Receives every rendered frame
pub trait Presenter: Send {
    fn present(&mut self, frame: &Surface);
}

/// Input replayed from a queue, one batch per poll.
///
/// Clones share the queue, so a test can keep a handle and feed events after
/// the session has taken its own.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    batches: Arc<Mutex<VecDeque<Vec<Event>>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch delivered by one future poll
    pub fn push_batch(&self, events: impl IntoIterator<Item = Event>) {
        self.batches.lock().push_back(events.into_iter().collect());
    }

    /// Queue a single event as its own batch
    pub fn push(&self, event: Event) {
        self.push_batch([event]);
    }

    pub fn pending(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Vec<Event> {
        self.batches.lock().pop_front().unwrap_or_default()
    }
}

/// Keeps the most recent frame; clones share it
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    inner: Arc<Mutex<Recorded>>,
}

#[derive(Debug, Default)]
struct Recorded {
    last: Option<Surface>,
    frames: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<Surface> {
        self.inner.lock().last.clone()
    }

    pub fn frames_presented(&self) -> u64 {
        self.inner.lock().frames
    }
}

impl Presenter for FrameRecorder {
    fn present(&mut self, frame: &Surface) {
        let mut inner = self.inner.lock();
        inner.last = Some(frame.clone());
        inner.frames += 1;
    }
}
