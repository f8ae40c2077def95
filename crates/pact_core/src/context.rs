//! Session context
//!
//! [`PactContext`] owns the services a running session shares between its
//! logic and render threads. Construct one at startup and hand clones to
//! whatever needs the bus or the scheduler. Each call to [`PactContext::new`]
//! yields a fresh, empty pair, so tests never observe each other's state.

use std::sync::Arc;

use crate::bus::EventBus;
use crate::clock::Clock;
use crate::scheduler::ChronoScheduler;

/// Shared event bus and trigger scheduler
#[derive(Clone, Debug, Default)]
pub struct PactContext {
    pub events: Arc<EventBus>,
    pub chrono: Arc<ChronoScheduler>,
}

impl PactContext {
    /// Fresh bus and wall-clock scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh bus and a scheduler driven by `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Arc::new(EventBus::new()),
            chrono: Arc::new(ChronoScheduler::with_clock(clock)),
        }
    }
}
