//! Core error types

use thiserror::Error;

use crate::bus::{HandlerError, SubscriberId};
use crate::events::EventId;

/// Failure raised while broadcasting an event.
///
/// The bus does not isolate handler failures: the first failing handler
/// aborts the broadcast and its error reaches the caller of `emit`.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("handler '{handler}' of subscriber {subscriber} failed on event {event}: {source}")]
    Handler {
        event: EventId,
        subscriber: SubscriberId,
        handler: String,
        #[source]
        source: HandlerError,
    },
}

/// Scheduling errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The delay moves the trigger time outside the representable calendar
    #[error("delay {0} overflows the calendar")]
    DelayOverflow(String),
}

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;
