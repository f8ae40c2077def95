//! Pact Core Runtime
//!
//! Foundational services for the Pact engine:
//!
//! - **Event Bus**: publish/subscribe registry keyed by event, subscriber and
//!   handler name
//! - **Input Events**: pointer, key and held-keys payloads
//! - **Chrono Scheduler**: one-shot callbacks fired once their delay elapses
//! - **Context**: the bus and scheduler bundled for a session
//!
//! # Example
//!
//! ```rust
//! use pact_core::{Delay, Event, EventId, NamedHandler, PactContext, SubscriberId};
//!
//! let ctx = PactContext::new();
//!
//! let events = ctx.events.clone();
//! ctx.events.subscribe(
//!     EventId::QUIT,
//!     SubscriberId::next(),
//!     NamedHandler::new("log_quit", |_| Ok(())),
//! );
//!
//! ctx.chrono
//!     .add_trigger(Delay::ZERO, move || {
//!         events.emit(&EventId::QUIT, &Event::Quit)?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(ctx.chrono.update(), 1);
//! ```

pub mod bus;
pub mod clock;
pub mod context;
pub mod error;
pub mod events;
pub mod scheduler;

pub use bus::{
    EventBus, Handler, HandlerError, HandlerMap, HandlerResult, Handlers, NamedHandler, Subscriber,
    SubscriberId, EVENTS_TARGET, KEYS_TARGET,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::PactContext;
pub use error::{EventError, Result, ScheduleError};
pub use events::{
    Event, EventId, KeyCode, KeyEvent, KeySnapshot, Modifiers, PointerEvent, PointerKind,
};
pub use scheduler::{ChronoScheduler, Delay, Trigger, TriggerCallback, TriggerId};
