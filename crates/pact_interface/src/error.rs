//! Interface error types

use pact_core::EventError;
use thiserror::Error;

/// Interface-related errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    /// Another layer already holds this priority
    #[error("Layer priority {0} is already taken")]
    PriorityTaken(i32),

    /// A loop rate of zero
    #[error("Invalid {name} tick rate: {hz} Hz")]
    InvalidTickRate { name: &'static str, hz: u32 },

    /// Zero-sized canvas
    #[error("Invalid window size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// `start` called on a running session
    #[error("Window session is already running")]
    AlreadyRunning,

    /// Failed to spawn a session thread
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A handler failed while the window broadcast input
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Result type for interface operations
pub type Result<T> = std::result::Result<T, InterfaceError>;
