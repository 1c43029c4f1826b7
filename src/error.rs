//! Unified error type for the traffic light controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! controller's public API uniform.  All variants are `Copy` so they can be
//! passed out of trigger workers and through the panic path without
//! allocation.

use core::fmt;

use crate::fsm::Event;

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The transition table has no entry for the delivered `(state, event)`.
    ///
    /// This is a model error: the entry actions armed a trigger whose event
    /// the table does not handle.  Trigger workers escalate it to a panic.
    UnhandledEvent { state: &'static str, event: Event },
    /// `start()` was called on a controller that already left `Constructed`.
    AlreadyStarted,
    /// `dispatch()` was called before `start()` or after `stop()`.
    NotRunning,
    /// Two transitions share the same `(state, event)` source.
    DuplicateTransition { state: &'static str, event: Event },
    /// A state's trigger fires an event the table cannot route.
    MissingTransition { state: &'static str, event: Event },
    /// More transitions or states than the fixed-capacity tables hold.
    TableFull,
    /// A state has no descriptor in the entry-action table.
    MissingState(&'static str),
    /// A state waits on the push button but no input port was supplied.
    MissingInput,
    /// The OS refused to spawn a trigger worker thread.
    WorkerSpawn(&'static str),
    /// Configuration is invalid.
    InvalidConfig(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnhandledEvent { state, event } => {
                write!(f, "unhandled event {event} in state {state}")
            }
            Self::AlreadyStarted => write!(f, "controller already started"),
            Self::NotRunning => write!(f, "controller is not running"),
            Self::DuplicateTransition { state, event } => {
                write!(f, "duplicate transition for {event} from {state}")
            }
            Self::MissingTransition { state, event } => {
                write!(f, "state {state} arms {event} but has no transition for it")
            }
            Self::TableFull => write!(f, "state table capacity exceeded"),
            Self::MissingState(state) => write!(f, "no entry actions for state {state}"),
            Self::MissingInput => write!(f, "button-triggered state requires an input port"),
            Self::WorkerSpawn(name) => write!(f, "failed to spawn worker '{name}'"),
            Self::InvalidConfig(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
