//! Outbound controller events.
//!
//! The [`Controller`](super::controller::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them.  State names are carried as `&'static str`
//! so one sink serves every machine.

use core::time::Duration;

use crate::fsm::Event;
use crate::fsm::pattern::OutputPattern;

/// How the current state will be left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmedTrigger {
    Timer(Duration),
    Button { pin: u8 },
}

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// `start()` applied the initial state.
    Started { state: &'static str },

    /// A state's entry action ran.  `event` is `None` for the initial entry.
    Entered {
        from: Option<&'static str>,
        to: &'static str,
        event: Option<Event>,
        pattern: OutputPattern,
    },

    /// The outgoing trigger for `state` was armed.
    TriggerArmed {
        state: &'static str,
        trigger: ArmedTrigger,
    },

    /// `stop()` cancelled outstanding work.  `state` is where the machine
    /// was frozen.
    Stopped { state: &'static str },
}
