//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing controller events to the `log`
//! facade.  The binary routes that to stderr through `tracing-subscriber`.

use log::{debug, info};

use crate::app::events::{ArmedTrigger, ControllerEvent};
use crate::app::ports::EventSink;

/// Adapter that logs every [`ControllerEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started { state } => {
                info!("START | initial_state={}", state);
            }
            ControllerEvent::Entered {
                from,
                to,
                event,
                pattern,
            } => match (from, event) {
                (Some(from), Some(event)) => {
                    info!("STATE | {} -> {} on {} | lamps={}", from, to, event, pattern);
                }
                _ => info!("STATE | -> {} | lamps={}", to, pattern),
            },
            ControllerEvent::TriggerArmed { state, trigger } => match trigger {
                ArmedTrigger::Timer(delay) => {
                    debug!("ARM   | {} leaves in {}ms", state, delay.as_millis());
                }
                ArmedTrigger::Button { pin } => {
                    debug!("ARM   | {} waits for button on pin {}", state, pin);
                }
            },
            ControllerEvent::Stopped { state } => {
                info!("STOP  | frozen in {}", state);
            }
        }
    }
}
