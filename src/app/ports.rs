//! Port traits: the boundary between the controller and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Lamp drivers, the button input, and event sinks implement these traits.
//! The [`Controller`](super::controller::Controller) only ever talks to
//! boxed trait objects, so the same core drives GPIO, a console, or a
//! recording mock in tests.

use std::sync::{Arc, Mutex};

use crate::fsm::pattern::OutputPattern;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → lamps)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the controller calls this on every state entry.
pub trait OutputPort {
    /// Drive all three lamps to `pattern` in one call.
    fn set_outputs(&mut self, pattern: OutputPattern);

    /// Release the lamps at process shutdown.  Defaults to all off.
    fn release(&mut self) {
        self.set_outputs(OutputPattern::OFF);
    }
}

// ───────────────────────────────────────────────────────────────
// Input port (driving adapter: button → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port sampled by the edge monitor.
pub trait InputPort {
    /// Raw electrical level of `pin` (`true` = HIGH).  Polarity is applied
    /// by the monitor, not here.
    fn read_digital(&mut self, pin: u8) -> bool;
}

/// Input shared between the controller and its monitor workers.
pub type SharedInput = Arc<Mutex<dyn InputPort + Send>>;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured
/// [`ControllerEvent`](super::events::ControllerEvent)s through this port.
/// Calls happen while the controller's state lock is held, so
/// implementations must not call back into the controller.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::ControllerEvent) {}
}
