//! GPIO pin assignments for the reference traffic light board.
//!
//! BCM numbering.  These are only the defaults baked into
//! [`ControllerConfig`](crate::config::ControllerConfig); every driver takes
//! its pin from configuration rather than from here.

// ---------------------------------------------------------------------------
// Signal lamps (active HIGH through a transistor / LED + resistor)
// ---------------------------------------------------------------------------

pub const RED_GPIO: u8 = 18;
pub const YELLOW_GPIO: u8 = 23;
pub const GREEN_GPIO: u8 = 24;

// ---------------------------------------------------------------------------
// Push button (pull-down, reads HIGH while pressed)
// ---------------------------------------------------------------------------

/// Momentary push-button requesting a signal cycle.
pub const BUTTON_GPIO: u8 = 25;
