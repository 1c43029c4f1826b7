//! `embedded-hal` 1.0 pin adapters for the lamp and button ports.
//!
//! Any HAL that implements [`OutputPin`] / [`InputPin`] (linux-embedded-hal,
//! rppal, esp-idf-hal, ...) plugs in here.  Port calls are infallible to the
//! controller; a pin error is logged and the write is not retried.

use embedded_hal::digital::{Error as _, InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::{InputPort, OutputPort};
use crate::fsm::pattern::{Channel, OutputPattern};

/// Three lamp pins driven as one [`OutputPort`].
pub struct GpioLamps<R, Y, G> {
    red: R,
    yellow: Y,
    green: G,
}

impl<R: OutputPin, Y: OutputPin, G: OutputPin> GpioLamps<R, Y, G> {
    pub fn new(red: R, yellow: Y, green: G) -> Self {
        Self { red, yellow, green }
    }

    /// Give the pins back, e.g. to hand them to another driver.
    pub fn into_inner(self) -> (R, Y, G) {
        (self.red, self.yellow, self.green)
    }
}

impl<R: OutputPin, Y: OutputPin, G: OutputPin> OutputPort for GpioLamps<R, Y, G> {
    fn set_outputs(&mut self, pattern: OutputPattern) {
        drive(Channel::Red, &mut self.red, pattern.red);
        drive(Channel::Yellow, &mut self.yellow, pattern.yellow);
        drive(Channel::Green, &mut self.green, pattern.green);
    }
}

fn drive<P: OutputPin>(channel: Channel, pin: &mut P, on: bool) {
    if let Err(e) = pin.set_state(PinState::from(on)) {
        warn!("gpio: {:?} lamp write failed: {:?}", channel, e.kind());
    }
}

/// Push-button input on one pin.
pub struct GpioButton<P> {
    number: u8,
    pin: P,
}

impl<P: InputPin> GpioButton<P> {
    /// `number` is the pin number the monitor will ask for.
    pub fn new(number: u8, pin: P) -> Self {
        Self { number, pin }
    }
}

impl<P: InputPin> InputPort for GpioButton<P> {
    fn read_digital(&mut self, pin: u8) -> bool {
        if pin != self.number {
            warn!("gpio: read of pin {} but button is wired to {}", pin, self.number);
            return false;
        }
        match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("gpio: button read failed: {:?}", e.kind());
                false
            }
        }
    }
}
