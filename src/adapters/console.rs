//! Host-side stand-ins for the lamp head and push button.
//!
//! Used by the binary when no GPIO HAL is wired in: lamps are rendered to
//! the log and the button is pressed by hitting Enter on stdin.

use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{debug, info};

use crate::app::ports::{InputPort, OutputPort};
use crate::config::{LampPins, MonitorSettings, Polarity};
use crate::drivers::worker::{lock, spawn_worker};
use crate::error::Result;
use crate::fsm::pattern::OutputPattern;

/// Lamp head that logs each pattern it is asked to show.
#[derive(Debug)]
pub struct ConsoleLamps {
    pins: LampPins,
    shown: Option<OutputPattern>,
}

impl ConsoleLamps {
    pub fn new(pins: LampPins) -> Self {
        Self { pins, shown: None }
    }
}

impl OutputPort for ConsoleLamps {
    fn set_outputs(&mut self, pattern: OutputPattern) {
        info!(
            "LAMPS | {} (R:gpio{}={} Y:gpio{}={} G:gpio{}={})",
            pattern,
            self.pins.red,
            u8::from(pattern.red),
            self.pins.yellow,
            u8::from(pattern.yellow),
            self.pins.green,
            u8::from(pattern.green),
        );
        self.shown = Some(pattern);
    }

    fn release(&mut self) {
        self.set_outputs(OutputPattern::OFF);
        info!("LAMPS | released");
    }
}

/// Push button driven by Enter on stdin.
///
/// Each line holds the simulated contact closed long enough for the monitor
/// to see and confirm it.  The raw level honours the configured polarity, so
/// an active-low setup reads LOW while "pressed".
pub struct KeyboardButton {
    pin: u8,
    polarity: Polarity,
    held_until: Arc<Mutex<Option<Instant>>>,
}

impl KeyboardButton {
    /// Spawn the stdin reader.
    pub fn spawn(settings: &MonitorSettings) -> Result<Self> {
        let hold = settings.poll_interval() + settings.debounce() * 2;
        let held_until = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&held_until);

        spawn_worker("tl-stdin", move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                debug!("console: button held for {}ms", hold.as_millis());
                *lock(&writer) = Some(Instant::now() + hold);
            }
        })?;

        info!("console: press Enter to request a cycle");
        Ok(Self {
            pin: settings.pin,
            polarity: settings.polarity,
            held_until,
        })
    }

    #[cfg(test)]
    fn detached(pin: u8, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            held_until: Arc::new(Mutex::new(None)),
        }
    }

    #[cfg(test)]
    fn press_for(&self, hold: std::time::Duration) {
        *lock(&self.held_until) = Some(Instant::now() + hold);
    }

    fn pressed(&self) -> bool {
        lock(&self.held_until).is_some_and(|until| Instant::now() < until)
    }
}

impl InputPort for KeyboardButton {
    fn read_digital(&mut self, pin: u8) -> bool {
        let pressed = pin == self.pin && self.pressed();
        match self.polarity {
            Polarity::ActiveHigh => pressed,
            Polarity::ActiveLow => !pressed,
        }
    }
}
