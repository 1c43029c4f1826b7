//! Polled, debounced push-button edge monitor.
//!
//! ## Detection
//!
//! The monitor samples the input pin every poll interval.  A reading that
//! looks pressed starts a confirmation: wait the debounce window, sample
//! again, and only if the pin still reads pressed is the press confirmed.
//! A confirmed press fires the callback exactly once and the monitor stops
//! itself; a new monitor is started for the next wait.
//!
//! | State      | Sample            | Next        | Then sleep        |
//! |------------|-------------------|-------------|-------------------|
//! | Armed      | inactive          | Armed       | poll interval     |
//! | Armed      | active            | Confirming  | debounce window   |
//! | Confirming | active            | Confirmed   | (fire)            |
//! | Confirming | inactive (noise)  | Armed       | poll interval     |
//!
//! `stop()` moves any state to `Stopped`; a stopped monitor samples nothing
//! and fires nothing.  The worker moves to `Stopped` under the same lock
//! `stop()` uses *before* invoking the callback, so a concurrent stop can
//! never race a second fire.
//!
//! Pin-level diagnostics are logged from the same poll loop; nothing else
//! samples the pin.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::app::ports::SharedInput;
use crate::config::{MonitorSettings, Polarity};
use crate::drivers::worker::{lock, spawn_worker, wait_timeout};
use crate::error::Result;

/// Lifecycle of one monitor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Armed,
    Confirming,
    Confirmed,
    Stopped,
}

/// What the poll loop should do after a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// Sleep, then sample again.
    Sleep(Duration),
    /// Press confirmed; fire the callback.
    Fire,
    /// Monitor is finished; exit the loop.
    Stopped,
}

/// Pure debounce state machine.  Time is supplied by the caller through the
/// returned sleep durations, so it can be driven by a virtual clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    state: MonitorState,
    poll_interval: Duration,
    debounce: Duration,
    polarity: Polarity,
}

impl Debouncer {
    pub fn new(settings: &MonitorSettings) -> Self {
        Self {
            state: MonitorState::Idle,
            poll_interval: settings.poll_interval(),
            debounce: settings.debounce(),
            polarity: settings.polarity,
        }
    }

    /// Start watching.  Only valid from `Idle`.
    pub fn arm(&mut self) {
        if self.state == MonitorState::Idle {
            self.state = MonitorState::Armed;
        }
    }

    /// Feed one raw pin sample.
    pub fn on_sample(&mut self, level: bool) -> Poll {
        let active = self.polarity.is_active(level);

        match self.state {
            MonitorState::Idle => Poll::Sleep(self.poll_interval),

            MonitorState::Armed => {
                if active {
                    self.state = MonitorState::Confirming;
                    Poll::Sleep(self.debounce)
                } else {
                    Poll::Sleep(self.poll_interval)
                }
            }

            MonitorState::Confirming => {
                if active {
                    self.state = MonitorState::Confirmed;
                    Poll::Fire
                } else {
                    debug!("button: rejected noise (released within debounce window)");
                    self.state = MonitorState::Armed;
                    Poll::Sleep(self.poll_interval)
                }
            }

            MonitorState::Confirmed | MonitorState::Stopped => Poll::Stopped,
        }
    }

    /// Force `Stopped` from any state.
    pub fn stop(&mut self) {
        self.state = MonitorState::Stopped;
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }
}

// ═══════════════════════════════════════════════════════════════
//  Threaded monitor
// ═══════════════════════════════════════════════════════════════

struct MonitorShared {
    debouncer: Mutex<Debouncer>,
    wake: Condvar,
}

/// One in-flight poll loop on its own worker thread.
///
/// Dropping the handle stops the monitor; the worker exits at its next
/// wake-up without joining.
pub struct EdgeMonitor {
    shared: Arc<MonitorShared>,
}

impl EdgeMonitor {
    /// Arm a new monitor that calls `on_press` once on a confirmed press.
    pub fn start(
        name: &'static str,
        input: SharedInput,
        settings: &MonitorSettings,
        on_press: impl FnOnce() + Send + 'static,
    ) -> Result<Self> {
        let mut debouncer = Debouncer::new(settings);
        debouncer.arm();

        let shared = Arc::new(MonitorShared {
            debouncer: Mutex::new(debouncer),
            wake: Condvar::new(),
        });

        let pin = settings.pin;
        let diagnostic_interval = settings.diagnostic_interval();
        let worker_shared = Arc::clone(&shared);
        spawn_worker(name, move || {
            run(&worker_shared, &input, pin, diagnostic_interval, on_press);
        })?;

        debug!("button: monitor armed on pin {}", pin);
        Ok(Self { shared })
    }

    /// Stop the monitor.  Idempotent.
    pub fn stop(&self) {
        lock(&self.shared.debouncer).stop();
        self.shared.wake.notify_all();
    }

    pub fn state(&self) -> MonitorState {
        lock(&self.shared.debouncer).state()
    }
}

impl Drop for EdgeMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    shared: &MonitorShared,
    input: &SharedInput,
    pin: u8,
    diagnostic_interval: Option<Duration>,
    on_press: impl FnOnce(),
) {
    let mut last_report: Option<Instant> = None;

    loop {
        let level = lock(input).read_digital(pin);

        let report_due = diagnostic_interval
            .is_some_and(|every| last_report.is_none_or(|t| t.elapsed() >= every));
        if report_due {
            debug!(
                "button: pin {} reads {}",
                pin,
                if level { "HIGH" } else { "LOW" }
            );
            last_report = Some(Instant::now());
        }

        let mut debouncer = lock(&shared.debouncer);
        match debouncer.on_sample(level) {
            Poll::Fire => {
                debouncer.stop();
                drop(debouncer);
                info!("button: press confirmed on pin {}", pin);
                on_press();
                return;
            }
            Poll::Stopped => return,
            Poll::Sleep(delay) => {
                let deadline = Instant::now() + delay;
                loop {
                    if debouncer.state() == MonitorState::Stopped {
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    debouncer = wait_timeout(&shared.wake, debouncer, deadline - now);
                }
            }
        }
    }
}
