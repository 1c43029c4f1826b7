//! State controller: the hexagonal core.
//!
//! [`Controller`] owns the current state, the one live trigger, and the
//! output port.  All of them sit behind a single mutex, so dispatches from
//! the timer worker, a monitor worker, and the public API are serialised.
//!
//! ```text
//!   DeadlineTimer ──┐                  ┌──▶ OutputPort
//!                   ├──▶ ┌──────────┐ ─┤
//!   EdgeMonitor  ───┘    │   Core   │  └──▶ EventSink
//!   dispatch()  ────────▶└──────────┘
//! ```
//!
//! ## Stale triggers
//!
//! Every state entry bumps `Core::generation`.  Each trigger callback
//! captures the generation it was armed under and re-checks it after taking
//! the core lock, immediately before mutating anything.  `stop()` bumps the
//! generation under the same lock, so once it returns no callback can
//! dispatch, even one that was already running.
//!
//! ## Lock order
//!
//! Core lock first, then the timer slot or monitor lock.  Neither worker
//! holds its own lock while calling back into the controller.

use std::sync::{Arc, Mutex, Weak};

use log::{debug, error, info, trace};

use crate::app::events::{ArmedTrigger, ControllerEvent};
use crate::app::ports::{EventSink, NullSink, OutputPort, SharedInput};
use crate::config::MonitorSettings;
use crate::drivers::button::EdgeMonitor;
use crate::drivers::worker::lock;
use crate::error::{Error, Result};
use crate::fsm::{Event, StateDescriptor, StateSet, StateTable, Trigger};
use crate::timer::{DeadlineTimer, TimerHandle};

const TIMER_THREAD: &str = "tl-timer";
const MONITOR_THREAD: &str = "tl-button";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Constructed,
    Running,
    Stopped,
}

/// The single live trigger of the current state.
enum Armed {
    Nothing,
    Timer(TimerHandle),
    Monitor(EdgeMonitor),
}

struct Core<S> {
    current: S,
    generation: u64,
    lifecycle: Lifecycle,
    armed: Armed,
    output: Box<dyn OutputPort + Send>,
    sink: Box<dyn EventSink + Send>,
}

struct Shared<S> {
    table: StateTable<S>,
    core: Mutex<Core<S>>,
    timer: DeadlineTimer,
    input: Option<SharedInput>,
    monitor: MonitorSettings,
}

// ───────────────────────────────────────────────────────────────
// Builder
// ───────────────────────────────────────────────────────────────

/// Wires a [`StateTable`] to its ports.
pub struct ControllerBuilder<S> {
    table: StateTable<S>,
    output: Box<dyn OutputPort + Send>,
    input: Option<SharedInput>,
    sink: Box<dyn EventSink + Send>,
    monitor: MonitorSettings,
}

impl<S: StateSet> ControllerBuilder<S> {
    pub fn new(table: StateTable<S>, output: impl OutputPort + Send + 'static) -> Self {
        Self {
            table,
            output: Box::new(output),
            input: None,
            sink: Box::new(NullSink),
            monitor: MonitorSettings::default(),
        }
    }

    /// Input sampled by button-triggered states.
    pub fn input(mut self, input: SharedInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn sink(mut self, sink: impl EventSink + Send + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn monitor(mut self, settings: MonitorSettings) -> Self {
        self.monitor = settings;
        self
    }

    /// Validate the wiring and spawn the timer worker.  No state is
    /// entered and no output is written until [`Controller::start`].
    pub fn build(self) -> Result<Controller<S>> {
        if self.table.needs_input() && self.input.is_none() {
            error!("controller: table waits on a button but no input port was given");
            return Err(Error::MissingInput);
        }

        let timer = DeadlineTimer::new(TIMER_THREAD)?;
        let current = self.table.initial();

        Ok(Controller {
            shared: Arc::new(Shared {
                table: self.table,
                core: Mutex::new(Core {
                    current,
                    generation: 0,
                    lifecycle: Lifecycle::Constructed,
                    armed: Armed::Nothing,
                    output: self.output,
                    sink: self.sink,
                }),
                timer,
                input: self.input,
                monitor: self.monitor,
            }),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Table-driven state controller.  Clones share the same machine.
pub struct Controller<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for Controller<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: StateSet> Controller<S> {
    /// Enter the initial state: apply its pattern, then arm its trigger.
    ///
    /// Only the first call succeeds; later calls (including after `stop`)
    /// return [`Error::AlreadyStarted`].
    pub fn start(&self) -> Result<()> {
        let mut core = lock(&self.shared.core);
        if core.lifecycle != Lifecycle::Constructed {
            return Err(Error::AlreadyStarted);
        }
        core.lifecycle = Lifecycle::Running;

        let initial = self.shared.table.initial();
        info!("controller: starting in {}", initial.name());
        core.sink.emit(&ControllerEvent::Started {
            state: initial.name(),
        });
        self.shared.enter(&mut core, None, initial)
    }

    /// Deliver `event` to the current state.
    ///
    /// On [`Error::UnhandledEvent`] the state and outputs are unchanged.
    pub fn dispatch(&self, event: Event) -> Result<()> {
        let mut core = lock(&self.shared.core);
        if core.lifecycle != Lifecycle::Running {
            return Err(Error::NotRunning);
        }
        self.shared.step(&mut core, event)
    }

    /// Cancel the live trigger and freeze the machine.  Outputs keep their
    /// last pattern.  Idempotent.
    pub fn stop(&self) {
        let mut core = lock(&self.shared.core);
        if core.lifecycle == Lifecycle::Stopped {
            return;
        }
        core.lifecycle = Lifecycle::Stopped;
        core.generation += 1;
        self.shared.disarm(&mut core);

        let state = core.current.name();
        info!("controller: stopped in {}", state);
        core.sink.emit(&ControllerEvent::Stopped { state });
    }

    /// `stop()` followed by releasing the output port.
    pub fn shutdown(&self) {
        self.stop();
        lock(&self.shared.core).output.release();
        info!("controller: outputs released");
    }

    pub fn current_state(&self) -> S {
        lock(&self.shared.core).current
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.core).lifecycle == Lifecycle::Running
    }

    pub fn table(&self) -> &StateTable<S> {
        &self.shared.table
    }
}

impl<S: StateSet> Shared<S> {
    /// Look up and take one transition.  Caller holds the core lock and has
    /// checked the lifecycle.
    fn step(self: &Arc<Self>, core: &mut Core<S>, event: Event) -> Result<()> {
        let from = core.current;
        let to = self.table.next(from, event)?;
        debug!("controller: {} --{}--> {}", from.name(), event, to.name());
        self.enter(core, Some((from, event)), to)
    }

    /// Entry actions: cancel the old trigger, apply the pattern, arm the
    /// new trigger.
    fn enter(self: &Arc<Self>, core: &mut Core<S>, cause: Option<(S, Event)>, to: S) -> Result<()> {
        let descriptor = *self.table.entry(to)?;

        self.disarm(core);
        core.generation += 1;
        core.current = to;
        core.output.set_outputs(descriptor.pattern);

        info!("controller: entered {} {}", to.name(), descriptor.pattern);
        core.sink.emit(&ControllerEvent::Entered {
            from: cause.map(|(from, _)| from.name()),
            to: to.name(),
            event: cause.map(|(_, event)| event),
            pattern: descriptor.pattern,
        });

        self.arm(core, &descriptor)
    }

    fn arm(self: &Arc<Self>, core: &mut Core<S>, descriptor: &StateDescriptor<S>) -> Result<()> {
        let generation = core.generation;
        let weak = Arc::downgrade(self);
        let event = descriptor.trigger.event();

        let armed = match descriptor.trigger {
            Trigger::After(delay) => {
                let handle = self
                    .timer
                    .schedule(delay, move || on_trigger(&weak, generation, event));
                core.armed = Armed::Timer(handle);
                ArmedTrigger::Timer(delay)
            }
            Trigger::ButtonPress => {
                let input = self.input.clone().ok_or(Error::MissingInput)?;
                let monitor = EdgeMonitor::start(MONITOR_THREAD, input, &self.monitor, move || {
                    on_trigger(&weak, generation, event);
                })?;
                core.armed = Armed::Monitor(monitor);
                ArmedTrigger::Button {
                    pin: self.monitor.pin,
                }
            }
        };

        debug!(
            "controller: {} armed {:?} (gen {})",
            descriptor.id.name(),
            armed,
            generation
        );
        core.sink.emit(&ControllerEvent::TriggerArmed {
            state: descriptor.id.name(),
            trigger: armed,
        });
        Ok(())
    }

    fn disarm(&self, core: &mut Core<S>) {
        match std::mem::replace(&mut core.armed, Armed::Nothing) {
            Armed::Nothing => {}
            Armed::Timer(handle) => {
                self.timer.cancel(handle);
            }
            Armed::Monitor(monitor) => monitor.stop(),
        }
    }
}

/// Body of every timer and monitor callback.
///
/// A failed dispatch here has no caller to return to, so it panics; with
/// the diagnostics panic hook installed that aborts the process.
fn on_trigger<S: StateSet>(shared: &Weak<Shared<S>>, generation: u64, event: Event) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut core = lock(&shared.core);

    if core.lifecycle != Lifecycle::Running || core.generation != generation {
        trace!(
            "controller: suppressed stale {} (gen {}, current {})",
            event, generation, core.generation
        );
        return;
    }

    if let Err(e) = shared.step(&mut core, event) {
        error!("controller: trigger dispatch failed: {}", e);
        drop(core);
        panic!("trigger dispatch failed: {e}");
    }
}
