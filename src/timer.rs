//! Cancellable single-shot deadline timer.
//!
//! One reusable worker thread per [`DeadlineTimer`], holding at most one
//! pending callback.  Every [`schedule`](DeadlineTimer::schedule) replaces
//! the pending slot and stamps it with a fresh generation, so a superseded
//! callback is simply dropped and can never run.
//!
//! ```text
//!   schedule(d, f) ──▶ ┌───────────────────────────┐
//!   cancel(handle) ──▶ │ Slot { generation,        │ ◀── worker: wait until
//!                      │        pending: Option }  │     deadline, take(), fire
//!                      └───────────────────────────┘
//! ```
//!
//! Fire-before-cancel wins: once the worker has taken the callback out of
//! the slot (under the lock) a later `cancel` has no effect.  Callers that
//! need "no effect after cancel returns" re-check their own generation under
//! their own lock inside the callback, as the controller does.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::trace;

use crate::drivers::worker::{lock, spawn_worker, wait, wait_timeout};
use crate::error::Result;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Identity of one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    generation: u64,
}

impl TimerHandle {
    /// Monotonic token; later schedules carry larger values.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Pending {
    generation: u64,
    deadline: Instant,
    on_fire: Callback,
}

struct Slot {
    generation: u64,
    pending: Option<Pending>,
    shutdown: bool,
}

struct TimerShared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

/// Single-slot deadline timer backed by one worker thread.
pub struct DeadlineTimer {
    name: &'static str,
    shared: Arc<TimerShared>,
    worker: Option<JoinHandle<()>>,
}

impl DeadlineTimer {
    /// Create the timer and start its (idle) worker.
    pub fn new(name: &'static str) -> Result<Self> {
        let shared = Arc::new(TimerShared {
            slot: Mutex::new(Slot {
                generation: 0,
                pending: None,
                shutdown: false,
            }),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = spawn_worker(name, move || run(&worker_shared))?;
        Ok(Self {
            name,
            shared,
            worker: Some(worker),
        })
    }

    /// Arm `on_fire` to run once after `delay`, superseding any pending
    /// callback.
    pub fn schedule(&self, delay: Duration, on_fire: impl FnOnce() + Send + 'static) -> TimerHandle {
        let mut slot = lock(&self.shared.slot);
        slot.generation += 1;
        let generation = slot.generation;
        if let Some(prev) = slot.pending.take() {
            trace!("{}: gen {} superseded by gen {}", self.name, prev.generation, generation);
        }
        slot.pending = Some(Pending {
            generation,
            deadline: Instant::now() + delay,
            on_fire: Box::new(on_fire),
        });
        self.shared.wake.notify_one();
        TimerHandle { generation }
    }

    /// Drop the callback for `handle` if it has not started firing.
    ///
    /// Returns `true` if a pending callback was suppressed.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        let mut slot = lock(&self.shared.slot);
        let live = matches!(&slot.pending, Some(p) if p.generation == handle.generation);
        if live {
            slot.pending = None;
            self.shared.wake.notify_one();
            trace!("{}: gen {} cancelled", self.name, handle.generation);
        }
        live
    }

    /// True while `handle` is still waiting for its deadline.
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        matches!(&lock(&self.shared.slot).pending, Some(p) if p.generation == handle.generation)
    }

    /// The currently pending handle, if any.
    pub fn pending(&self) -> Option<TimerHandle> {
        lock(&self.shared.slot)
            .pending
            .as_ref()
            .map(|p| TimerHandle {
                generation: p.generation,
            })
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        {
            let mut slot = lock(&self.shared.slot);
            slot.shutdown = true;
            slot.pending = None;
        }
        self.shared.wake.notify_all();

        if let Some(worker) = self.worker.take() {
            // The last owner can be a callback running on the worker itself.
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}

fn run(shared: &TimerShared) {
    let mut slot = lock(&shared.slot);
    loop {
        if slot.shutdown {
            return;
        }

        let Some(deadline) = slot.pending.as_ref().map(|p| p.deadline) else {
            slot = wait(&shared.wake, slot);
            continue;
        };

        let now = Instant::now();
        if now < deadline {
            slot = wait_timeout(&shared.wake, slot, deadline - now);
            continue;
        }

        if let Some(fired) = slot.pending.take() {
            drop(slot);
            trace!("timer gen {} fired", fired.generation);
            (fired.on_fire)();
            slot = lock(&shared.slot);
        }
    }
}
