//! Named worker-thread spawning for trigger workers.
//!
//! Deadline timers and edge monitors each run on their own small OS thread
//! so their waits never block the controller's public calls.  Threads are
//! named after their role so panics and logs identify the trigger.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{Builder, JoinHandle};
use std::time::Duration;

use crate::error::{Error, Result};

/// Stack size for trigger workers.  They only sleep, sample a pin, and
/// run one dispatch.
pub const WORKER_STACK_KB: usize = 64;

/// Spawn a named worker thread.
pub fn spawn_worker(
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    log::debug!("Spawning worker '{}' (stack={}KB)", name, WORKER_STACK_KB);

    Builder::new()
        .name(name.into())
        .stack_size(WORKER_STACK_KB * 1024)
        .spawn(f)
        .map_err(|e| {
            log::error!("worker '{}' spawn failed: {}", name, e);
            Error::WorkerSpawn(name)
        })
}

// ── Poison-tolerant locking ───────────────────────────────────
//
// A panicking trigger worker aborts the process in production (see
// `diagnostics`).  In tests the remaining threads keep using the data.

pub fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn wait<'a, T>(cv: &Condvar, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    cv.wait(guard).unwrap_or_else(PoisonError::into_inner)
}

pub fn wait_timeout<'a, T>(
    cv: &Condvar,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
) -> MutexGuard<'a, T> {
    cv.wait_timeout(guard, timeout)
        .unwrap_or_else(PoisonError::into_inner)
        .0
}
