//! Fault reporting for trigger workers.
//!
//! Timer and monitor workers have no caller to return an error to.  When a
//! dispatch fails inside one of them the worker panics, and the hook below
//! turns that into a process-visible fault: a structured crash record on
//! the log followed by an abort.

use std::panic::PanicHookInfo;

use serde::Serialize;

/// What the panic hook reports before aborting.
#[derive(Debug, Clone, Serialize)]
pub struct CrashEntry {
    pub thread: heapless::String<32>,
    pub reason: heapless::String<128>,
    pub location: Option<heapless::String<96>>,
}

impl CrashEntry {
    pub fn new(thread: &str, reason: &str, location: Option<&str>) -> Self {
        Self {
            thread: truncated(thread),
            reason: truncated(reason),
            location: location.map(truncated),
        }
    }

    fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line()));
        let current = std::thread::current();
        Self::new(current.name().unwrap_or("<unnamed>"), reason, location.as_deref())
    }
}

/// Copy at most `N` bytes of `s`, cutting on a char boundary.
fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Install a panic hook that logs a [`CrashEntry`] and aborts.
///
/// Call once during startup, after logging is initialised.  Without it a
/// panicking worker would only kill its own thread and the lamps would
/// freeze silently.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let entry = CrashEntry::from_panic(info);
        log::error!("PANIC in '{}': {}", entry.thread, entry.reason);
        match serde_json::to_string(&entry) {
            Ok(json) => log::error!("crash entry: {}", json),
            Err(e) => log::error!("crash entry unavailable: {}", e),
        }
        std::process::abort();
    }));
}
