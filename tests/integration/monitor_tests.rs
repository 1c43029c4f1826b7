//! Edge monitor against a scripted button, in real time.
//!
//! Uses the reference 100ms poll / 50ms debounce.  The level is set before
//! the monitor starts so its first sample lands inside the press.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use traffic_light::config::MonitorSettings;
use traffic_light::drivers::button::{EdgeMonitor, MonitorState};

use crate::mock_hw::{MockButton, wait_until};

fn reference() -> MonitorSettings {
    MonitorSettings {
        diagnostic_interval_ms: 0,
        ..MonitorSettings::default()
    }
}

fn start(name: &'static str, button: &MockButton) -> (EdgeMonitor, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let monitor = EdgeMonitor::start(name, button.port(), &reference(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    (monitor, fired)
}

#[test]
fn ten_ms_glitch_is_ignored() {
    let button = MockButton::new();
    button.press_for(Duration::from_millis(10));
    let (monitor, fired) = start("mon-glitch", &button);

    std::thread::sleep(Duration::from_millis(400));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.state(), MonitorState::Armed);
    monitor.stop();
}

#[test]
fn eighty_ms_press_fires_once() {
    let button = MockButton::new();
    button.press_for(Duration::from_millis(80));
    let (monitor, fired) = start("mon-press", &button);

    assert!(wait_until(Duration::from_secs(2), || fired.load(Ordering::SeqCst) == 1));
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.state(), MonitorState::Stopped);
}

#[test]
fn stuck_button_fires_once_and_stops_sampling() {
    let button = MockButton::new();
    button.hold();
    let (monitor, fired) = start("mon-stuck", &button);

    assert!(wait_until(Duration::from_secs(2), || fired.load(Ordering::SeqCst) == 1));
    let reads = button.reads();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(button.reads(), reads);
    drop(monitor);
}

#[test]
fn stop_interrupts_the_poll_sleep() {
    let button = MockButton::new();
    let (monitor, fired) = start("mon-stop", &button);

    monitor.stop();
    button.hold();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(button.reads() <= 2);
    assert_eq!(monitor.state(), MonitorState::Stopped);
}

#[test]
fn dropping_the_handle_stops_the_monitor() {
    let button = MockButton::new();
    let (monitor, fired) = start("mon-drop", &button);
    drop(monitor);

    button.hold();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
