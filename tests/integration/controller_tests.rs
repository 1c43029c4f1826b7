//! Integration tests for the three-state timed cycle.
//!
//! Verifies the controller against mock lamps: cycle closure, trigger
//! supersession, stop semantics, and the unhandled-event path.

use std::time::Duration;

use traffic_light::app::events::{ArmedTrigger, ControllerEvent};
use traffic_light::fsm::Event;
use traffic_light::fsm::pattern::OutputPattern;
use traffic_light::fsm::states::{CycleState, build_cycle_table};
use traffic_light::config::Timings;
use traffic_light::{Controller, ControllerBuilder, Error};

use crate::mock_hw::{LampCall, MockLamps, RecordingSink, fast_timings, frozen_timings, wait_until};

fn make_controller(timings: &Timings) -> (Controller<CycleState>, MockLamps, RecordingSink) {
    let lamps = MockLamps::new();
    let sink = RecordingSink::new();
    let controller = ControllerBuilder::new(build_cycle_table(timings).unwrap(), lamps.clone())
        .sink(sink.clone())
        .build()
        .unwrap();
    (controller, lamps, sink)
}

// ── Cycle closure ─────────────────────────────────────────────

#[test]
fn injected_timer_events_close_the_cycle() {
    let (ctl, lamps, _) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::new(true, false, false)));

    ctl.dispatch(Event::TimerElapsed).unwrap();
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::new(false, false, true)));

    ctl.dispatch(Event::TimerElapsed).unwrap();
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::new(false, true, false)));

    ctl.dispatch(Event::TimerElapsed).unwrap();
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::new(true, false, false)));
    assert_eq!(ctl.current_state(), CycleState::Red);
    assert_eq!(lamps.patterns().len(), 4);
}

#[test]
fn timers_run_the_cycle_unattended() {
    let (ctl, _, sink) = make_controller(&fast_timings(15));
    ctl.start().unwrap();

    assert!(wait_until(Duration::from_secs(2), || sink.entered().len() >= 7));
    ctl.stop();

    let entered = sink.entered();
    assert_eq!(
        &entered[..7],
        &["Red", "Green", "Yellow", "Red", "Green", "Yellow", "Red"]
    );
}

#[test]
fn every_entry_arms_exactly_one_trigger() {
    let (ctl, _, sink) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    ctl.dispatch(Event::TimerElapsed).unwrap();
    ctl.dispatch(Event::TimerElapsed).unwrap();

    let events = sink.events();
    let entries = events
        .iter()
        .filter(|e| matches!(e, ControllerEvent::Entered { .. }))
        .count();
    let arms: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::TriggerArmed { trigger, .. } => Some(*trigger),
            _ => None,
        })
        .collect();
    assert_eq!(entries, 3);
    assert_eq!(arms.len(), 3);
    assert!(arms.iter().all(|t| matches!(t, ArmedTrigger::Timer(_))));
}

// ── Errors ────────────────────────────────────────────────────

#[test]
fn button_press_in_green_is_unhandled() {
    let (ctl, lamps, _) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    ctl.dispatch(Event::TimerElapsed).unwrap();
    assert_eq!(ctl.current_state(), CycleState::Green);

    let err = ctl.dispatch(Event::ButtonPressed).unwrap_err();
    assert!(matches!(err, Error::UnhandledEvent { state: "Green", .. }));
    assert_eq!(err.to_string(), "unhandled event ButtonPressed in state Green");
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::GREEN));
}

#[test]
fn starting_twice_fails() {
    let (ctl, lamps, _) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    assert_eq!(ctl.start(), Err(Error::AlreadyStarted));
    assert_eq!(lamps.patterns().len(), 1);
}

#[test]
fn clones_share_one_machine() {
    let (ctl, _, _) = make_controller(&frozen_timings());
    let other = ctl.clone();
    ctl.start().unwrap();
    other.dispatch(Event::TimerElapsed).unwrap();
    assert_eq!(ctl.current_state(), CycleState::Green);
    assert_eq!(other.start(), Err(Error::AlreadyStarted));
}

// ── Stop / shutdown ───────────────────────────────────────────

#[test]
fn stop_twice_emits_one_stop() {
    let (ctl, lamps, sink) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    ctl.stop();
    ctl.stop();

    let stops = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, ControllerEvent::Stopped { .. }))
        .count();
    assert_eq!(stops, 1);
    assert!(!lamps.released());
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::RED));
}

#[test]
fn nothing_fires_after_stop_returns() {
    let (ctl, lamps, _) = make_controller(&fast_timings(3));
    ctl.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    ctl.stop();

    let frozen = lamps.calls().len();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(lamps.calls().len(), frozen);
    assert_eq!(ctl.dispatch(Event::TimerElapsed), Err(Error::NotRunning));
}

#[test]
fn shutdown_stops_then_releases() {
    let (ctl, lamps, _) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    ctl.shutdown();

    assert_eq!(
        lamps.calls(),
        vec![LampCall::Set(OutputPattern::RED), LampCall::Release]
    );
    assert!(!ctl.is_running());
}

#[test]
fn superseded_timer_never_dispatches() {
    let timings = Timings {
        red_ms: 40,
        ..frozen_timings()
    };
    let (ctl, _, sink) = make_controller(&timings);
    ctl.start().unwrap();
    // Leave Red by hand before its timer expires; the Red timer must not
    // later push Green on to Yellow.
    ctl.dispatch(Event::TimerElapsed).unwrap();
    std::thread::sleep(Duration::from_millis(150));

    assert_eq!(ctl.current_state(), CycleState::Green);
    assert_eq!(sink.entered(), vec!["Red", "Green"]);
}
