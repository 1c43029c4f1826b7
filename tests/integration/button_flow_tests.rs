//! Integration tests for the six-state button-requested cycle.
//!
//! The button is a scripted mock sampled by the real edge monitor, so these
//! tests exercise the monitor → controller hand-off end to end.

use std::time::Duration;

use traffic_light::app::events::{ArmedTrigger, ControllerEvent};
use traffic_light::config::Timings;
use traffic_light::fsm::Event;
use traffic_light::fsm::pattern::OutputPattern;
use traffic_light::fsm::states::{ButtonState, build_button_table};
use traffic_light::{Controller, ControllerBuilder, Error};

use crate::mock_hw::{
    MockButton, MockLamps, RecordingSink, fast_monitor, fast_timings, frozen_timings, wait_until,
};

fn make_controller(timings: &Timings) -> (Controller<ButtonState>, MockLamps, MockButton, RecordingSink) {
    let lamps = MockLamps::new();
    let button = MockButton::new();
    let sink = RecordingSink::new();
    let controller = ControllerBuilder::new(build_button_table(timings).unwrap(), lamps.clone())
        .input(button.port())
        .monitor(fast_monitor())
        .sink(sink.clone())
        .build()
        .unwrap();
    (controller, lamps, button, sink)
}

#[test]
fn idle_lights_everything_and_arms_the_button() {
    let (ctl, lamps, _, sink) = make_controller(&frozen_timings());
    ctl.start().unwrap();

    assert_eq!(ctl.current_state(), ButtonState::Idle);
    assert_eq!(lamps.last_pattern(), Some(OutputPattern::ALL_ON));
    assert!(sink.events().iter().any(|e| matches!(
        e,
        ControllerEvent::TriggerArmed {
            state: "Idle",
            trigger: ArmedTrigger::Button { pin: 25 }
        }
    )));
    ctl.stop();
}

#[test]
fn press_then_five_timer_events_returns_to_idle() {
    let (ctl, lamps, button, _) = make_controller(&frozen_timings());
    ctl.start().unwrap();

    button.press_for(Duration::from_millis(100));
    assert!(wait_until(Duration::from_secs(2), || ctl.current_state() == ButtonState::Red1));
    // Released before Idle re-arms, so the return to Idle is not re-triggered.
    button.release();

    for _ in 0..5 {
        ctl.dispatch(Event::TimerElapsed).unwrap();
    }
    assert_eq!(ctl.current_state(), ButtonState::Idle);
    assert_eq!(
        lamps.patterns(),
        vec![
            OutputPattern::ALL_ON,
            OutputPattern::RED,
            OutputPattern::RED_YELLOW,
            OutputPattern::GREEN,
            OutputPattern::YELLOW,
            OutputPattern::RED,
            OutputPattern::ALL_ON,
        ]
    );
    ctl.stop();
}

#[test]
fn full_cycle_runs_from_a_single_press() {
    let (ctl, _, button, sink) = make_controller(&fast_timings(15));
    ctl.start().unwrap();
    button.press_for(Duration::from_millis(40));

    assert!(wait_until(Duration::from_secs(3), || sink.entered().len() >= 7));
    ctl.stop();
    assert_eq!(
        &sink.entered()[..7],
        &["Idle", "Red1", "RedYellow", "Green", "Yellow", "Red2", "Idle"]
    );
}

#[test]
fn one_press_requests_one_cycle() {
    let (ctl, _, button, sink) = make_controller(&fast_timings(15));
    ctl.start().unwrap();
    button.press_for(Duration::from_millis(40));

    assert!(wait_until(Duration::from_secs(3), || sink.entered().len() >= 7));
    // Back in Idle with the button released: no second cycle.
    std::thread::sleep(Duration::from_millis(200));
    ctl.stop();
    assert_eq!(sink.entered().len(), 7);
    assert_eq!(ctl.current_state(), ButtonState::Idle);
}

#[test]
fn glitch_does_not_leave_idle() {
    let monitor = traffic_light::config::MonitorSettings {
        poll_interval_ms: 10,
        debounce_ms: 50,
        diagnostic_interval_ms: 0,
        ..Default::default()
    };
    let lamps = MockLamps::new();
    let button = MockButton::new();
    let ctl = ControllerBuilder::new(build_button_table(&frozen_timings()).unwrap(), lamps.clone())
        .input(button.port())
        .monitor(monitor)
        .build()
        .unwrap();
    ctl.start().unwrap();

    button.press_for(Duration::from_millis(5));
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(ctl.current_state(), ButtonState::Idle);
    assert!(button.reads() > 1);
    ctl.stop();
}

#[test]
fn stop_in_idle_disarms_the_button() {
    let (ctl, lamps, button, _) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    ctl.stop();

    button.hold();
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(ctl.current_state(), ButtonState::Idle);
    assert_eq!(lamps.patterns(), vec![OutputPattern::ALL_ON]);
}

#[test]
fn manual_press_dispatch_replaces_monitor() {
    let (ctl, _, button, sink) = make_controller(&frozen_timings());
    ctl.start().unwrap();
    ctl.dispatch(Event::ButtonPressed).unwrap();
    assert_eq!(ctl.current_state(), ButtonState::Red1);

    // The Idle monitor was stopped by the transition; a press now is not
    // a second ButtonPressed, which Red1 would reject.
    button.hold();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(ctl.current_state(), ButtonState::Red1);
    assert_eq!(sink.entered(), vec!["Idle", "Red1"]);
    assert_eq!(
        ctl.dispatch(Event::ButtonPressed),
        Err(Error::UnhandledEvent {
            state: "Red1",
            event: Event::ButtonPressed
        })
    );
    ctl.stop();
}

#[test]
fn button_variant_without_input_is_rejected() {
    let result = ControllerBuilder::new(build_button_table(&frozen_timings()).unwrap(), MockLamps::new()).build();
    assert!(matches!(result, Err(Error::MissingInput)));
}
