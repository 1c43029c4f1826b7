//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real hardware
//! required; timer-driven tests use millisecond timings.

mod button_flow_tests;
mod controller_tests;
mod monitor_tests;
