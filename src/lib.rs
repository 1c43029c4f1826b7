//! Traffic light controller library.
//!
//! A table-driven state machine that drives three lamps from per-state
//! timers or a debounced push button.  Everything hardware-specific sits
//! behind the port traits in [`app::ports`], so the full controller runs
//! on a host for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod timer;

pub use app::controller::{Controller, ControllerBuilder};
pub use error::{Error, Result};
