//! Application core: the controller and the ports it talks through.
//!
//! The controller owns no hardware.  Lamps, the button, and event output
//! are reached through the **port traits** in [`ports`], so the whole core
//! runs against mocks in tests.

pub mod controller;
pub mod events;
pub mod ports;
