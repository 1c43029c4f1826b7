//! Pin drivers, the button monitor, and worker-thread helpers.

pub mod button;
pub mod gpio;
pub mod worker;
