//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements   | Connects to                 |
//! |----------------|--------------|-----------------------------|
//! | `console`      | OutputPort   | log output (simulated lamps)|
//! |                | InputPort    | Enter key on stdin          |
//! | `log_sink`     | EventSink    | `log` facade                |
//!
//! GPIO-backed ports live in [`crate::drivers::gpio`].

pub mod console;
pub mod log_sink;
