//! Traffic light controller: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                    │
//! │  ConsoleLamps      KeyboardButton      LogEventSink       │
//! │  (OutputPort)      (InputPort)         (EventSink)        │
//! │                                                           │
//! │  ─────────────── Port Trait Boundary ──────────────────   │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │  Controller  ·  DeadlineTimer  ·  EdgeMonitor       │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs until SIGINT / SIGTERM, then stops the controller and releases the
//! lamps.  Configuration comes from `TRAFFIC_LIGHT_CONFIG` (JSON file) and
//! `TRAFFIC_LIGHT_VARIANT`; log level from `RUST_LOG`.
#![deny(unused_must_use)]

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::EnvFilter;

use traffic_light::ControllerBuilder;
use traffic_light::adapters::console::{ConsoleLamps, KeyboardButton};
use traffic_light::adapters::log_sink::LogEventSink;
use traffic_light::config::{ControllerConfig, Variant};
use traffic_light::diagnostics;
use traffic_light::fsm::states::{build_button_table, build_cycle_table};
use traffic_light::fsm::{StateSet, StateTable};

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("traffic-light v{}", env!("CARGO_PKG_VERSION"));
    diagnostics::install_panic_handler();

    // ── 2. Configuration ──────────────────────────────────────
    let config = ControllerConfig::from_env().context("loading configuration")?;
    info!(
        "variant={:?} lamps=R{}/Y{}/G{} button={} ({:?})",
        config.variant,
        config.pins.red,
        config.pins.yellow,
        config.pins.green,
        config.monitor.pin,
        config.monitor.polarity
    );

    // ── 3. Termination signal ─────────────────────────────────
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("installing SIGINT/SIGTERM handler")?;

    // ── 4. Run the selected machine ───────────────────────────
    match config.variant {
        Variant::Cycle => run(build_cycle_table(&config.timings)?, &config, &rx),
        Variant::Button => run(build_button_table(&config.timings)?, &config, &rx),
    }
}

fn run<S: StateSet>(table: StateTable<S>, config: &ControllerConfig, shutdown: &Receiver<()>) -> Result<()> {
    let needs_input = table.needs_input();
    let mut builder = ControllerBuilder::new(table, ConsoleLamps::new(config.pins))
        .sink(LogEventSink::new())
        .monitor(config.monitor);

    if needs_input {
        let button = KeyboardButton::spawn(&config.monitor).context("starting console button")?;
        builder = builder.input(Arc::new(Mutex::new(button)));
    }

    let controller = builder.build().context("wiring controller")?;
    controller.start().context("starting controller")?;

    shutdown.recv().context("signal channel closed")?;
    info!("termination requested, shutting down");
    controller.shutdown();
    Ok(())
}
