//! Controller configuration parameters
//!
//! All tunable parameters for the traffic light.  Defaults reproduce the
//! reference board; a JSON file named by `TRAFFIC_LIGHT_CONFIG` may override
//! any subset of fields.

use core::time::Duration;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "TRAFFIC_LIGHT_CONFIG";
/// Environment variable overriding [`ControllerConfig::variant`].
pub const VARIANT_ENV: &str = "TRAFFIC_LIGHT_VARIANT";

/// Which machine the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Red → Green → Yellow on timers only.
    #[default]
    Cycle,
    /// Idle until the button is pressed, then a timed six-phase sequence.
    Button,
}

impl Variant {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Some(Self::Cycle),
            "button" => Some(Self::Button),
            _ => None,
        }
    }
}

/// Electrical level that means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Pull-down wiring: pin reads HIGH while pressed.
    #[default]
    ActiveHigh,
    /// Pull-up wiring: pin reads LOW while pressed.
    ActiveLow,
}

impl Polarity {
    /// Translate a raw pin level into "pressed".
    pub const fn is_active(self, level: bool) -> bool {
        match self {
            Self::ActiveHigh => level,
            Self::ActiveLow => !level,
        }
    }
}

/// Per-state dwell times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Cycle variant: red phase (ms).
    pub red_ms: u64,
    /// Cycle variant: green phase (ms).
    pub green_ms: u64,
    /// Cycle variant: yellow phase (ms).
    pub yellow_ms: u64,
    /// Button variant: every timed phase (ms).
    pub phase_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            red_ms: 5000,
            green_ms: 5000,
            yellow_ms: 2000,
            phase_ms: 2000,
        }
    }
}

impl Timings {
    pub fn red(&self) -> Duration {
        Duration::from_millis(self.red_ms)
    }

    pub fn green(&self) -> Duration {
        Duration::from_millis(self.green_ms)
    }

    pub fn yellow(&self) -> Duration {
        Duration::from_millis(self.yellow_ms)
    }

    pub fn phase(&self) -> Duration {
        Duration::from_millis(self.phase_ms)
    }
}

/// Edge monitor tuning.  Poll and debounce are independent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Input pin sampled by the monitor.
    pub pin: u8,
    /// Delay between samples while armed (ms).
    pub poll_interval_ms: u64,
    /// Delay before the confirming re-sample (ms).
    pub debounce_ms: u64,
    pub polarity: Polarity,
    /// Period of the pin-level diagnostic log line (ms, 0 = off).
    pub diagnostic_interval_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            pin: pins::BUTTON_GPIO,
            poll_interval_ms: 100,
            debounce_ms: 50,
            polarity: Polarity::ActiveHigh,
            diagnostic_interval_ms: 1000,
        }
    }
}

impl MonitorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn diagnostic_interval(&self) -> Option<Duration> {
        (self.diagnostic_interval_ms > 0).then(|| Duration::from_millis(self.diagnostic_interval_ms))
    }
}

/// Lamp output pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampPins {
    pub red: u8,
    pub yellow: u8,
    pub green: u8,
}

impl Default for LampPins {
    fn default() -> Self {
        Self {
            red: pins::RED_GPIO,
            yellow: pins::YELLOW_GPIO,
            green: pins::GREEN_GPIO,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub variant: Variant,
    pub timings: Timings,
    pub monitor: MonitorSettings,
    pub pins: LampPins,
}

impl ControllerConfig {
    /// Reject values that would make the controller spin or never fire.
    pub fn validate(&self) -> Result<()> {
        let t = &self.timings;
        if t.red_ms == 0 || t.green_ms == 0 || t.yellow_ms == 0 || t.phase_ms == 0 {
            return Err(Error::InvalidConfig("phase durations must be non-zero"));
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("poll interval must be non-zero"));
        }
        if self.monitor.debounce_ms == 0 {
            return Err(Error::InvalidConfig("debounce window must be non-zero"));
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Defaults, then [`CONFIG_ENV`] file, then [`VARIANT_ENV`] override.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Ok(raw) = std::env::var(VARIANT_ENV) {
            config.variant = Variant::parse(&raw)
                .ok_or_else(|| anyhow::anyhow!("{VARIANT_ENV}: unknown variant '{raw}'"))?;
        }
        config.validate()?;
        Ok(config)
    }
}
