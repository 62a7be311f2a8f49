mod color;
mod loader;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hide::DEFAULT_HIDE_TICKS;
use crate::log::LogConfig;

pub use color::Color;
pub use loader::{config_dir, config_path, load, try_load};

/// Top-level configuration for Backdrop.
///
/// Loaded from `~/.config/backdrop/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sync loop timing and taskbar hiding.
    pub sync: SyncConfig,
    /// Host window appearance.
    pub host: HostConfig,
    /// File logging.
    pub logging: LogConfig,
}

/// Timing of the supervision loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between sync ticks.
    pub interval_secs: u64,
    /// Number of ticks that re-apply the tool-window style.
    pub hide_ticks: u32,
    /// Delay after launch before the first tick, giving the child time
    /// to create its window.
    pub startup_delay_ms: u64,
}

/// Host window appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Background colour, also used as the transparency key
    /// (e.g. "#D2B48C").
    pub background: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            hide_ticks: DEFAULT_HIDE_TICKS,
            startup_delay_ms: 100,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            background: Color::TAN.to_hex(),
        }
    }
}

impl HostConfig {
    /// The parsed background colour, Tan if the string is not valid hex.
    pub fn background_color(&self) -> Color {
        Color::from_hex(&self.background).unwrap_or(Color::TAN)
    }
}

impl Config {
    /// Clamps values to safe ranges.
    ///
    /// A zero interval would spin the sync thread, and an invalid
    /// colour is replaced so the host always has a transparency key.
    pub fn validate(&mut self) {
        self.sync.interval_secs = self.sync.interval_secs.clamp(1, 3600);
        self.sync.hide_ticks = self.sync.hide_ticks.min(100);
        self.sync.startup_delay_ms = self.sync.startup_delay_ms.min(10_000);
        if Color::from_hex(&self.host.background).is_none() {
            self.host.background = Color::TAN.to_hex();
        }
    }
}
