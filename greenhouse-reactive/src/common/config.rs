/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Runtime and fleet configuration.
//!
//! Loaded once from `$XDG_CONFIG_HOME/greenhouse/config.toml` into [`CONFIG`]. Every
//! section is optional; missing or malformed files fall back to the defaults.

use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::actor::{BackoffConfig, SupervisionPolicy};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Shutdown timeouts.
    pub timeouts: TimeoutConfig,
    /// Channel sizing.
    pub limits: LimitsConfig,
    /// Restart backoff used by the fleet's actors.
    pub supervision: SupervisionConfig,
    /// Shape of the hierarchy bootstrapped at startup.
    pub topology: TopologyConfig,
    /// Synthetic sensor feed.
    pub feed: FeedConfig,
    /// Maintenance scheduler ticks.
    pub maintenance: MaintenanceConfig,
    /// Greenhouse control thresholds.
    pub control: ControlConfig,
    /// Log output for the monitor binary.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub system_shutdown_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Capacity of the [`RuntimeEvent`](crate::common::RuntimeEvent) broadcast channel.
    pub event_channel_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisionConfig {
    /// Backoff for the system, region, site, greenhouse, registry and actuator actors.
    pub default_backoff: BackoffConfig,
    /// Backoff for sensors, which tolerate longer outages.
    pub sensor_backoff: BackoffConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub regions: Vec<String>,
    pub sites_per_region: usize,
    pub greenhouses_per_site: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Temperatures strictly above this turn the fan on.
    pub fan_on_above: f64,
    /// Temperatures strictly below this turn the heater on.
    pub heater_on_below: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Write daily-rotated log files here instead of stdout.
    pub directory: Option<String>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            system_shutdown_timeout_ms: 30_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 1024,
        }
    }
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            default_backoff: BackoffConfig::new(1_000, 10_000, 0.2),
            sensor_backoff: BackoffConfig::new(1_000, 30_000, 0.2),
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            regions: vec!["us-east".to_string(), "eu-west".to_string()],
            sites_per_region: 2,
            greenhouses_per_site: 2,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 1_000,
            interval_ms: 2_000,
            seed: None,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 10_000,
            interval_ms: 60_000,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            fan_on_above: 28.0,
            heater_on_below: 20.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: None,
        }
    }
}

impl TimeoutConfig {
    pub const fn system_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.system_shutdown_timeout_ms)
    }
}

impl SupervisionConfig {
    /// Policy for actors on the default backoff.
    pub fn default_policy(&self) -> SupervisionPolicy {
        SupervisionPolicy::RestartWithBackoff(self.default_backoff.clone())
    }

    /// Policy for sensor actors.
    pub fn sensor_policy(&self) -> SupervisionPolicy {
        SupervisionPolicy::RestartWithBackoff(self.sensor_backoff.clone())
    }
}

impl FeedConfig {
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Tick period, never shorter than one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl MaintenanceConfig {
    pub const fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Failure to read or parse a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`FleetConfig`].
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl FleetConfig {
    /// Reads and parses a specific configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Loads `greenhouse/config.toml` from the XDG config directories, falling back to
    /// defaults when it is absent or invalid.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("greenhouse") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}; using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Process-wide configuration, loaded on first access.
    pub static ref CONFIG: FleetConfig = FleetConfig::load();
}
