//! Configuration types for the device console

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::device::DeviceStatus;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub buffers: BufferConfig,
    #[serde(default)]
    pub commands: CommandConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            simulation: SimulationConfig::default(),
            buffers: BufferConfig::default(),
            commands: CommandConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the console cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for device in &self.devices {
            if device.id.trim().is_empty() {
                return Err(config_error("device id must not be empty"));
            }
            if !seen.insert(device.id.as_str()) {
                return Err(config_error(format!("duplicate device id '{}'", device.id)));
            }
        }

        let sim = &self.simulation;
        if !seen.contains(sim.telemetry_device.as_str()) {
            return Err(config_error(format!(
                "telemetry device '{}' is not a configured device",
                sim.telemetry_device
            )));
        }
        if sim.telemetry_interval_seconds == 0 || sim.self_test_interval_seconds == 0 {
            return Err(config_error("sampling intervals must be at least one second"));
        }
        if sim.temperature_min.partial_cmp(&sim.temperature_max) != Some(Ordering::Less) {
            return Err(config_error(format!(
                "temperature range [{}, {}) is empty",
                sim.temperature_min, sim.temperature_max
            )));
        }
        if !(sim.temperature_max - sim.temperature_min).is_finite() {
            return Err(config_error(format!(
                "temperature range [{}, {}) is too wide",
                sim.temperature_min, sim.temperature_max
            )));
        }
        for (name, p) in [
            ("warning_probability", sim.warning_probability),
            ("pass_probability", sim.pass_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(config_error(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }

        let buffers = &self.buffers;
        if buffers.telemetry_capacity == 0
            || buffers.self_test_capacity == 0
            || buffers.command_history_size == 0
        {
            return Err(config_error("buffer capacities must be at least one"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> crate::ConsoleError {
    crate::ConsoleError::Config(message.into())
}

/// A device in the static registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_device_status")]
    pub status: DeviceStatus,
    /// How long before startup the device was last seen
    #[serde(default)]
    pub last_seen_offset_seconds: u64,
}

/// Synthetic data generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_telemetry_device")]
    pub telemetry_device: String,
    #[serde(default = "default_telemetry_interval")]
    pub telemetry_interval_seconds: u64,
    #[serde(default = "default_self_test_interval")]
    pub self_test_interval_seconds: u64,
    #[serde(default = "default_temperature_min")]
    pub temperature_min: f64,
    #[serde(default = "default_temperature_max")]
    pub temperature_max: f64,
    #[serde(default = "default_warning_probability")]
    pub warning_probability: f64,
    #[serde(default = "default_pass_probability")]
    pub pass_probability: f64,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            telemetry_device: default_telemetry_device(),
            telemetry_interval_seconds: default_telemetry_interval(),
            self_test_interval_seconds: default_self_test_interval(),
            temperature_min: default_temperature_min(),
            temperature_max: default_temperature_max(),
            warning_probability: default_warning_probability(),
            pass_probability: default_pass_probability(),
            seed: None,
        }
    }
}

/// Sliding window sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    #[serde(default = "default_telemetry_capacity")]
    pub telemetry_capacity: usize,
    #[serde(default = "default_self_test_capacity")]
    pub self_test_capacity: usize,
    #[serde(default = "default_command_history_size")]
    pub command_history_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            telemetry_capacity: default_telemetry_capacity(),
            self_test_capacity: default_self_test_capacity(),
            command_history_size: default_command_history_size(),
        }
    }
}

/// Simulated command delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: default_send_delay_ms(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
        }
    }
}

fn default_devices() -> Vec<DeviceConfig> {
    vec![
        DeviceConfig {
            id: "esp32-01".to_string(),
            name: "ESP32 Dev Board".to_string(),
            status: DeviceStatus::Online,
            last_seen_offset_seconds: 0,
        },
        DeviceConfig {
            id: "esp32-02".to_string(),
            name: "Temperature Sensor".to_string(),
            status: DeviceStatus::Online,
            last_seen_offset_seconds: 0,
        },
        DeviceConfig {
            id: "pico-w-01".to_string(),
            name: "Pico W Controller".to_string(),
            status: DeviceStatus::Offline,
            last_seen_offset_seconds: 300,
        },
    ]
}

fn default_device_status() -> DeviceStatus {
    DeviceStatus::Online
}

fn default_telemetry_device() -> String {
    "esp32-01".to_string()
}

fn default_telemetry_interval() -> u64 {
    5
}

fn default_self_test_interval() -> u64 {
    15
}

fn default_temperature_min() -> f64 {
    20.0
}

fn default_temperature_max() -> f64 {
    30.0
}

fn default_warning_probability() -> f64 {
    0.1
}

fn default_pass_probability() -> f64 {
    0.85
}

fn default_telemetry_capacity() -> usize {
    50
}

fn default_self_test_capacity() -> usize {
    10
}

fn default_command_history_size() -> usize {
    10
}

fn default_send_delay_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11120
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::ConsoleError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
