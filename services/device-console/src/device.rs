//! Static device registry

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::CommandKind;
use crate::config::DeviceConfig;

/// Connectivity status of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
            DeviceStatus::Warning => write!(f, "warning"),
        }
    }
}

/// A device identity shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub status: DeviceStatus,
    pub last_seen_epoch_ms: u64,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }

    /// Shortcut commands offered on the device card
    pub fn quick_actions(&self) -> &'static [CommandKind] {
        if self.is_online() {
            &[CommandKind::SelfTest, CommandKind::Reset]
        } else {
            &[]
        }
    }
}

/// Fixed list of devices for the lifetime of the console
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Build the registry from configuration, resolving last-seen offsets against `now_ms`
    pub fn from_config(configs: &[DeviceConfig], now_ms: u64) -> Self {
        let devices = configs
            .iter()
            .map(|c| Device {
                id: c.id.clone(),
                name: c.name.clone(),
                status: c.status,
                last_seen_epoch_ms: now_ms
                    .saturating_sub(c.last_seen_offset_seconds.saturating_mul(1000)),
            })
            .collect();
        Self { devices }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn online(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_online())
    }

    pub fn online_count(&self) -> usize {
        self.online().count()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
