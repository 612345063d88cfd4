//! Command panel: validation, simulated delivery and the dispatcher

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::device::DeviceRegistry;
use crate::state::{current_epoch_ms, SharedState, StateHandle};

/// Form value that selects the free-text command
pub const CUSTOM_COMMAND: &str = "custom";

/// Predefined device commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    SelfTest,
    Reset,
    Status,
    Calibrate,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::SelfTest,
        CommandKind::Reset,
        CommandKind::Status,
        CommandKind::Calibrate,
    ];

    /// Wire value, as sent to the device
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::SelfTest => "selftest",
            CommandKind::Reset => "reset",
            CommandKind::Status => "status",
            CommandKind::Calibrate => "calibrate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::SelfTest => "Self Test",
            CommandKind::Reset => "Reset",
            CommandKind::Status => "Status",
            CommandKind::Calibrate => "Calibrate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::SelfTest => "Run device self-diagnostics",
            CommandKind::Reset => "Soft reset the device",
            CommandKind::Status => "Get device status",
            CommandKind::Calibrate => "Calibrate sensors",
        }
    }

    /// Entries for the command selector, including the custom option
    pub fn catalog() -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = Self::ALL
            .iter()
            .map(|kind| CatalogEntry {
                value: kind.as_str(),
                label: kind.label(),
                description: kind.description(),
            })
            .collect();
        entries.push(CatalogEntry {
            value: CUSTOM_COMMAND,
            label: "Custom",
            description: "Send custom command",
        });
        entries
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CommandError::UnknownCommand(s.to_string()))
    }
}

/// One row of the command selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPayload {
    Predefined(CommandKind),
    /// Free-form text, typically JSON
    Custom(String),
}

impl fmt::Display for CommandPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandPayload::Predefined(kind) => write!(f, "{}", kind),
            CommandPayload::Custom(text) => f.write_str(text),
        }
    }
}

/// A validated command addressed to one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub target: String,
    pub payload: CommandPayload,
}

/// Reasons a command submission is rejected before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Please select a device and command")]
    MissingSelection,

    #[error("Please select a device")]
    MissingDevice,

    #[error("Please select a command")]
    MissingCommand,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Unknown device '{0}'")]
    UnknownDevice(String),

    #[error("Device '{0}' is not online")]
    DeviceOffline(String),

    #[error("A command is already being sent")]
    Busy,
}

/// Raw command panel input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub device: Option<String>,
    /// Predefined command value or `"custom"`
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub custom: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl CommandRequest {
    pub fn predefined(device: &str, kind: CommandKind) -> Self {
        Self {
            device: Some(device.to_string()),
            command: Some(kind.as_str().to_string()),
            custom: None,
        }
    }

    pub fn custom(device: &str, text: &str) -> Self {
        Self {
            device: Some(device.to_string()),
            command: Some(CUSTOM_COMMAND.to_string()),
            custom: Some(text.to_string()),
        }
    }

    /// Check the selection against the registry and build the command
    pub fn validate(&self, registry: &DeviceRegistry) -> Result<Command, CommandError> {
        let command = non_blank(&self.command);
        let custom = non_blank(&self.custom);

        let Some(device) = non_blank(&self.device) else {
            return Err(if command.is_none() && custom.is_none() {
                CommandError::MissingSelection
            } else {
                CommandError::MissingDevice
            });
        };

        let payload = match command {
            None | Some(CUSTOM_COMMAND) => match custom {
                Some(text) => CommandPayload::Custom(text.to_string()),
                None => return Err(CommandError::MissingCommand),
            },
            Some(value) => CommandPayload::Predefined(value.parse()?),
        };

        match registry.get(device) {
            None => Err(CommandError::UnknownDevice(device.to_string())),
            Some(d) if !d.is_online() => Err(CommandError::DeviceOffline(device.to_string())),
            Some(_) => Ok(Command {
                target: device.to_string(),
                payload,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    Success,
    Timeout,
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Success => write!(f, "Success"),
            CommandOutcome::Timeout => write!(f, "Timeout"),
        }
    }
}

/// Entry in the recent-commands log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub device_id: String,
    pub command: String,
    pub outcome: CommandOutcome,
    pub timestamp_epoch_ms: u64,
}

/// Returned to the caller once a command has been delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReceipt {
    pub command: Command,
    pub notice: String,
    pub completed_epoch_ms: u64,
}

/// Delivers commands to devices
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait CommandTransport: Send + Sync {
    async fn send(&self, command: &Command) -> crate::Result<()>;
}

/// Transport that waits a fixed delay and reports success
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CommandTransport for SimulatedTransport {
    async fn send(&self, command: &Command) -> crate::Result<()> {
        tracing::debug!(
            "Simulating delivery of '{}' to '{}' ({:?})",
            command.payload,
            command.target,
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Validates submissions, tracks the in-flight command and records outcomes.
///
/// Holds only a weak reference to the console state: a send that completes
/// after the state is gone records nothing.
pub struct CommandDispatcher {
    transport: Arc<dyn CommandTransport>,
    state: Weak<RwLock<SharedState>>,
    in_flight: Mutex<Option<Command>>,
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn CommandTransport>, state: &StateHandle) -> Self {
        Self {
            transport,
            state: Arc::downgrade(state),
            in_flight: Mutex::new(None),
        }
    }

    /// The command currently being sent, if any
    pub fn in_flight(&self) -> Option<Command> {
        lock(&self.in_flight).clone()
    }

    pub fn is_sending(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    /// Validate and send a command, recording the outcome in the recent-commands log
    pub async fn dispatch(&self, request: &CommandRequest) -> crate::Result<CommandReceipt> {
        let command = {
            let state = self.state.upgrade().ok_or_else(|| {
                crate::ConsoleError::Command("console state is no longer available".to_string())
            })?;
            let guard = state.read().await;
            request.validate(&guard.registry)?
        };

        let _sending = SendingGuard::acquire(&self.in_flight, &command)?;
        tracing::info!("Sending '{}' to '{}'", command.payload, command.target);

        let result = self.transport.send(&command).await;
        let now_ms = current_epoch_ms();
        let outcome = match &result {
            Ok(()) => CommandOutcome::Success,
            Err(e) => {
                tracing::warn!(
                    "Command '{}' to '{}' failed: {}",
                    command.payload,
                    command.target,
                    e
                );
                CommandOutcome::Timeout
            }
        };

        match self.state.upgrade() {
            Some(state) => state.write().await.record_command(CommandRecord {
                device_id: command.target.clone(),
                command: command.payload.to_string(),
                outcome,
                timestamp_epoch_ms: now_ms,
            }),
            None => tracing::debug!(
                "Console state dropped before '{}' completed; outcome discarded",
                command.payload
            ),
        }

        result?;

        let notice = format!("Sent \"{}\" to {}", command.payload, command.target);
        tracing::debug!("{}", notice);
        Ok(CommandReceipt {
            command,
            notice,
            completed_epoch_ms: now_ms,
        })
    }
}

fn lock(slot: &Mutex<Option<Command>>) -> MutexGuard<'_, Option<Command>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a command as in flight; clears the mark when dropped, including
/// when the dispatch future is abandoned mid-send.
struct SendingGuard<'a> {
    slot: &'a Mutex<Option<Command>>,
}

impl<'a> SendingGuard<'a> {
    fn acquire(slot: &'a Mutex<Option<Command>>, command: &Command) -> Result<Self, CommandError> {
        let mut pending = lock(slot);
        if pending.is_some() {
            return Err(CommandError::Busy);
        }
        *pending = Some(command.clone());
        Ok(Self { slot })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}
