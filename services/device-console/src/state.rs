//! Shared state read by the dashboard and written by the sampler and dispatcher

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;

use crate::buffer::BoundedBuffer;
use crate::command::CommandRecord;
use crate::config::BufferConfig;
use crate::device::DeviceRegistry;
use crate::self_test::SelfTestResult;
use crate::telemetry::TelemetryReading;

/// Everything the dashboard renders
#[derive(Debug)]
pub struct SharedState {
    pub registry: DeviceRegistry,
    pub telemetry: BoundedBuffer<TelemetryReading>,
    pub self_tests: BoundedBuffer<SelfTestResult>,
    pub commands: BoundedBuffer<CommandRecord>,
    pub source_connected: bool,
    pub started_at: Instant,
}

impl SharedState {
    pub fn new(registry: DeviceRegistry, buffers: &BufferConfig) -> Self {
        Self {
            registry,
            telemetry: BoundedBuffer::new(buffers.telemetry_capacity),
            self_tests: BoundedBuffer::new(buffers.self_test_capacity),
            commands: BoundedBuffer::new(buffers.command_history_size),
            source_connected: false,
            started_at: Instant::now(),
        }
    }

    pub fn record_reading(&mut self, reading: TelemetryReading) {
        if let Some(evicted) = self.telemetry.push(reading) {
            tracing::trace!(
                "Evicted telemetry reading from {} at {}",
                evicted.device_id,
                evicted.timestamp_epoch_ms
            );
        }
    }

    pub fn record_self_test(&mut self, result: SelfTestResult) {
        if let Some(evicted) = self.self_tests.push(result) {
            tracing::trace!(
                "Evicted self-test result from {} at {}",
                evicted.device_id,
                evicted.timestamp_epoch_ms
            );
        }
    }

    pub fn record_command(&mut self, record: CommandRecord) {
        self.commands.push(record);
    }

    pub fn set_source_connected(&mut self, connected: bool) {
        self.source_connected = connected;
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(registry: DeviceRegistry, buffers: &BufferConfig) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(registry, buffers)))
}

pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
