//! Dashboard aggregates, recomputed from the shared state on every request

use serde::{Deserialize, Serialize};

use crate::self_test::{SelfTestSummary, SystemHealth};
use crate::state::SharedState;
use crate::telemetry::TelemetryStats;

const MESSAGE_RATE_WINDOW_MS: u64 = 60_000;

/// Header and status-card figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub total_devices: usize,
    pub online_devices: usize,
    pub source_connected: bool,
    pub messages_per_minute: usize,
    pub telemetry: Option<TelemetryStats>,
    pub self_tests: SelfTestSummary,
    pub pass_rate: String,
    pub health: SystemHealth,
    pub uptime_seconds: u64,
}

impl DashboardSnapshot {
    pub fn from_state(state: &SharedState, now_ms: u64) -> Self {
        let self_tests = SelfTestSummary::from_results(&state.self_tests);

        Self {
            total_devices: state.registry.len(),
            online_devices: state.registry.online_count(),
            source_connected: state.source_connected,
            messages_per_minute: messages_per_minute(state, now_ms),
            telemetry: TelemetryStats::from_readings(&state.telemetry),
            pass_rate: self_tests.format_pass_rate(),
            health: self_tests.health(),
            self_tests,
            uptime_seconds: state.started_at.elapsed().as_secs(),
        }
    }
}

/// Telemetry readings plus self-test results received in the last minute
pub fn messages_per_minute(state: &SharedState, now_ms: u64) -> usize {
    let since = now_ms.saturating_sub(MESSAGE_RATE_WINDOW_MS);
    let readings = state
        .telemetry
        .iter()
        .filter(|r| r.timestamp_epoch_ms > since)
        .count();
    let tests = state
        .self_tests
        .iter()
        .filter(|r| r.timestamp_epoch_ms > since)
        .count();
    readings + tests
}
