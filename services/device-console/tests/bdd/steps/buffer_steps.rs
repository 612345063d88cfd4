//! BDD step definitions for buffer and aggregation features

use cucumber::{given, then, when};

use device_console::config::Config;
use device_console::device::DeviceRegistry;
use device_console::self_test::{SelfTestOutcome, SelfTestResult, SelfTestSummary};
use device_console::snapshot::DashboardSnapshot;
use device_console::state::new_state_handle;
use device_console::telemetry::{ReadingStatus, TelemetryReading, TelemetryStats};

use crate::world::ConsoleWorld;

fn reading(n: u64, temperature: f64) -> TelemetryReading {
    TelemetryReading {
        device_id: "esp32-01".to_string(),
        timestamp_epoch_ms: n,
        temperature,
        status: ReadingStatus::Ok,
    }
}

fn self_test(n: u64, outcome: SelfTestOutcome) -> SelfTestResult {
    SelfTestResult {
        device_id: "esp32-02".to_string(),
        timestamp_epoch_ms: n,
        outcome,
    }
}

#[given("a console state with default buffers")]
fn default_state(world: &mut ConsoleWorld) {
    let config = Config::default();
    world.state = Some(new_state_handle(
        DeviceRegistry::from_config(&config.devices, 1_000_000),
        &config.buffers,
    ));
}

#[when(expr = "{int} telemetry readings are recorded")]
async fn record_readings(world: &mut ConsoleWorld, count: u64) {
    let state = world.state();
    let mut s = state.write().await;
    for n in 1..=count {
        s.record_reading(reading(n, 20.0 + (n % 10) as f64));
    }
}

#[when(expr = "{int} self-test results are recorded")]
async fn record_self_tests(world: &mut ConsoleWorld, count: u64) {
    let state = world.state();
    let mut s = state.write().await;
    for n in 1..=count {
        s.record_self_test(self_test(n, SelfTestOutcome::Pass));
    }
}

#[when(expr = "telemetry readings {string} are recorded")]
async fn record_temperatures(world: &mut ConsoleWorld, temperatures: String) {
    let state = world.state();
    let mut s = state.write().await;
    for (n, t) in temperatures.split(',').enumerate() {
        let t: f64 = t.trim().parse().expect("invalid temperature");
        s.record_reading(reading(n as u64, t));
    }
}

#[when(expr = "{int} passing and {int} failing self-tests are recorded")]
async fn record_outcomes(world: &mut ConsoleWorld, passed: u64, failed: u64) {
    let state = world.state();
    let mut s = state.write().await;
    for n in 0..passed {
        s.record_self_test(self_test(n, SelfTestOutcome::Pass));
    }
    for n in 0..failed {
        s.record_self_test(self_test(passed + n, SelfTestOutcome::Fail));
    }
}

#[then(expr = "the telemetry buffer holds {int} readings")]
async fn telemetry_len(world: &mut ConsoleWorld, expected: usize) {
    assert_eq!(world.state().read().await.telemetry.len(), expected);
}

#[then(expr = "the self-test buffer holds {int} results")]
async fn self_test_len(world: &mut ConsoleWorld, expected: usize) {
    assert_eq!(world.state().read().await.self_tests.len(), expected);
}

#[then(expr = "the retained readings run from number {int} to {int} in order")]
async fn telemetry_window(world: &mut ConsoleWorld, first: u64, last: u64) {
    let state = world.state();
    let s = state.read().await;
    let numbers: Vec<u64> = s.telemetry.iter().map(|r| r.timestamp_epoch_ms).collect();
    assert_eq!(numbers, (first..=last).collect::<Vec<_>>());
}

#[then(expr = "the retained self-tests run from number {int} to {int} in order")]
async fn self_test_window(world: &mut ConsoleWorld, first: u64, last: u64) {
    let state = world.state();
    let s = state.read().await;
    let numbers: Vec<u64> = s.self_tests.iter().map(|r| r.timestamp_epoch_ms).collect();
    assert_eq!(numbers, (first..=last).collect::<Vec<_>>());
}

#[then(expr = "the telemetry minimum is {float}")]
async fn telemetry_min(world: &mut ConsoleWorld, expected: f64) {
    let stats = TelemetryStats::from_readings(&world.state().read().await.telemetry)
        .expect("no telemetry");
    assert_eq!(stats.min, expected);
}

#[then(expr = "the telemetry maximum is {float}")]
async fn telemetry_max(world: &mut ConsoleWorld, expected: f64) {
    let stats = TelemetryStats::from_readings(&world.state().read().await.telemetry)
        .expect("no telemetry");
    assert_eq!(stats.max, expected);
}

#[then(expr = "the telemetry average is {float}")]
async fn telemetry_average(world: &mut ConsoleWorld, expected: f64) {
    let stats = TelemetryStats::from_readings(&world.state().read().await.telemetry)
        .expect("no telemetry");
    assert!((stats.average - expected).abs() < 1e-9);
}

#[then(expr = "the pass rate is {string}")]
async fn pass_rate(world: &mut ConsoleWorld, expected: String) {
    let summary = SelfTestSummary::from_results(&world.state().read().await.self_tests);
    assert_eq!(summary.format_pass_rate(), expected);
}

#[then(expr = "the system health is {string}")]
async fn system_health(world: &mut ConsoleWorld, expected: String) {
    let state = world.state();
    let snapshot = DashboardSnapshot::from_state(&*state.read().await, 0);
    assert_eq!(snapshot.health.to_string(), expected);
}
