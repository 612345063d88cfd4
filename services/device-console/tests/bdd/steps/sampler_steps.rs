//! BDD step definitions for sampler lifecycle feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use device_console::config::SimulationConfig;
use device_console::sampler::{Sampler, SamplerIntervals};
use device_console::simulation::SyntheticSource;

use crate::world::{ConsoleWorld, SamplerWorld};

#[given(expr = "a seeded synthetic sampler ticking every {int} ms")]
fn seeded_sampler(world: &mut ConsoleWorld, period_ms: u64) {
    let source = SyntheticSource::new(&SimulationConfig {
        seed: Some(42),
        ..SimulationConfig::default()
    });
    let period = Duration::from_millis(period_ms);
    let sampler = Sampler::new(
        Arc::new(source),
        world.state(),
        SamplerIntervals {
            telemetry: period,
            self_test: period * 3,
        },
        CancellationToken::new(),
    );
    world.sampler = Some(SamplerWorld {
        sampler,
        handle: None,
    });
}

#[when("the sampler connects and starts")]
async fn sampler_starts(world: &mut ConsoleWorld) {
    let sampling = world.sampler.as_mut().expect("sampler not set");
    sampling.sampler.connect().await;
    sampling.handle = Some(sampling.sampler.start());
}

#[when(expr = "{int} ms pass")]
async fn time_passes(_world: &mut ConsoleWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[when("the sampler is shut down")]
async fn sampler_shut_down(world: &mut ConsoleWorld) {
    let sampling = world.sampler.as_mut().expect("sampler not set");
    if let Some(handle) = sampling.handle.take() {
        handle.shutdown().await;
    }
    sampling.sampler.disconnect().await;
}

#[then("the data source is reported as connected")]
async fn source_connected(world: &mut ConsoleWorld) {
    assert!(world.state().read().await.source_connected);
}

#[then("the data source is reported as disconnected")]
async fn source_disconnected(world: &mut ConsoleWorld) {
    assert!(!world.state().read().await.source_connected);
}

#[then(expr = "at least {int} telemetry readings have arrived")]
async fn readings_arrived(world: &mut ConsoleWorld, minimum: usize) {
    let count = world.state().read().await.telemetry.len();
    assert!(count >= minimum, "only {} readings arrived", count);
}

#[then(expr = "at least {int} self-test result(s) have/has arrived")]
async fn self_tests_arrived(world: &mut ConsoleWorld, minimum: usize) {
    let count = world.state().read().await.self_tests.len();
    assert!(count >= minimum, "only {} self-tests arrived", count);
}

#[then(expr = "no further data arrives within {int} ms")]
async fn no_further_data(world: &mut ConsoleWorld, ms: u64) {
    let state = world.state();
    let before = {
        let s = state.read().await;
        (s.telemetry.len(), s.self_tests.len())
    };
    tokio::time::sleep(Duration::from_millis(ms)).await;
    let s = state.read().await;
    assert_eq!((s.telemetry.len(), s.self_tests.len()), before);
}
