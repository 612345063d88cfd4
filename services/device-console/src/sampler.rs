//! Sampler: periodic tasks that pull from the data source into the shared state

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SimulationConfig;
use crate::source::DataSource;
use crate::state::StateHandle;

/// A recurring task bound to a cancellation token.
///
/// The first tick fires one full period after spawning. Dropping the task
/// cancels it; `shutdown` also waits for it to finish.
pub struct PeriodicTask {
    name: String,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn spawn<F, Fut>(
        name: impl Into<String>,
        period: Duration,
        parent: &CancellationToken,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cancel = parent.child_token();
        let token = cancel.clone();
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                // A tick cut short by cancellation never reaches its state update
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tick() => {}
                }
            }
            tracing::debug!("Periodic task '{}' stopped", task_name);
        });

        tracing::debug!("Periodic task '{}' started ({:?})", name, period);
        Self {
            name,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel the task and wait for it to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Periodic task '{}' ended abnormally: {}", self.name, e);
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Cadences of the two sampling loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerIntervals {
    pub telemetry: Duration,
    pub self_test: Duration,
}

impl SamplerIntervals {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            telemetry: Duration::from_secs(config.telemetry_interval_seconds),
            self_test: Duration::from_secs(config.self_test_interval_seconds),
        }
    }
}

impl Default for SamplerIntervals {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// Owns the data source and feeds the telemetry and self-test buffers
pub struct Sampler {
    source: Arc<dyn DataSource>,
    state: StateHandle,
    intervals: SamplerIntervals,
    cancel: CancellationToken,
}

impl Sampler {
    pub fn new(
        source: Arc<dyn DataSource>,
        state: StateHandle,
        intervals: SamplerIntervals,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            state,
            intervals,
            cancel,
        }
    }

    /// Connect the source and publish the connection flag
    pub async fn connect(&self) {
        tracing::debug!("Connecting data source '{}'", self.source.name());
        let connected = match self.source.connect().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to connect data source '{}': {}",
                    self.source.name(),
                    e
                );
                false
            }
        };
        self.state.write().await.set_source_connected(connected);
    }

    /// Disconnect the source and clear the connection flag
    pub async fn disconnect(&self) {
        tracing::debug!("Disconnecting data source '{}'", self.source.name());
        if let Err(e) = self.source.disconnect().await {
            tracing::warn!(
                "Failed to disconnect data source '{}': {}",
                self.source.name(),
                e
            );
        }
        self.state.write().await.set_source_connected(false);
    }

    /// Start both sampling loops. They stop when the handle is dropped or
    /// shut down, or when the sampler's token is cancelled.
    pub fn start(&self) -> SamplerHandle {
        let telemetry = {
            let source = Arc::clone(&self.source);
            let state = Arc::clone(&self.state);
            PeriodicTask::spawn(
                "telemetry",
                self.intervals.telemetry,
                &self.cancel,
                move || {
                    let source = Arc::clone(&source);
                    let state = Arc::clone(&state);
                    async move { sample_telemetry(source.as_ref(), &state).await }
                },
            )
        };

        let self_test = {
            let source = Arc::clone(&self.source);
            let state = Arc::clone(&self.state);
            PeriodicTask::spawn(
                "self-test",
                self.intervals.self_test,
                &self.cancel,
                move || {
                    let source = Arc::clone(&source);
                    let state = Arc::clone(&state);
                    async move { sample_self_test(source.as_ref(), &state).await }
                },
            )
        };

        tracing::info!(
            "Sampling '{}' every {:?} (telemetry) and {:?} (self-test)",
            self.source.name(),
            self.intervals.telemetry,
            self.intervals.self_test
        );

        SamplerHandle {
            telemetry,
            self_test,
        }
    }
}

/// Keeps the sampling loops alive; dropping it cancels them
pub struct SamplerHandle {
    telemetry: PeriodicTask,
    self_test: PeriodicTask,
}

impl SamplerHandle {
    pub fn is_finished(&self) -> bool {
        self.telemetry.is_finished() && self.self_test.is_finished()
    }

    pub async fn shutdown(self) {
        let Self {
            telemetry,
            self_test,
        } = self;
        tokio::join!(telemetry.shutdown(), self_test.shutdown());
        tracing::debug!("Sampler stopped");
    }
}

/// Pull one reading into the telemetry buffer; failures skip the tick
pub async fn sample_telemetry(source: &dyn DataSource, state: &StateHandle) {
    match source.next_reading().await {
        Ok(reading) => {
            tracing::debug!(
                "Telemetry '{}': {:.1} °C ({})",
                reading.device_id,
                reading.temperature,
                reading.status
            );
            state.write().await.record_reading(reading);
        }
        Err(e) => tracing::warn!("Telemetry sample from '{}' skipped: {}", source.name(), e),
    }
}

/// Pull one self-test result into the self-test buffer; failures skip the tick
pub async fn sample_self_test(source: &dyn DataSource, state: &StateHandle) {
    let registry = state.read().await.registry.clone();
    match source.next_self_test(&registry).await {
        Ok(result) => {
            tracing::debug!("Self-test '{}': {}", result.device_id, result.outcome);
            state.write().await.record_self_test(result);
        }
        Err(e) => tracing::warn!("Self-test sample from '{}' skipped: {}", source.name(), e),
    }
}
