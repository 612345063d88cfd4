//! Synthetic data source standing in for real devices

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::device::DeviceRegistry;
use crate::self_test::{SelfTestOutcome, SelfTestResult};
use crate::source::DataSource;
use crate::state::current_epoch_ms;
use crate::telemetry::{ReadingStatus, TelemetryReading};

/// Random readings and self-test outcomes from a seedable generator
pub struct SyntheticSource {
    telemetry_device: String,
    temperature_min: f64,
    temperature_max: f64,
    warning_probability: f64,
    pass_probability: f64,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for SyntheticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticSource")
            .field("telemetry_device", &self.telemetry_device)
            .field("temperature_min", &self.temperature_min)
            .field("temperature_max", &self.temperature_max)
            .finish()
    }
}

impl SyntheticSource {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => {
                tracing::debug!("Seeding synthetic source with {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &SimulationConfig, rng: StdRng) -> Self {
        Self {
            telemetry_device: config.telemetry_device.clone(),
            temperature_min: config.temperature_min,
            temperature_max: config.temperature_max,
            warning_probability: config.warning_probability.clamp(0.0, 1.0),
            pass_probability: config.pass_probability.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Temperature uniform in `[min, max)`, `WARNING` with the configured probability
    pub fn generate_reading(&self, now_ms: u64) -> TelemetryReading {
        let mut rng = self.rng();
        let temperature = rng.gen_range(self.temperature_min..self.temperature_max);
        let status = if rng.gen_bool(self.warning_probability) {
            ReadingStatus::Warning
        } else {
            ReadingStatus::Ok
        };
        TelemetryReading {
            device_id: self.telemetry_device.clone(),
            timestamp_epoch_ms: now_ms,
            temperature,
            status,
        }
    }

    /// Device uniform over the registry, `PASS` with the configured probability
    pub fn generate_self_test(
        &self,
        registry: &DeviceRegistry,
        now_ms: u64,
    ) -> crate::Result<SelfTestResult> {
        let devices = registry.devices();
        if devices.is_empty() {
            return Err(crate::ConsoleError::Source(
                "no devices registered for self-test".to_string(),
            ));
        }

        let mut rng = self.rng();
        let device = &devices[rng.gen_range(0..devices.len())];
        let outcome = if rng.gen_bool(self.pass_probability) {
            SelfTestOutcome::Pass
        } else {
            SelfTestOutcome::Fail
        };
        Ok(SelfTestResult {
            device_id: device.id.clone(),
            timestamp_epoch_ms: now_ms,
            outcome,
        })
    }
}

#[async_trait]
impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn connect(&self) -> crate::Result<()> {
        tracing::debug!("Synthetic source connected");
        Ok(())
    }

    async fn disconnect(&self) -> crate::Result<()> {
        tracing::debug!("Synthetic source disconnected");
        Ok(())
    }

    async fn next_reading(&self) -> crate::Result<TelemetryReading> {
        Ok(self.generate_reading(current_epoch_ms()))
    }

    async fn next_self_test(&self, registry: &DeviceRegistry) -> crate::Result<SelfTestResult> {
        self.generate_self_test(registry, current_epoch_ms())
    }
}
