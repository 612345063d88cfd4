//! Data source trait: where telemetry and self-test results come from

use async_trait::async_trait;

use crate::device::DeviceRegistry;
use crate::self_test::SelfTestResult;
use crate::telemetry::TelemetryReading;

/// Producer of device readings, polled by the sampler.
///
/// The synthetic generator implements this; a live device feed can be
/// substituted without touching the dashboard.
#[async_trait]
pub trait DataSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn connect(&self) -> crate::Result<()>;

    async fn disconnect(&self) -> crate::Result<()>;

    /// Next temperature reading
    async fn next_reading(&self) -> crate::Result<TelemetryReading>;

    /// Next self-test result for some device in `registry`
    async fn next_self_test(&self, registry: &DeviceRegistry) -> crate::Result<SelfTestResult>;
}
