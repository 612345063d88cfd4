//! Client-side API fetch helpers
//!
//! These types mirror the server-side JSON response structures
//! and are shared between SSR and client-side hydration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Device card as returned by /api/devices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: String,
    pub name: String,
    pub status: String,
    pub last_seen_epoch_ms: u64,
    #[serde(default)]
    pub quick_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryReadingResponse {
    pub device_id: String,
    pub timestamp_epoch_ms: u64,
    pub temperature: f64,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelemetryStatsResponse {
    pub current: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPointResponse {
    pub time: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartSeriesResponse {
    pub points: Vec<ChartPointResponse>,
    pub y_domain: Option<(f64, f64)>,
}

/// Buffer contents and statistics as returned by /api/telemetry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryResponse {
    pub readings: Vec<TelemetryReadingResponse>,
    pub stats: Option<TelemetryStatsResponse>,
    #[serde(default)]
    pub chart: ChartSeriesResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfTestResultResponse {
    pub device_id: String,
    pub timestamp_epoch_ms: u64,
    pub outcome: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SelfTestSummaryResponse {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

/// Results (newest first) and pass rate as returned by /api/self-tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfTestsResponse {
    pub results: Vec<SelfTestResultResponse>,
    pub summary: SelfTestSummaryResponse,
    pub pass_rate: String,
    pub health: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntryResponse {
    pub value: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecordResponse {
    pub device_id: String,
    pub command: String,
    pub outcome: String,
    pub timestamp_epoch_ms: u64,
}

/// Catalog and recent commands as returned by /api/commands
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandsResponse {
    pub catalog: Vec<CatalogEntryResponse>,
    pub recent: Vec<CommandRecordResponse>,
    pub sending: bool,
}

/// GET a JSON endpoint relative to the page origin.
///
/// Outside the hydrated client there is nothing to fetch and the default
/// value is returned.
pub async fn fetch_json<T>(path: &str) -> Result<T, String>
where
    T: DeserializeOwned + Default,
{
    #[cfg(feature = "hydrate")]
    {
        let window = web_sys::window().ok_or("no window")?;
        let origin = window.location().origin().map_err(|e| format!("{:?}", e))?;
        let url = format!("{}{}", origin, path);

        let resp = gloo_net::http::Request::get(&url)
            .send()
            .await
            .map_err(|e| format!("{}", e))?;

        resp.json().await.map_err(|e| format!("{}", e))
    }

    #[cfg(not(feature = "hydrate"))]
    {
        let _ = path;
        Ok(T::default())
    }
}
