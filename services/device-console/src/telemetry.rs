//! Telemetry readings and the statistics derived from them

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status tag attached to a reading by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadingStatus {
    Ok,
    Warning,
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingStatus::Ok => write!(f, "OK"),
            ReadingStatus::Warning => write!(f, "WARNING"),
        }
    }
}

/// A single temperature sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub device_id: String,
    pub timestamp_epoch_ms: u64,
    /// Degrees Celsius
    pub temperature: f64,
    pub status: ReadingStatus,
}

/// Current/average/min/max over every retained reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub current: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl TelemetryStats {
    /// Returns `None` when there are no readings
    pub fn from_readings<'a, I>(readings: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TelemetryReading>,
    {
        let mut iter = readings.into_iter();
        let first = iter.next()?.temperature;

        let mut stats = TelemetryStats {
            current: first,
            average: 0.0,
            min: first,
            max: first,
            count: 1,
        };
        let mut sum = first;
        for reading in iter {
            let t = reading.temperature;
            stats.current = t;
            stats.min = stats.min.min(t);
            stats.max = stats.max.max(t);
            stats.count += 1;
            sum += t;
        }
        stats.average = sum / stats.count as f64;
        Some(stats)
    }
}

/// A chart sample: wall-clock label plus temperature rounded to 0.1 °C
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: String,
    pub temperature: f64,
}

/// Points plus the y-axis range padded by 2 °C on each side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub y_domain: Option<(f64, f64)>,
}

const Y_AXIS_PADDING: f64 = 2.0;

impl ChartSeries {
    pub fn from_readings<'a, I>(readings: I) -> Self
    where
        I: IntoIterator<Item = &'a TelemetryReading> + Clone,
    {
        let points = readings
            .clone()
            .into_iter()
            .map(|r| ChartPoint {
                time: format_time(r.timestamp_epoch_ms),
                temperature: round_one_decimal(r.temperature),
            })
            .collect();
        let y_domain = TelemetryStats::from_readings(readings)
            .map(|s| (s.min - Y_AXIS_PADDING, s.max + Y_AXIS_PADDING));
        Self { points, y_domain }
    }
}

/// `HH:MM` in UTC, 24-hour clock
pub fn format_time(epoch_ms: u64) -> String {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
