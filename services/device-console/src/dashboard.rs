//! Web dashboard with JSON API endpoints and a server-rendered overview page

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::command::{
    CatalogEntry, Command, CommandDispatcher, CommandError, CommandKind, CommandOutcome,
    CommandRecord, CommandRequest,
};
use crate::device::{Device, DeviceStatus};
use crate::self_test::{SelfTestOutcome, SelfTestResult, SelfTestSummary, SystemHealth};
use crate::snapshot::DashboardSnapshot;
use crate::state::{current_epoch_ms, SharedState, StateHandle};
use crate::telemetry::{format_time, ChartSeries, ReadingStatus, TelemetryReading, TelemetryStats};
use crate::ConsoleError;

/// Rows shown in the telemetry table
const TELEMETRY_TABLE_ROWS: usize = 10;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub dispatcher: Arc<CommandDispatcher>,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, dispatcher: Arc<CommandDispatcher>) -> Router {
    let dashboard_state = DashboardState { state, dispatcher };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/devices", get(devices_handler))
        .route("/api/telemetry", get(telemetry_handler))
        .route("/api/self-tests", get(self_tests_handler))
        .route("/api/summary", get(summary_handler))
        .route(
            "/api/commands",
            get(commands_handler).post(send_command_handler),
        )
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(dashboard_state)
}

/// Device card as returned by /api/devices
#[derive(Debug, Clone, Serialize)]
pub struct DeviceView {
    pub id: String,
    pub name: String,
    pub status: DeviceStatus,
    pub last_seen_epoch_ms: u64,
    pub quick_actions: Vec<&'static str>,
}

impl From<&Device> for DeviceView {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            name: device.name.clone(),
            status: device.status,
            last_seen_epoch_ms: device.last_seen_epoch_ms,
            quick_actions: device.quick_actions().iter().map(CommandKind::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TelemetryResponse {
    pub readings: Vec<TelemetryReading>,
    pub stats: Option<TelemetryStats>,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelfTestsResponse {
    /// Newest first
    pub results: Vec<SelfTestResult>,
    pub summary: SelfTestSummary,
    pub pass_rate: String,
    pub health: SystemHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandsResponse {
    pub catalog: Vec<CatalogEntry>,
    /// Newest first
    pub recent: Vec<CommandRecord>,
    pub sending: bool,
    pub in_flight: Option<Command>,
}

async fn devices_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    let devices: Vec<DeviceView> = state.registry.devices().iter().map(DeviceView::from).collect();
    Json(devices)
}

async fn telemetry_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(TelemetryResponse {
        readings: state.telemetry.to_vec(),
        stats: TelemetryStats::from_readings(&state.telemetry),
        chart: ChartSeries::from_readings(&state.telemetry),
    })
}

async fn self_tests_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    let summary = SelfTestSummary::from_results(&state.self_tests);
    Json(SelfTestsResponse {
        results: state.self_tests.iter().rev().cloned().collect(),
        pass_rate: summary.format_pass_rate(),
        health: summary.health(),
        summary,
    })
}

async fn summary_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(DashboardSnapshot::from_state(&state, current_epoch_ms()))
}

async fn commands_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(CommandsResponse {
        catalog: CommandKind::catalog(),
        recent: state.commands.iter().rev().cloned().collect(),
        sending: dashboard.dispatcher.is_sending(),
        in_flight: dashboard.dispatcher.in_flight(),
    })
}

async fn send_command_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<CommandRequest>,
) -> Response {
    match dashboard.dispatcher.dispatch(&request).await {
        Ok(receipt) => Json(receipt).into_response(),
        Err(e) => command_error_response(e),
    }
}

fn command_error_response(err: ConsoleError) -> Response {
    let (status, title, message) = match err {
        ConsoleError::Validation(CommandError::Busy) => (
            StatusCode::CONFLICT,
            "Command In Progress",
            CommandError::Busy.to_string(),
        ),
        ConsoleError::Validation(reason) => {
            tracing::debug!("Rejected command: {}", reason);
            (StatusCode::BAD_REQUEST, "Invalid Command", reason.to_string())
        }
        other => (StatusCode::BAD_GATEWAY, "Command Failed", other.to_string()),
    };
    (
        status,
        Json(serde_json::json!({ "title": title, "message": message })),
    )
        .into_response()
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Html(render_page(&state, dashboard.dispatcher.is_sending(), current_epoch_ms()))
}

/// Minimal escaping for text interpolated into HTML
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn badge(label: &str, color: &str, bg: &str) -> String {
    format!(
        r#"<span style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; color: {}; background-color: {};">{}</span>"#,
        color,
        bg,
        escape_html(label)
    )
}

fn device_status_badge(status: DeviceStatus) -> String {
    let (color, bg) = match status {
        DeviceStatus::Online => ("#155724", "#d4edda"),
        DeviceStatus::Warning => ("#856404", "#fff3cd"),
        DeviceStatus::Offline => ("#383d41", "#e2e3e5"),
    };
    badge(&status.to_string(), color, bg)
}

fn local_time(epoch_ms: u64) -> String {
    format!(
        r#"<script>document.write(new Date({}).toLocaleTimeString())</script>"#,
        epoch_ms
    )
}

fn render_status_cards(snapshot: &DashboardSnapshot) -> String {
    let (health_color, health_bg) = match snapshot.health {
        SystemHealth::Good => ("#155724", "#d4edda"),
        SystemHealth::Warning => ("#856404", "#fff3cd"),
    };
    format!(
        r#"<section style="display: flex; gap: 1rem;">
        <div style="flex: 1; padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
            <div style="color: #6c757d;">Active Devices</div>
            <div id="card-active" style="font-size: 1.75rem; font-weight: 600;">{online}</div>
            <div style="color: #6c757d;">of {total} total</div>
        </div>
        <div style="flex: 1; padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
            <div style="color: #6c757d;">Messages/Min</div>
            <div id="card-rate" style="font-size: 1.75rem; font-weight: 600;">{rate}</div>
        </div>
        <div style="flex: 1; padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
            <div style="color: #6c757d;">System Health</div>
            <div id="card-health" style="font-size: 1.75rem; font-weight: 600; color: {health_color}; background-color: {health_bg};">{health}</div>
            <div style="color: #6c757d;">pass rate <span id="card-pass-rate">{pass_rate}</span>%</div>
        </div>
    </section>"#,
        online = snapshot.online_devices,
        total = snapshot.total_devices,
        rate = snapshot.messages_per_minute,
        health = snapshot.health,
        health_color = health_color,
        health_bg = health_bg,
        pass_rate = snapshot.pass_rate,
    )
}

fn render_devices(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "<p>No devices registered.</p>".to_string();
    }

    let mut cards = String::new();
    for device in devices {
        let actions: String = device
            .quick_actions()
            .iter()
            .map(|kind| {
                format!(
                    r#"<button data-device="{id}" data-command="{value}" onclick="sendCommand(this)">{label}</button> "#,
                    id = escape_html(&device.id),
                    value = kind.as_str(),
                    label = kind.label(),
                )
            })
            .collect();
        let _ = write!(
            cards,
            r#"<div style="padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem; min-width: 200px;">
                <div style="font-weight: 600;">{name}</div>
                <div style="color: #6c757d; font-family: monospace;">{id}</div>
                <div style="margin: 0.5rem 0;">{badge}</div>
                <div style="color: #6c757d;">Last seen {last_seen}</div>
                <div style="margin-top: 0.5rem;">{actions}</div>
            </div>"#,
            name = escape_html(&device.name),
            id = escape_html(&device.id),
            badge = device_status_badge(device.status),
            last_seen = local_time(device.last_seen_epoch_ms),
            actions = actions,
        );
    }
    format!(r#"<div style="display: flex; flex-wrap: wrap; gap: 1rem;">{}</div>"#, cards)
}

fn render_command_panel(state: &SharedState, sending: bool) -> String {
    let device_options: String = state
        .registry
        .online()
        .map(|d| {
            format!(
                r#"<option value="{id}">{name} ({id})</option>"#,
                id = escape_html(&d.id),
                name = escape_html(&d.name)
            )
        })
        .collect();

    let catalog = CommandKind::catalog();
    let command_options: String = catalog
        .iter()
        .map(|entry| format!(r#"<option value="{}">{}</option>"#, entry.value, entry.label))
        .collect();
    let catalog_rows: String = catalog
        .iter()
        .map(|entry| {
            format!(
                r#"<li><strong>{}</strong>: {}</li>"#,
                entry.label, entry.description
            )
        })
        .collect();

    let recent_rows: String = if state.commands.is_empty() {
        r#"<tr><td colspan="4" style="padding: 0.5rem; color: #6c757d;">No commands sent yet.</td></tr>"#
            .to_string()
    } else {
        state
            .commands
            .iter()
            .rev()
            .map(|record| {
                let outcome = match record.outcome {
                    CommandOutcome::Success => badge("Success", "#155724", "#d4edda"),
                    CommandOutcome::Timeout => badge("Timeout", "#721c24", "#f8d7da"),
                };
                format!(
                    r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem; font-family: monospace;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                </tr>"#,
                    escape_html(&record.device_id),
                    escape_html(&record.command),
                    outcome,
                    local_time(record.timestamp_epoch_ms)
                )
            })
            .collect()
    };

    let (button_label, disabled) = if sending {
        ("Sending...", " disabled")
    } else {
        ("Send Command", "")
    };

    format!(
        r#"<section>
        <h2>Send Command</h2>
        <form id="command-form" onsubmit="submitCommand(event)">
            <label>Device
                <select name="device"><option value="">Select a device</option>{device_options}</select>
            </label>
            <label>Command
                <select name="command"><option value="">Select a command</option>{command_options}</select>
            </label>
            <div>
                <textarea name="custom" rows="3" cols="60" placeholder='{{"action": "custom", "params": {{}}}}'></textarea>
            </div>
            <button id="send-button" type="submit"{disabled}>{button_label}</button>
        </form>
        <div id="command-notice" style="margin: 0.5rem 0;"></div>
        <h3>Available Commands</h3>
        <ul>{catalog_rows}</ul>
        <h3>Recent Commands</h3>
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Device</th>
                    <th style="padding: 0.5rem; text-align: left;">Command</th>
                    <th style="padding: 0.5rem; text-align: left;">Outcome</th>
                    <th style="padding: 0.5rem; text-align: left;">Time</th>
                </tr>
            </thead>
            <tbody>{recent_rows}</tbody>
        </table>
    </section>"#,
        device_options = device_options,
        command_options = command_options,
        catalog_rows = catalog_rows,
        recent_rows = recent_rows,
        disabled = disabled,
        button_label = button_label,
    )
}

fn render_chart(chart: &ChartSeries) -> String {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 200.0;

    let Some((lo, hi)) = chart.y_domain else {
        return String::new();
    };
    let span = (hi - lo).max(f64::EPSILON);
    let step = if chart.points.len() > 1 {
        WIDTH / (chart.points.len() - 1) as f64
    } else {
        0.0
    };
    let points: Vec<String> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = i as f64 * step;
            let y = HEIGHT - (p.temperature - lo) / span * HEIGHT;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();
    let first = chart.points.first().map(|p| p.time.as_str()).unwrap_or("");
    let last = chart.points.last().map(|p| p.time.as_str()).unwrap_or("");

    format!(
        r##"<svg viewBox="0 0 {w} {h}" style="width: 100%; height: 200px; border: 1px solid #dee2e6;">
            <polyline fill="none" stroke="#0d6efd" stroke-width="2" points="{points}" />
        </svg>
        <div style="display: flex; justify-content: space-between; color: #6c757d;">
            <span>{first}</span><span>{lo:.1} to {hi:.1} °C</span><span>{last}</span>
        </div>"##,
        w = WIDTH,
        h = HEIGHT,
        points = points.join(" "),
        first = first,
        last = last,
        lo = lo,
        hi = hi,
    )
}

fn render_telemetry(state: &SharedState) -> String {
    let Some(stats) = TelemetryStats::from_readings(&state.telemetry) else {
        return r#"<section><h2>Telemetry</h2><p>Waiting for telemetry...</p></section>"#
            .to_string();
    };

    let rows: String = state
        .telemetry
        .iter()
        .rev()
        .take(TELEMETRY_TABLE_ROWS)
        .map(|r| {
            let status = match r.status {
                ReadingStatus::Ok => badge("OK", "#155724", "#d4edda"),
                ReadingStatus::Warning => badge("WARNING", "#856404", "#fff3cd"),
            };
            format!(
                r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{:.1} °C</td>
                    <td style="padding: 0.5rem;">{}</td>
                </tr>"#,
                format_time(r.timestamp_epoch_ms),
                escape_html(&r.device_id),
                r.temperature,
                status
            )
        })
        .collect();

    format!(
        r#"<section>
        <h2>Telemetry</h2>
        <p>Current <strong>{current:.1} °C</strong> | Average {average:.1} °C | Min {min:.1} °C | Max {max:.1} °C | {count} readings</p>
        {chart}
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Time</th>
                    <th style="padding: 0.5rem; text-align: left;">Device</th>
                    <th style="padding: 0.5rem; text-align: left;">Temperature</th>
                    <th style="padding: 0.5rem; text-align: left;">Status</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
    </section>"#,
        current = stats.current,
        average = stats.average,
        min = stats.min,
        max = stats.max,
        count = stats.count,
        chart = render_chart(&ChartSeries::from_readings(&state.telemetry)),
        rows = rows,
    )
}

fn render_self_tests(state: &SharedState) -> String {
    let summary = SelfTestSummary::from_results(&state.self_tests);
    let rows: String = if state.self_tests.is_empty() {
        "<li>No self-test results yet.</li>".to_string()
    } else {
        state
            .self_tests
            .iter()
            .rev()
            .map(|r| {
                let outcome = match r.outcome {
                    SelfTestOutcome::Pass => badge("PASS", "#155724", "#d4edda"),
                    SelfTestOutcome::Fail => badge("FAIL", "#721c24", "#f8d7da"),
                };
                format!(
                    "<li>{} {} at {}</li>",
                    outcome,
                    escape_html(&r.device_id),
                    local_time(r.timestamp_epoch_ms)
                )
            })
            .collect()
    };

    format!(
        r#"<section>
        <h2>Self-Test Results</h2>
        <p>Passed {passed} | Failed {failed} | Pass rate {rate}%</p>
        <ul style="list-style: none; padding: 0;">{rows}</ul>
    </section>"#,
        passed = summary.passed,
        failed = summary.failed,
        rate = summary.format_pass_rate(),
        rows = rows,
    )
}

fn render_page(state: &SharedState, sending: bool, now_ms: u64) -> String {
    let snapshot = DashboardSnapshot::from_state(state, now_ms);
    let connection = if snapshot.source_connected {
        badge("Connected", "#155724", "#d4edda")
    } else {
        badge("Disconnected", "#721c24", "#f8d7da")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Device Console</title>
    <script>
        function refreshSummary() {{
            fetch('/api/summary')
                .then(r => r.json())
                .then(s => {{
                    document.getElementById('card-active').textContent = s.online_devices;
                    document.getElementById('card-rate').textContent = s.messages_per_minute;
                    document.getElementById('card-health').textContent = s.health;
                    document.getElementById('card-pass-rate').textContent = s.pass_rate;
                    document.getElementById('header-online').textContent = s.online_devices;
                }});
        }}
        function postCommand(body) {{
            const notice = document.getElementById('command-notice');
            const button = document.getElementById('send-button');
            button.disabled = true;
            button.textContent = 'Sending...';
            return fetch('/api/commands', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify(body),
            }})
                .then(r => r.json().then(data => ({{ ok: r.ok, data }})))
                .then(({{ ok, data }}) => {{
                    notice.textContent = ok ? data.notice : `${{data.title}}: ${{data.message}}`;
                    notice.style.color = ok ? '#155724' : '#721c24';
                    if (ok) {{ setTimeout(() => location.reload(), 1500); }}
                }})
                .finally(() => {{
                    button.disabled = false;
                    button.textContent = 'Send Command';
                }});
        }}
        function sendCommand(button) {{
            postCommand({{ device: button.dataset.device, command: button.dataset.command }});
        }}
        function submitCommand(event) {{
            event.preventDefault();
            const form = event.target;
            postCommand({{
                device: form.device.value || null,
                command: form.command.value || null,
                custom: form.custom.value || null,
            }});
        }}
        setInterval(refreshSummary, 5000);
    </script>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <header style="display: flex; justify-content: space-between; align-items: center;">
        <h1>Device Console</h1>
        <div>{connection} <span id="header-online">{online}</span> devices online</div>
    </header>
    {cards}
    <section>
        <h2>Devices</h2>
        {devices}
    </section>
    {commands}
    {telemetry}
    {self_tests}
</body>
</html>"#,
        connection = connection,
        online = snapshot.online_devices,
        cards = render_status_cards(&snapshot),
        devices = render_devices(state.registry.devices()),
        commands = render_command_panel(state, sending),
        telemetry = render_telemetry(state),
        self_tests = render_self_tests(state),
    )
}
