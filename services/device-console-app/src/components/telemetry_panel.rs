//! Telemetry statistics and recent readings component

use crate::api::{fetch_json, TelemetryResponse};
use crate::components::status_badge::StatusBadge;
use leptos::prelude::*;

const TABLE_ROWS: usize = 10;

/// Fetches /api/telemetry and shows current, average, min and max temperature
#[component]
pub fn TelemetryPanel() -> impl IntoView {
    let telemetry = Resource::new(
        || (),
        |_| async move {
            fetch_json::<TelemetryResponse>("/api/telemetry")
                .await
                .unwrap_or_default()
        },
    );

    view! {
        <section>
            <h2>"Telemetry"</h2>
            <Suspense fallback=move || view! { <p>"Loading telemetry..."</p> }>
                {move || {
                    telemetry.get().map(|data| match data.stats {
                        None => view! { <p>"Waiting for telemetry..."</p> }.into_any(),
                        Some(stats) => view! {
                            <p>
                                {format!(
                                    "Current {:.1} °C | Average {:.1} °C | Min {:.1} °C | Max {:.1} °C | {} readings",
                                    stats.current, stats.average, stats.min, stats.max, stats.count
                                )}
                            </p>
                            <table style="width: 100%; border-collapse: collapse;">
                                <thead>
                                    <tr style="border-bottom: 2px solid #dee2e6;">
                                        <th style="padding: 0.5rem; text-align: left;">"Time"</th>
                                        <th style="padding: 0.5rem; text-align: left;">"Temperature"</th>
                                        <th style="padding: 0.5rem; text-align: left;">"Status"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {data.chart.points.iter().rev().zip(data.readings.iter().rev()).take(TABLE_ROWS).map(|(point, reading)| {
                                        view! {
                                            <tr style="border-bottom: 1px solid #dee2e6;">
                                                <td style="padding: 0.5rem;">{point.time.clone()}</td>
                                                <td style="padding: 0.5rem;">{format!("{:.1} °C", point.temperature)}</td>
                                                <td style="padding: 0.5rem;">
                                                    <StatusBadge status=reading.status.clone() />
                                                </td>
                                            </tr>
                                        }
                                    }).collect::<Vec<_>>()}
                                </tbody>
                            </table>
                        }.into_any(),
                    })
                }}
            </Suspense>
        </section>
    }
}
