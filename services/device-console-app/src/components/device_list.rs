//! Device cards component

use crate::api::{fetch_json, DeviceResponse};
use crate::components::status_badge::StatusBadge;
use leptos::prelude::*;

/// Fetches /api/devices and shows one card per registered device
#[component]
pub fn DeviceList() -> impl IntoView {
    let devices = Resource::new(
        || (),
        |_| async move {
            fetch_json::<Vec<DeviceResponse>>("/api/devices")
                .await
                .unwrap_or_default()
        },
    );

    view! {
        <section>
            <h2>"Devices"</h2>
            <Suspense fallback=move || view! { <p>"Loading devices..."</p> }>
                {move || {
                    devices.get().map(|data| {
                        if data.is_empty() {
                            view! { <p>"No devices registered."</p> }.into_any()
                        } else {
                            let online = data.iter().filter(|d| d.status == "online").count();
                            let total = data.len();
                            view! {
                                <p>{format!("{} of {} devices online", online, total)}</p>
                                <div style="display: flex; flex-wrap: wrap; gap: 1rem;">
                                    {data.into_iter().map(|d| {
                                        let actions = d.quick_actions.join(", ");
                                        view! {
                                            <div style="padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem; min-width: 200px;">
                                                <div style="font-weight: 600;">{d.name}</div>
                                                <div style="color: #6c757d; font-family: monospace;">{d.id}</div>
                                                <div style="margin: 0.5rem 0;">
                                                    <StatusBadge status=d.status />
                                                </div>
                                                <div style="color: #6c757d;">{actions}</div>
                                            </div>
                                        }
                                    }).collect::<Vec<_>>()}
                                </div>
                            }.into_any()
                        }
                    })
                }}
            </Suspense>
        </section>
    }
}
