//! Command catalog and recent commands component

use crate::api::{fetch_json, CommandsResponse};
use crate::components::status_badge::StatusBadge;
use leptos::prelude::*;

/// Fetches /api/commands and shows the available commands and recent sends
#[component]
pub fn CommandCatalog() -> impl IntoView {
    let commands = Resource::new(
        || (),
        |_| async move {
            fetch_json::<CommandsResponse>("/api/commands")
                .await
                .unwrap_or_default()
        },
    );

    view! {
        <section>
            <h2>"Commands"</h2>
            <Suspense fallback=move || view! { <p>"Loading commands..."</p> }>
                {move || {
                    commands.get().map(|data| {
                        let sending = data.sending.then(|| view! { <p>"Sending..."</p> });
                        view! {
                            {sending}
                            <h3>"Available Commands"</h3>
                            <ul>
                                {data.catalog.into_iter().map(|entry| {
                                    view! {
                                        <li>
                                            <strong>{entry.label}</strong>
                                            {format!(" ({}): {}", entry.value, entry.description)}
                                        </li>
                                    }
                                }).collect::<Vec<_>>()}
                            </ul>
                            <h3>"Recent Commands"</h3>
                            {if data.recent.is_empty() {
                                view! { <p>"No commands sent yet."</p> }.into_any()
                            } else {
                                view! {
                                    <ul style="list-style: none; padding: 0;">
                                        {data.recent.into_iter().map(|r| {
                                            view! {
                                                <li style="padding: 0.25rem 0;">
                                                    <code>{r.command}</code>
                                                    {format!(" to {} ", r.device_id)}
                                                    <StatusBadge status=r.outcome />
                                                </li>
                                            }
                                        }).collect::<Vec<_>>()}
                                    </ul>
                                }.into_any()
                            }}
                        }
                    })
                }}
            </Suspense>
        </section>
    }
}
