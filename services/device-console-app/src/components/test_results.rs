//! Self-test results component

use crate::api::{fetch_json, SelfTestsResponse};
use crate::components::status_badge::StatusBadge;
use leptos::prelude::*;

/// Fetches /api/self-tests and lists results newest first with the pass rate
#[component]
pub fn TestResults() -> impl IntoView {
    let tests = Resource::new(
        || (),
        |_| async move {
            fetch_json::<SelfTestsResponse>("/api/self-tests")
                .await
                .unwrap_or_default()
        },
    );

    view! {
        <section>
            <h2>"Self-Test Results"</h2>
            <Suspense fallback=move || view! { <p>"Loading self-tests..."</p> }>
                {move || {
                    tests.get().map(|data| {
                        let summary = format!(
                            "Passed {} | Failed {} | Pass rate {}%",
                            data.summary.passed, data.summary.failed, data.pass_rate
                        );
                        view! {
                            <p>{summary} " " <StatusBadge status=data.health /></p>
                            {if data.results.is_empty() {
                                view! { <p>"No self-test results yet."</p> }.into_any()
                            } else {
                                view! {
                                    <ul style="list-style: none; padding: 0;">
                                        {data.results.into_iter().map(|r| {
                                            view! {
                                                <li style="padding: 0.25rem 0;">
                                                    <StatusBadge status=r.outcome />
                                                    " "
                                                    {r.device_id}
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
