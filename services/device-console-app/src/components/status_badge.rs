//! Status badge component

use leptos::prelude::*;

/// Badge colors for a device status, reading status or test outcome
pub fn badge_colors(status: &str) -> (&'static str, &'static str) {
    match status {
        "online" | "OK" | "PASS" | "success" | "Good" => ("#155724", "#d4edda"),
        "warning" | "WARNING" | "Warning" => ("#856404", "#fff3cd"),
        "FAIL" | "timeout" => ("#721c24", "#f8d7da"),
        _ => ("#383d41", "#e2e3e5"),
    }
}

/// A colored badge: green for healthy, yellow for warnings, red for failures
#[component]
pub fn StatusBadge(status: String) -> impl IntoView {
    let (color, bg) = badge_colors(&status);

    let style = format!(
        "display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; \
         font-size: 0.85em; font-weight: 600; color: {}; background-color: {};",
        color, bg
    );

    view! {
        <span style=style>{status}</span>
    }
}
