//! Main App component

use crate::components::command_catalog::CommandCatalog;
use crate::components::device_list::DeviceList;
use crate::components::telemetry_panel::TelemetryPanel;
use crate::components::test_results::TestResults;
use leptos::prelude::*;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <main style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
            <h1>"Device Console"</h1>
            <DeviceList />
            <CommandCatalog />
            <TelemetryPanel />
            <TestResults />
        </main>
    }
}
