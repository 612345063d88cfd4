//! Device Console Dashboard - Leptos frontend
//!
//! Reactive web UI for device status, telemetry, self-tests and commands.

pub mod api;
pub mod app;
pub mod components;

pub use app::App;

/// Hydration entry point for WASM client
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    leptos::mount::hydrate_body(App);
}
