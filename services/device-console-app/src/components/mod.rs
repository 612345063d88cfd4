//! Dashboard panels

pub mod command_catalog;
pub mod device_list;
pub mod status_badge;
pub mod telemetry_panel;
pub mod test_results;
