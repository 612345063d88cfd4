//! BDD step definitions for the device console

pub mod buffer_steps;
pub mod command_steps;
pub mod dashboard_steps;
pub mod sampler_steps;
