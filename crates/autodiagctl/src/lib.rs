//! autodiagctl library - exposes modules for integration tests

pub mod client;
pub mod display;
pub mod orchestrator;
pub mod stepper;
