//! autodiagd - diagnosis proxy daemon
//!
//! Forwards symptom descriptions to a remote assistant service, waits for
//! the run to finish and returns the reply text. Also exposes the local
//! response interpreter over HTTP.

pub mod assistant;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod routes;
pub mod server;
