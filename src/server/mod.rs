//! HTTP server for Veranda

pub mod http;

pub use http::{run, AppState};
