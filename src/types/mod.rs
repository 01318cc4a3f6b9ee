//! Shared types for Veranda

pub mod error;

pub use error::{Result, VerandaError};
