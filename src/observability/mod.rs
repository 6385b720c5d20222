//! # Observability
//!
//! Structured logging for the key client and its CLI.

pub mod logging;

pub use logging::init_logging;
