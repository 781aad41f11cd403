//! Shared utilities for the accredit workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};
