//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies (clock, storage, fraud classifier) are abstracted
//! behind traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod classifier;
pub mod clock;
pub mod store;

pub use classifier::{NullClassifier, Scripted};
pub use clock::NullClock;
pub use store::NullStore;
