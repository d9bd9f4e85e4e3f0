//! Nullable collaborators for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! The engine's external dependencies (clock, principal classifier) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//!
//! Usage: swap real implementations for nullables in tests.

pub mod classifier;
pub mod clock;

pub use classifier::NullClassifier;
pub use clock::NullClock;
