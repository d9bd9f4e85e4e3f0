//! Shared utilities for the ballot workspace.

pub mod logging;
pub mod stats;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use stats::OutcomeCounter;
pub use time::format_duration;
