//! Fundamental types for the ballot engine.
//!
//! This crate defines the identifiers shared across every other crate in the
//! workspace: principals, session and candidate ids, and timestamps.

pub mod error;
pub mod ids;
pub mod principal;
pub mod time;

pub use error::TypesError;
pub use ids::{CandidateId, SessionId};
pub use principal::Principal;
pub use time::Timestamp;
