//! Session-based ballot engine with liquid-democracy delegation.
//!
//! Lifecycle of a session (clock-driven, never backward):
//! Pending (rights granted) → Voting (votes and delegations) → Done (tally)
//!
//! Key principle: weight is conserved. A right-grant creates exactly one unit
//! of weight; delegation only relocates it, and every unit is counted at most
//! once.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod delegation;
pub mod engine;
pub mod error;
pub mod event;
pub mod phase;
pub mod session;
pub mod tally;

pub use classifier::{PrincipalClassifier, RegistryClassifier};
pub use clock::{Clock, SystemClock};
pub use config::{EngineConfig, MAX_CANDIDATES, MAX_VOTERS_PER_GRANT};
pub use engine::{BallotEngine, EngineSnapshot};
pub use error::{BallotError, ErrorCategory};
pub use event::{BallotEvent, EventBus};
pub use phase::Phase;
pub use session::{Candidate, Session, SessionInfo, SessionTotals, Voter};
