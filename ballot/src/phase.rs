//! Session lifecycle phases.
//!
//! A phase is never stored: it is derived from the session's window and the
//! current time, so transitions happen only as the clock moves.

use ballot_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 3 phases of a ballot session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Before the start time. Rights can be granted, candidates added.
    Pending,
    /// Between start and end time, both inclusive. Delegation and voting.
    Voting,
    /// After the end time. Tallying only.
    Done,
}

impl Phase {
    /// Derive the phase of a window `[start, end]` at `now`.
    pub fn at(start: Timestamp, end: Timestamp, now: Timestamp) -> Self {
        if now < start {
            Self::Pending
        } else if now <= end {
            Self::Voting
        } else {
            Self::Done
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Voting => "Voting",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}
