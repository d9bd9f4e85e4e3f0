//! Events emitted after each committed mutation.

use ballot_types::{CandidateId, Principal, SessionId, Timestamp};

/// Ballot-level events that observers can subscribe to via the [`EventBus`].
///
/// Failed operations emit nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BallotEvent {
    SessionCreated {
        session: SessionId,
        chairperson: Principal,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    CandidateAdded {
        session: SessionId,
        candidate: CandidateId,
    },
    RightsGranted {
        session: SessionId,
        voters: Vec<Principal>,
    },
    /// `to` is the final target of the chain, not necessarily the principal
    /// named in the call.
    Delegated {
        session: SessionId,
        from: Principal,
        to: Principal,
        weight: u64,
        /// Candidate the weight was folded into, if the target had already voted.
        counted_for: Option<CandidateId>,
    },
    Voted {
        session: SessionId,
        voter: Principal,
        candidate: CandidateId,
        weight: u64,
    },
}

/// Synchronous fan-out event bus for ballot events.
///
/// Listeners run inline on the calling thread after the session lock is
/// released.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&BallotEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&BallotEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &BallotEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
