//! Ballot sessions and the records they own.

use crate::error::BallotError;
use crate::phase::Phase;
use ballot_types::{CandidateId, Principal, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A candidate and the weight counted for it so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub vote_count: u64,
}

impl Candidate {
    pub fn new(id: CandidateId) -> Self {
        Self { id, vote_count: 0 }
    }
}

/// Per-session record of a principal's participation.
///
/// A principal that was never granted a right reads as `Voter::default()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Voting power. 0 means no right to vote.
    pub weight: u64,
    /// Set once the voter has voted or delegated. Never cleared.
    pub voted: bool,
    /// Where this voter's weight was forwarded, if they delegated.
    pub delegate: Option<Principal>,
    /// The candidate this voter's own ballot went to.
    pub vote: Option<CandidateId>,
}

impl Voter {
    pub fn has_right(&self) -> bool {
        self.weight != 0
    }
}

/// Chairperson and window of a session, without its voters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub chairperson: Principal,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub created_at: Timestamp,
}

/// Weight accounting for a session.
///
/// `counted_weight` never exceeds `granted_weight`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Number of rights granted, i.e. the sum of every voter's weight at grant time.
    pub granted_weight: u64,
    /// Sum of every candidate's vote count.
    pub counted_weight: u64,
}

/// One complete ballot instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub chairperson: Principal,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub created_at: Timestamp,
    /// Candidates in insertion order. Order decides ties.
    pub candidates: Vec<Candidate>,
    pub voters: BTreeMap<Principal, Voter>,
    pub granted_weight: u64,
}

impl Session {
    pub fn new(
        id: SessionId,
        chairperson: Principal,
        candidates: Vec<Candidate>,
        start_time: Timestamp,
        end_time: Timestamp,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            chairperson,
            start_time,
            end_time,
            created_at,
            candidates,
            voters: BTreeMap::new(),
            granted_weight: 0,
        }
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        Phase::at(self.start_time, self.end_time, now)
    }

    pub fn require_phase(&self, expected: Phase, now: Timestamp) -> Result<(), BallotError> {
        let actual = self.phase(now);
        if actual != expected {
            return Err(BallotError::WrongPhase { expected, actual });
        }
        Ok(())
    }

    pub fn require_chairperson(&self, caller: &Principal) -> Result<(), BallotError> {
        if caller != &self.chairperson {
            return Err(BallotError::NotChairperson(caller.clone()));
        }
        Ok(())
    }

    /// The voter record for `principal`, or the default record if none exists.
    pub fn voter(&self, principal: &Principal) -> Voter {
        self.voters.get(principal).cloned().unwrap_or_default()
    }

    pub fn candidate_index(&self, id: CandidateId) -> Option<usize> {
        self.candidates.iter().position(|c| c.id == id)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            chairperson: self.chairperson.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
        }
    }

    pub fn totals(&self) -> SessionTotals {
        SessionTotals {
            granted_weight: self.granted_weight,
            counted_weight: crate::tally::counted_weight(&self.candidates),
        }
    }
}
