use crate::phase::Phase;
use ballot_types::{CandidateId, Principal, SessionId};
use thiserror::Error;

/// Broad class of a [`BallotError`], telling the caller what kind of fix is
/// needed before a call could succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or unknown inputs. Change the inputs.
    Validation,
    /// The caller may not perform this action, or targets a programmatic principal.
    Authorization,
    /// The session is not in the phase this operation requires.
    Phase,
    /// The call would break an invariant of the current state.
    StateConflict,
    /// Engine-side failure unrelated to the caller's inputs.
    Internal,
}

#[derive(Debug, Error)]
pub enum BallotError {
    #[error("session {0} not found")]
    UnknownSession(SessionId),

    #[error("candidate {candidate} not found in session {session}")]
    UnknownCandidate {
        session: SessionId,
        candidate: CandidateId,
    },

    #[error("candidate id must be non-zero")]
    ZeroCandidateId,

    #[error("candidate {0} is listed more than once")]
    DuplicateCandidate(CandidateId),

    #[error("a session needs at least one candidate")]
    NoCandidates,

    #[error("too many candidates: {have} > {max}")]
    TooManyCandidates { have: usize, max: usize },

    #[error("too many voters in one grant: {have} > {max}")]
    TooManyVoters { have: usize, max: usize },

    #[error("start time {start} is not after the current time {now}")]
    StartNotInFuture {
        start: ballot_types::Timestamp,
        now: ballot_types::Timestamp,
    },

    #[error("end time {end} is not after start time {start}")]
    EndNotAfterStart {
        start: ballot_types::Timestamp,
        end: ballot_types::Timestamp,
    },

    #[error("the null principal cannot take part in a ballot")]
    NullPrincipal,

    #[error("{0} is not the chairperson of this session")]
    NotChairperson(Principal),

    #[error("{0} is a programmatic principal")]
    ProgrammaticPrincipalRejected(Principal),

    #[error("session is {actual}, operation requires {expected}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("{0} already has the right to vote")]
    AlreadyHasRight(Principal),

    #[error("{0} has already voted")]
    AlreadyVoted(Principal),

    #[error("{0} has no right to vote")]
    NoRightToVote(Principal),

    #[error("cannot delegate to self")]
    SelfDelegationNotAllowed,

    #[error("delegation from {0} would create a cycle")]
    DelegationCycleDetected(Principal),

    #[error("session id space exhausted")]
    SessionIdOverflow,

    #[error("session lock poisoned")]
    LockPoisoned,

    #[error("inconsistent session state: {0}")]
    CorruptState(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("config error: {0}")]
    Config(String),
}

impl BallotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownSession(_)
            | Self::UnknownCandidate { .. }
            | Self::ZeroCandidateId
            | Self::DuplicateCandidate(_)
            | Self::NoCandidates
            | Self::TooManyCandidates { .. }
            | Self::TooManyVoters { .. }
            | Self::StartNotInFuture { .. }
            | Self::EndNotAfterStart { .. }
            | Self::NullPrincipal => ErrorCategory::Validation,
            Self::NotChairperson(_) | Self::ProgrammaticPrincipalRejected(_) => {
                ErrorCategory::Authorization
            }
            Self::WrongPhase { .. } => ErrorCategory::Phase,
            Self::AlreadyHasRight(_)
            | Self::AlreadyVoted(_)
            | Self::NoRightToVote(_)
            | Self::SelfDelegationNotAllowed
            | Self::DelegationCycleDetected(_) => ErrorCategory::StateConflict,
            Self::SessionIdOverflow
            | Self::LockPoisoned
            | Self::CorruptState(_)
            | Self::Snapshot(_)
            | Self::Config(_) => ErrorCategory::Internal,
        }
    }

    /// Stable reason code, safe to match on across releases.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSession(_) => "UnknownSession",
            Self::UnknownCandidate { .. } => "UnknownCandidate",
            Self::ZeroCandidateId => "ZeroCandidateId",
            Self::DuplicateCandidate(_) => "DuplicateCandidate",
            Self::NoCandidates => "NoCandidates",
            Self::TooManyCandidates { .. } => "TooManyCandidates",
            Self::TooManyVoters { .. } => "TooManyVoters",
            Self::StartNotInFuture { .. } => "StartNotInFuture",
            Self::EndNotAfterStart { .. } => "EndNotAfterStart",
            Self::NullPrincipal => "NullPrincipal",
            Self::NotChairperson(_) => "NotChairperson",
            Self::ProgrammaticPrincipalRejected(_) => "ProgrammaticPrincipalRejected",
            Self::WrongPhase { .. } => "PhaseError",
            Self::AlreadyHasRight(_) => "AlreadyHasRight",
            Self::AlreadyVoted(_) => "AlreadyVoted",
            Self::NoRightToVote(_) => "NoRightToVote",
            Self::SelfDelegationNotAllowed => "SelfDelegationNotAllowed",
            Self::DelegationCycleDetected(_) => "DelegationCycleDetected",
            Self::SessionIdOverflow => "SessionIdOverflow",
            Self::LockPoisoned => "LockPoisoned",
            Self::CorruptState(_) => "CorruptState",
            Self::Snapshot(_) => "Snapshot",
            Self::Config(_) => "Config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_errors_share_one_code() {
        let err = BallotError::WrongPhase {
            expected: Phase::Voting,
            actual: Phase::Done,
        };
        assert_eq!(err.code(), "PhaseError");
        assert_eq!(err.category(), ErrorCategory::Phase);
        assert_eq!(err.to_string(), "session is Done, operation requires Voting");
    }

    #[test]
    fn categories_follow_error_kind() {
        let alice = Principal::parse("alice").unwrap();
        assert_eq!(
            BallotError::NotChairperson(alice.clone()).category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            BallotError::DelegationCycleDetected(alice).category(),
            ErrorCategory::StateConflict
        );
        assert_eq!(
            BallotError::DuplicateCandidate(CandidateId::new(3)).category(),
            ErrorCategory::Validation
        );
        assert_eq!(BallotError::LockPoisoned.category(), ErrorCategory::Internal);
    }
}
