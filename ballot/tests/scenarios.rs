//! End-to-end ballot scenarios driven through the public engine API with a
//! nullable clock and classifier.

use std::sync::Arc;

use ballot_engine::{BallotEngine, BallotError, EngineConfig, ErrorCategory, Phase, Voter};
use ballot_nullables::{NullClassifier, NullClock};
use ballot_types::{CandidateId, Principal, SessionId, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const GENESIS: u64 = 1_700_000_000;
const START: u64 = GENESIS + 10_000;
const END: u64 = GENESIS + 30_000;

struct Harness {
    engine: BallotEngine,
    clock: Arc<NullClock>,
    classifier: Arc<NullClassifier>,
    chair: Principal,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(NullClock::new(GENESIS));
        let classifier = Arc::new(NullClassifier::new());
        let engine = BallotEngine::new(EngineConfig::default(), clock.clone(), classifier.clone());
        Self {
            engine,
            clock,
            classifier,
            chair: principal("chair"),
        }
    }

    fn session(&self, candidates: &[u64]) -> SessionId {
        let ids: Vec<CandidateId> = candidates.iter().map(|&c| CandidateId::new(c)).collect();
        self.engine
            .create_session(&self.chair, &ids, Timestamp::new(START), Timestamp::new(END))
            .expect("create session")
    }

    fn grant(&self, session: SessionId, voters: &[&Principal]) {
        let voters: Vec<Principal> = voters.iter().map(|&v| v.clone()).collect();
        self.engine
            .give_right_to_vote(session, &self.chair, &voters)
            .expect("grant rights");
    }

    fn open_voting(&self) {
        self.clock.set(START);
    }

    fn close_voting(&self) {
        self.clock.set(END + 1);
    }

    fn count(&self, session: SessionId, candidate: u64) -> u64 {
        self.engine
            .candidates(session)
            .unwrap()
            .iter()
            .find(|c| c.id == CandidateId::new(candidate))
            .map(|c| c.vote_count)
            .expect("candidate exists")
    }
}

fn principal(name: &str) -> Principal {
    Principal::parse(name).unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn session_creation_stores_window() {
    let h = Harness::new();
    let id = h.session(&[1, 2]);

    assert_eq!(id, SessionId::new(1));
    assert_eq!(h.engine.last_session_id().unwrap(), SessionId::new(1));

    let info = h.engine.session(id).unwrap();
    assert_eq!(info.chairperson, h.chair);
    assert_eq!(info.start_time, Timestamp::new(START));
    assert_eq!(info.end_time, Timestamp::new(END));
    assert_eq!(h.engine.session_status(id).unwrap(), Phase::Pending);

    let candidates = h.engine.candidates(id).unwrap();
    assert_eq!(candidates.len(), 2);
    assert!(candidates.iter().all(|c| c.vote_count == 0));
}

#[test]
fn second_grant_to_same_voter_fails() {
    let h = Harness::new();
    let id = h.session(&[1, 2]);
    let v = principal("v");
    h.grant(id, &[&v]);

    let err = h
        .engine
        .give_right_to_vote(id, &h.chair, &[v.clone()])
        .unwrap_err();
    assert!(matches!(err, BallotError::AlreadyHasRight(ref p) if p == &v));
    assert_eq!(err.category(), ErrorCategory::StateConflict);
}

#[test]
fn grant_round_trip_shows_fresh_voter() {
    let h = Harness::new();
    let id = h.session(&[1]);
    let v = principal("v");
    h.grant(id, &[&v]);

    assert_eq!(
        h.engine.voter(id, &v).unwrap(),
        Voter {
            weight: 1,
            voted: false,
            delegate: None,
            vote: None,
        }
    );
}

#[test]
fn voter_can_vote_only_once() {
    let h = Harness::new();
    let id = h.session(&[1, 2]);
    let v = principal("v");
    h.grant(id, &[&v]);
    h.open_voting();

    assert_eq!(h.engine.session_status(id).unwrap(), Phase::Voting);
    h.engine.vote(id, &v, CandidateId::new(1)).unwrap();
    let weight = h.engine.voter(id, &v).unwrap().weight;
    assert_eq!(h.count(id, 1), weight);

    let err = h.engine.vote(id, &v, CandidateId::new(1)).unwrap_err();
    assert_eq!(err.code(), "AlreadyVoted");
    assert_eq!(h.count(id, 1), weight);
}

#[test]
fn delegated_weight_is_cast_by_target() {
    let h = Harness::new();
    let id = h.session(&[1, 2]);
    let (v1, v2) = (principal("v1"), principal("v2"));
    h.grant(id, &[&v1, &v2]);
    h.open_voting();

    let w1 = h.engine.voter(id, &v1).unwrap().weight;
    let w2 = h.engine.voter(id, &v2).unwrap().weight;
    h.engine.delegate(id, &v1, &v2).unwrap();
    h.engine.vote(id, &v2, CandidateId::new(2)).unwrap();

    assert_eq!(h.count(id, 2), w1 + w2);
    assert_eq!(h.count(id, 1), 0);
}

#[test]
fn delegation_cycle_rejected_without_mutation() {
    let h = Harness::new();
    let id = h.session(&[1, 2]);
    let (v1, v2) = (principal("v1"), principal("v2"));
    h.grant(id, &[&v1, &v2]);
    h.open_voting();

    h.engine.delegate(id, &v1, &v2).unwrap();
    let before = h.engine.session_snapshot(id).unwrap();

    let err = h.engine.delegate(id, &v2, &v1).unwrap_err();
    assert_eq!(err.code(), "DelegationCycleDetected");

    let after = h.engine.session_snapshot(id).unwrap();
    assert_eq!(before.voters, after.voters);
    assert_eq!(before.candidates, after.candidates);
}

#[test]
fn longer_cycle_through_chain_is_rejected() {
    let h = Harness::new();
    let id = h.session(&[1]);
    let (a, b, c) = (principal("a"), principal("b"), principal("c"));
    h.grant(id, &[&a, &b, &c]);
    h.open_voting();

    h.engine.delegate(id, &a, &b).unwrap();
    h.engine.delegate(id, &b, &c).unwrap();
    // a already exited; c delegating back into a's chain would loop to c.
    let err = h.engine.delegate(id, &c, &a).unwrap_err();
    assert_eq!(err.code(), "DelegationCycleDetected");
    assert_eq!(h.engine.voter(id, &c).unwrap().weight, 3);
}

#[test]
fn done_phase_freezes_and_tallies() {
    let h = Harness::new();
    let id = h.session(&[1, 2, 3]);
    let voters: Vec<Principal> = (0..4).map(|i| principal(&format!("v{i}"))).collect();
    let refs: Vec<&Principal> = voters.iter().collect();
    h.grant(id, &refs);
    h.open_voting();

    h.engine.vote(id, &voters[0], CandidateId::new(2)).unwrap();
    h.engine.vote(id, &voters[1], CandidateId::new(3)).unwrap();
    h.close_voting();

    assert_eq!(h.engine.session_status(id).unwrap(), Phase::Done);
    let vote_err = h.engine.vote(id, &voters[2], CandidateId::new(1)).unwrap_err();
    assert_eq!(vote_err.category(), ErrorCategory::Phase);
    let delegate_err = h.engine.delegate(id, &voters[3], &voters[0]).unwrap_err();
    assert_eq!(delegate_err.category(), ErrorCategory::Phase);

    // 2 and 3 tie at one vote each; 2 is listed first.
    let winner = h.engine.winning_candidate(id).unwrap();
    assert_eq!(winner.id, CandidateId::new(2));
    assert_eq!(winner.vote_count, 1);
}

#[test]
fn grants_only_while_pending() {
    let h = Harness::new();
    let id = h.session(&[1]);
    h.open_voting();
    let err = h
        .engine
        .give_right_to_vote(id, &h.chair, &[principal("late")])
        .unwrap_err();
    assert!(matches!(
        err,
        BallotError::WrongPhase {
            expected: Phase::Pending,
            actual: Phase::Voting
        }
    ));
}

#[test]
fn programmatic_principals_are_rejected_everywhere() {
    let h = Harness::new();
    let bot = principal("0xc0ffee");
    h.classifier.mark_programmatic(&bot);

    let err = h
        .engine
        .create_session(
            &bot,
            &[CandidateId::new(1)],
            Timestamp::new(START),
            Timestamp::new(END),
        )
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Authorization);

    let id = h.session(&[1]);
    let human = principal("human");
    assert_eq!(
        h.engine
            .give_right_to_vote(id, &h.chair, &[bot.clone()])
            .unwrap_err()
            .code(),
        "ProgrammaticPrincipalRejected"
    );

    h.grant(id, &[&human]);
    h.open_voting();
    assert_eq!(
        h.engine.delegate(id, &human, &bot).unwrap_err().code(),
        "ProgrammaticPrincipalRejected"
    );
}

#[test]
fn sessions_are_independent() {
    let h = Harness::new();
    let first = h.session(&[1, 2]);
    let second = h.session(&[1, 2]);
    let v = principal("v");
    h.grant(first, &[&v]);
    h.open_voting();

    h.engine.vote(first, &v, CandidateId::new(1)).unwrap();
    assert_eq!(
        h.engine.vote(second, &v, CandidateId::new(1)).unwrap_err().code(),
        "NoRightToVote"
    );
    assert_eq!(h.engine.voter(second, &v).unwrap(), Voter::default());
}

#[test]
fn late_delegation_does_not_change_a_counted_ballot_retroactively() {
    let h = Harness::new();
    let id = h.session(&[1, 2]);
    let (a, b, c) = (principal("a"), principal("b"), principal("c"));
    h.grant(id, &[&a, &b, &c]);
    h.open_voting();

    h.engine.vote(id, &c, CandidateId::new(1)).unwrap();
    h.engine.delegate(id, &a, &b).unwrap();
    h.engine.delegate(id, &b, &c).unwrap();

    // b carried a's weight, so both fold into c's candidate.
    assert_eq!(h.count(id, 1), 3);
    let totals = h.engine.totals(id).unwrap();
    assert_eq!(totals.counted_weight, totals.granted_weight);
    assert_eq!(h.engine.voter(id, &c).unwrap().weight, 1);
}
