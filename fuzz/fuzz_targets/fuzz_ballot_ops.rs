#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use ballot_engine::{BallotEngine, EngineConfig, Phase};
use ballot_nullables::{NullClassifier, NullClock};
use ballot_types::{CandidateId, Principal, Timestamp};
use libfuzzer_sys::fuzz_target;

const POOL: u8 = 8;

#[derive(Arbitrary, Debug)]
enum Op {
    Grant(Vec<u8>),
    AddCandidate(u8),
    Vote(u8, u8),
    Delegate(u8, u8),
    Advance(u16),
}

#[derive(Arbitrary, Debug)]
struct Input {
    start_offset: u16,
    duration: u16,
    candidates: Vec<u8>,
    ops: Vec<Op>,
}

fn principal(i: u8) -> Principal {
    Principal::parse(format!("p{}", i % POOL)).unwrap()
}

fn candidate(i: u8) -> CandidateId {
    CandidateId::new(u64::from(i % 6))
}

fuzz_target!(|input: Input| {
    let clock = Arc::new(NullClock::new(1_000));
    let engine = BallotEngine::new(
        EngineConfig::default(),
        clock.clone(),
        Arc::new(NullClassifier::new()),
    );
    let chair = principal(0);
    let candidates: Vec<CandidateId> = input.candidates.iter().map(|&c| candidate(c)).collect();
    let start = Timestamp::new(1_000 + u64::from(input.start_offset));
    let end = start.saturating_add(u64::from(input.duration));

    let Ok(id) = engine.create_session(&chair, &candidates, start, end) else {
        return;
    };

    for op in input.ops.iter().take(256) {
        let _ = match op {
            Op::Grant(list) => {
                let list: Vec<Principal> = list.iter().take(16).map(|&i| principal(i)).collect();
                engine.give_right_to_vote(id, &chair, &list)
            }
            Op::AddCandidate(c) => engine.add_candidate(id, &chair, candidate(*c)),
            Op::Vote(v, c) => engine.vote(id, &principal(*v), candidate(*c)),
            Op::Delegate(f, t) => engine.delegate(id, &principal(*f), &principal(*t)),
            Op::Advance(secs) => {
                clock.advance(u64::from(*secs));
                Ok(())
            }
        };

        let session = engine.session_snapshot(id).unwrap();
        let totals = session.totals();
        let pending: u64 = session
            .voters
            .values()
            .filter(|v| !v.voted)
            .map(|v| v.weight)
            .sum();
        assert_eq!(totals.counted_weight + pending, totals.granted_weight);
    }

    for i in 0..POOL {
        let chain = engine.delegation_chain(id, &principal(i)).unwrap();
        assert!(chain.len() <= usize::from(POOL) + 1);
    }

    let winner = engine.winning_candidate(id);
    if engine.session_status(id).unwrap() == Phase::Done {
        assert!(winner.is_ok());
    } else {
        assert!(winner.is_err());
    }
});
