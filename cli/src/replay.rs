//! Replays a [`Script`] against a fresh engine driven by a manual clock.

use std::sync::Arc;

use ballot_engine::{
    tally, BallotEngine, BallotError, EngineConfig, EngineSnapshot, RegistryClassifier,
};
use ballot_nullables::NullClock;
use ballot_types::{Principal, Timestamp};
use ballot_utils::OutcomeCounter;

use crate::script::{Action, Script};

/// Result of one step.
#[derive(Debug)]
pub struct Outcome {
    pub index: usize,
    pub at: u64,
    pub op: &'static str,
    pub result: Result<String, BallotError>,
}

/// Everything a replay produced.
pub struct Report {
    pub outcomes: Vec<Outcome>,
    pub counter: OutcomeCounter,
    pub snapshot: EngineSnapshot,
    /// Clock value after the last step.
    pub final_time: Timestamp,
}

pub fn replay(
    script: &Script,
    config: EngineConfig,
    extra_programmatic: &[Principal],
) -> Result<Report, BallotError> {
    let clock = Arc::new(NullClock::new(script.clock));
    let classifier = RegistryClassifier::new(
        script
            .programmatic
            .iter()
            .chain(extra_programmatic)
            .cloned(),
    );
    let engine = BallotEngine::new(config, clock.clone(), Arc::new(classifier));

    let mut outcomes = Vec::with_capacity(script.steps.len());
    let mut counter = OutcomeCounter::new();
    for (index, step) in script.steps.iter().enumerate() {
        clock.set(script.clock.saturating_add(step.at));
        let op = step.action.name();
        let result = run(&engine, script.clock, &step.action);
        match &result {
            Ok(detail) => tracing::info!(step = index, op, %detail, "step applied"),
            Err(e) => tracing::warn!(step = index, op, code = e.code(), error = %e, "step rejected"),
        }
        counter.record(op, result.is_ok());
        outcomes.push(Outcome {
            index,
            at: step.at,
            op,
            result,
        });
    }

    Ok(Report {
        outcomes,
        counter,
        snapshot: engine.snapshot()?,
        final_time: Timestamp::new(script.clock.saturating_add(
            script.steps.last().map(|s| s.at).unwrap_or(0),
        )),
    })
}

fn run(engine: &BallotEngine, origin: u64, action: &Action) -> Result<String, BallotError> {
    match action {
        Action::CreateSession {
            caller,
            candidates,
            start,
            end,
        } => {
            let id = engine.create_session(
                caller,
                candidates,
                Timestamp::new(origin.saturating_add(*start)),
                Timestamp::new(origin.saturating_add(*end)),
            )?;
            Ok(format!("session {id}"))
        }
        Action::AddCandidate {
            session,
            caller,
            candidate,
        } => {
            engine.add_candidate(*session, caller, *candidate)?;
            Ok(format!("candidate {candidate} added to {session}"))
        }
        Action::GiveRightToVote {
            session,
            caller,
            voters,
        } => {
            engine.give_right_to_vote(*session, caller, voters)?;
            Ok(format!("{} right(s) granted in {session}", voters.len()))
        }
        Action::Delegate { session, from, to } => {
            engine.delegate(*session, from, to)?;
            let chain = engine.delegation_chain(*session, from)?;
            let last = chain.last().cloned().unwrap_or_else(|| to.clone());
            Ok(format!("{from} delegated to {last}"))
        }
        Action::Vote {
            session,
            voter,
            candidate,
        } => {
            let weight = engine.voter(*session, voter)?.weight;
            engine.vote(*session, voter, *candidate)?;
            Ok(format!("{voter} cast {weight} for candidate {candidate}"))
        }
        Action::Status { session } => {
            let phase = engine.session_status(*session)?;
            Ok(format!("{session} is {phase}"))
        }
        Action::Winner { session } => {
            let winner = engine.winning_candidate(*session)?;
            Ok(format!(
                "candidate {} wins {session} with {}",
                winner.id, winner.vote_count
            ))
        }
    }
}

/// Human-readable summary of every session in a snapshot.
pub fn summarize(snapshot: &EngineSnapshot, now: Timestamp) -> Vec<String> {
    let mut lines = Vec::new();
    for session in &snapshot.sessions {
        let phase = session.phase(now);
        let timing = match phase {
            ballot_engine::Phase::Pending => format!(
                "opens in {}",
                ballot_utils::format_duration(session.start_time.remaining_from(now))
            ),
            ballot_engine::Phase::Voting => format!(
                "closes in {}",
                ballot_utils::format_duration(session.end_time.remaining_from(now))
            ),
            ballot_engine::Phase::Done => format!(
                "closed {} ago",
                ballot_utils::format_duration(session.end_time.elapsed_since(now))
            ),
        };
        let totals = session.totals();
        lines.push(format!(
            "session {} [{phase}, {timing}] chair={} counted {}/{}",
            session.id, session.chairperson, totals.counted_weight, totals.granted_weight
        ));
        for candidate in tally::ranking(&session.candidates) {
            lines.push(format!(
                "  candidate {:>6}: {}",
                candidate.id.get(),
                candidate.vote_count
            ));
        }
    }
    lines
}
