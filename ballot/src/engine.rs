//! Core ballot engine: owns every session and enforces every invariant.
//!
//! Each mutating operation locks its session, reads the clock, checks every
//! precondition, and only then writes. A failed call leaves no trace.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use ballot_types::{CandidateId, Principal, SessionId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::classifier::PrincipalClassifier;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::delegation;
use crate::error::BallotError;
use crate::event::{BallotEvent, EventBus};
use crate::phase::Phase;
use crate::session::{Candidate, Session, SessionInfo, SessionTotals, Voter};
use crate::tally;

/// Session index. `last_session_id` is written only by `create_session`,
/// under the write lock.
struct Registry {
    last_session_id: SessionId,
    sessions: HashMap<SessionId, Arc<Mutex<Session>>>,
}

/// Serializable snapshot of the whole engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub last_session_id: SessionId,
    /// Sessions in id order.
    pub sessions: Vec<Session>,
}

/// Owns all sessions, candidates and voters.
///
/// Operations on one session are serialized by a per-session mutex;
/// operations on different sessions run in parallel.
pub struct BallotEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn PrincipalClassifier>,
    registry: RwLock<Registry>,
    events: EventBus,
}

impl BallotEngine {
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn PrincipalClassifier>,
    ) -> Self {
        Self {
            config,
            clock,
            classifier,
            registry: RwLock::new(Registry {
                last_session_id: SessionId::ZERO,
                sessions: HashMap::new(),
            }),
            events: EventBus::new(),
        }
    }

    /// Register a listener for events emitted after each committed mutation.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&BallotEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Create a session and return its id.
    ///
    /// Candidates are created here, one per id, in the given order.
    pub fn create_session(
        &self,
        chairperson: &Principal,
        candidate_ids: &[CandidateId],
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<SessionId, BallotError> {
        self.create_session_inner(chairperson, candidate_ids, start_time, end_time)
            .inspect_err(|e| rejected("create_session", SessionId::ZERO, e))
    }

    fn create_session_inner(
        &self,
        chairperson: &Principal,
        candidate_ids: &[CandidateId],
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<SessionId, BallotError> {
        self.require_human(chairperson)?;

        if candidate_ids.is_empty() {
            return Err(BallotError::NoCandidates);
        }
        let max = self.config.candidate_cap();
        if candidate_ids.len() > max {
            return Err(BallotError::TooManyCandidates {
                have: candidate_ids.len(),
                max,
            });
        }

        let now = self.clock.now();
        if start_time <= now {
            return Err(BallotError::StartNotInFuture {
                start: start_time,
                now,
            });
        }
        if end_time <= start_time {
            return Err(BallotError::EndNotAfterStart {
                start: start_time,
                end: end_time,
            });
        }

        let mut seen = HashSet::with_capacity(candidate_ids.len());
        for &id in candidate_ids {
            if id.is_zero() {
                return Err(BallotError::ZeroCandidateId);
            }
            if !seen.insert(id) {
                return Err(BallotError::DuplicateCandidate(id));
            }
        }

        let mut registry = self
            .registry
            .write()
            .map_err(|_| BallotError::LockPoisoned)?;
        let id = registry
            .last_session_id
            .next()
            .ok_or(BallotError::SessionIdOverflow)?;

        let candidates = candidate_ids.iter().map(|&c| Candidate::new(c)).collect();
        let session = Session::new(
            id,
            chairperson.clone(),
            candidates,
            start_time,
            end_time,
            now,
        );
        registry.sessions.insert(id, Arc::new(Mutex::new(session)));
        registry.last_session_id = id;
        drop(registry);

        tracing::info!(
            session = %id,
            chairperson = %chairperson,
            candidates = candidate_ids.len(),
            start = start_time.as_secs(),
            end = end_time.as_secs(),
            "session created"
        );
        self.events.emit(&BallotEvent::SessionCreated {
            session: id,
            chairperson: chairperson.clone(),
            start_time,
            end_time,
        });
        Ok(id)
    }

    /// Append a candidate to a session that has not opened yet.
    pub fn add_candidate(
        &self,
        session_id: SessionId,
        caller: &Principal,
        candidate_id: CandidateId,
    ) -> Result<(), BallotError> {
        self.mutate_session(session_id, |session, now| {
            session.require_phase(Phase::Pending, now)?;
            session.require_chairperson(caller)?;

            if candidate_id.is_zero() {
                return Err(BallotError::ZeroCandidateId);
            }
            if session.candidate_index(candidate_id).is_some() {
                return Err(BallotError::DuplicateCandidate(candidate_id));
            }
            let max = self.config.candidate_cap();
            if session.candidates.len() >= max {
                return Err(BallotError::TooManyCandidates {
                    have: session.candidates.len() + 1,
                    max,
                });
            }

            session.candidates.push(Candidate::new(candidate_id));

            tracing::debug!(session = %session_id, candidate = %candidate_id, "candidate added");
            Ok((
                (),
                BallotEvent::CandidateAdded {
                    session: session_id,
                    candidate: candidate_id,
                },
            ))
        })
        .inspect_err(|e| rejected("add_candidate", session_id, e))
    }

    /// Grant a weight of 1 to every listed voter. All or nothing.
    pub fn give_right_to_vote(
        &self,
        session_id: SessionId,
        caller: &Principal,
        voters: &[Principal],
    ) -> Result<(), BallotError> {
        self.mutate_session(session_id, |session, now| {
            session.require_phase(Phase::Pending, now)?;
            session.require_chairperson(caller)?;

            let max = self.config.grant_cap();
            if voters.len() > max {
                return Err(BallotError::TooManyVoters {
                    have: voters.len(),
                    max,
                });
            }

            // A principal listed twice would be granted twice; treat the second
            // entry like an existing right.
            let mut batch = HashSet::with_capacity(voters.len());
            for voter in voters {
                self.require_human(voter)?;
                if session.voter(voter).has_right() || !batch.insert(voter) {
                    return Err(BallotError::AlreadyHasRight(voter.clone()));
                }
            }

            for voter in voters {
                session.voters.entry(voter.clone()).or_default().weight = 1;
            }
            session.granted_weight = session.granted_weight.saturating_add(voters.len() as u64);

            tracing::debug!(session = %session_id, count = voters.len(), "rights granted");
            Ok((
                (),
                BallotEvent::RightsGranted {
                    session: session_id,
                    voters: voters.to_vec(),
                },
            ))
        })
        .inspect_err(|e| rejected("give_right_to_vote", session_id, e))
    }

    /// Forward `from`'s weight to the end of the delegation chain starting at `to`.
    ///
    /// If the final target already voted, the weight is counted for their
    /// candidate immediately; otherwise it is added to the target's weight.
    /// Either way `from` is marked as voted and can no longer act directly.
    pub fn delegate(
        &self,
        session_id: SessionId,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), BallotError> {
        self.mutate_session(session_id, |session, now| {
            session.require_phase(Phase::Voting, now)?;
            self.require_human(to)?;

            let sender = session.voter(from);
            if !sender.has_right() {
                return Err(BallotError::NoRightToVote(from.clone()));
            }
            if sender.voted {
                return Err(BallotError::AlreadyVoted(from.clone()));
            }
            if to == from {
                return Err(BallotError::SelfDelegationNotAllowed);
            }

            let target = delegation::resolve_final_target(&session.voters, from, to)?;
            let target_voter = session.voter(&target);
            if !target_voter.has_right() {
                return Err(BallotError::NoRightToVote(target));
            }

            let counted_for = if target_voter.voted {
                let candidate = target_voter.vote.ok_or_else(|| {
                    BallotError::CorruptState(format!(
                        "{target} is marked voted with no ballot and no delegate"
                    ))
                })?;
                let index = session.candidate_index(candidate).ok_or(
                    BallotError::UnknownCandidate {
                        session: session_id,
                        candidate,
                    },
                )?;
                Some((index, candidate))
            } else {
                None
            };

            let weight = sender.weight;
            let record = session.voters.entry(from.clone()).or_default();
            record.voted = true;
            record.delegate = Some(target.clone());

            match counted_for {
                Some((index, _)) => {
                    let c = &mut session.candidates[index];
                    c.vote_count = c.vote_count.saturating_add(weight);
                }
                None => {
                    let t = session.voters.entry(target.clone()).or_default();
                    t.weight = t.weight.saturating_add(weight);
                }
            }

            tracing::debug!(
                session = %session_id,
                %from,
                to = %target,
                weight,
                folded = counted_for.is_some(),
                "delegated"
            );
            Ok((
                (),
                BallotEvent::Delegated {
                    session: session_id,
                    from: from.clone(),
                    to: target,
                    weight,
                    counted_for: counted_for.map(|(_, c)| c),
                },
            ))
        })
        .inspect_err(|e| rejected("delegate", session_id, e))
    }

    /// Cast `voter`'s current weight for `candidate_id`.
    ///
    /// Weight delegated to the voter afterwards is counted by `delegate`,
    /// never by re-summing here.
    pub fn vote(
        &self,
        session_id: SessionId,
        voter: &Principal,
        candidate_id: CandidateId,
    ) -> Result<(), BallotError> {
        self.mutate_session(session_id, |session, now| {
            session.require_phase(Phase::Voting, now)?;

            let current = session.voter(voter);
            if !current.has_right() {
                return Err(BallotError::NoRightToVote(voter.clone()));
            }
            if current.voted {
                return Err(BallotError::AlreadyVoted(voter.clone()));
            }
            let index = session
                .candidate_index(candidate_id)
                .ok_or(BallotError::UnknownCandidate {
                    session: session_id,
                    candidate: candidate_id,
                })?;

            let record = session.voters.entry(voter.clone()).or_default();
            record.voted = true;
            record.vote = Some(candidate_id);
            let c = &mut session.candidates[index];
            c.vote_count = c.vote_count.saturating_add(current.weight);

            tracing::debug!(
                session = %session_id,
                %voter,
                candidate = %candidate_id,
                weight = current.weight,
                "voted"
            );
            Ok((
                (),
                BallotEvent::Voted {
                    session: session_id,
                    voter: voter.clone(),
                    candidate: candidate_id,
                    weight: current.weight,
                },
            ))
        })
        .inspect_err(|e| rejected("vote", session_id, e))
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// The most recently assigned session id, or zero if none exists.
    pub fn last_session_id(&self) -> Result<SessionId, BallotError> {
        let registry = self.registry.read().map_err(|_| BallotError::LockPoisoned)?;
        Ok(registry.last_session_id)
    }

    pub fn session_status(&self, session_id: SessionId) -> Result<Phase, BallotError> {
        self.with_session(session_id, |session, now| Ok(session.phase(now)))
    }

    pub fn session(&self, session_id: SessionId) -> Result<SessionInfo, BallotError> {
        self.with_session(session_id, |session, _| Ok(session.info()))
    }

    /// The voter record of `principal`; the default record if never granted.
    pub fn voter(&self, session_id: SessionId, principal: &Principal) -> Result<Voter, BallotError> {
        self.with_session(session_id, |session, _| Ok(session.voter(principal)))
    }

    /// Candidates with their current counts, in insertion order.
    pub fn candidates(&self, session_id: SessionId) -> Result<Vec<Candidate>, BallotError> {
        self.with_session(session_id, |session, _| Ok(session.candidates.clone()))
    }

    pub fn totals(&self, session_id: SessionId) -> Result<SessionTotals, BallotError> {
        self.with_session(session_id, |session, _| Ok(session.totals()))
    }

    /// The delegation chain starting at `principal`, ending at the principal
    /// that holds (or cast) the weight.
    pub fn delegation_chain(
        &self,
        session_id: SessionId,
        principal: &Principal,
    ) -> Result<Vec<Principal>, BallotError> {
        self.with_session(session_id, |session, _| {
            delegation::chain_from(&session.voters, principal).ok_or_else(|| {
                BallotError::CorruptState(format!("delegation cycle reachable from {principal}"))
            })
        })
    }

    /// The winner of a finished session. Ties go to the earliest listed candidate.
    pub fn winning_candidate(&self, session_id: SessionId) -> Result<Candidate, BallotError> {
        self.with_session(session_id, |session, now| {
            session.require_phase(Phase::Done, now)?;
            tally::winning_candidate(&session.candidates)
                .cloned()
                .ok_or(BallotError::NoCandidates)
        })
        .inspect_err(|e| rejected("winning_candidate", session_id, e))
    }

    /// A full copy of one session.
    pub fn session_snapshot(&self, session_id: SessionId) -> Result<Session, BallotError> {
        self.with_session(session_id, |session, _| Ok(session.clone()))
    }

    // ── Persistence hook ───────────────────────────────────────────────

    /// Capture every session, in id order.
    pub fn snapshot(&self) -> Result<EngineSnapshot, BallotError> {
        let registry = self.registry.read().map_err(|_| BallotError::LockPoisoned)?;
        let mut ids: Vec<SessionId> = registry.sessions.keys().copied().collect();
        ids.sort();
        let mut sessions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(handle) = registry.sessions.get(&id) {
                sessions.push(lock(handle)?.clone());
            }
        }
        Ok(EngineSnapshot {
            last_session_id: registry.last_session_id,
            sessions,
        })
    }

    /// Serialize the engine state to bytes for an external store.
    pub fn save_state(&self) -> Result<Vec<u8>, BallotError> {
        let snapshot = self.snapshot()?;
        bincode::serialize(&snapshot).map_err(|e| BallotError::Snapshot(e.to_string()))
    }

    /// Restore an engine from bytes produced by [`BallotEngine::save_state`].
    pub fn load_state(
        data: &[u8],
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn PrincipalClassifier>,
    ) -> Result<Self, BallotError> {
        let snapshot: EngineSnapshot =
            bincode::deserialize(data).map_err(|e| BallotError::Snapshot(e.to_string()))?;
        Self::from_snapshot(snapshot, config, clock, classifier)
    }

    /// Rebuild an engine from a snapshot, rejecting ids outside
    /// `[1, last_session_id]`, duplicates, and sessions whose contents break
    /// the invariants the mutations maintain.
    pub fn from_snapshot(
        snapshot: EngineSnapshot,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        classifier: Arc<dyn PrincipalClassifier>,
    ) -> Result<Self, BallotError> {
        let mut sessions = HashMap::with_capacity(snapshot.sessions.len());
        for session in snapshot.sessions {
            let id = session.id;
            if id.is_zero() || id > snapshot.last_session_id {
                return Err(BallotError::Snapshot(format!(
                    "session {id} outside [1, {}]",
                    snapshot.last_session_id
                )));
            }
            validate_restored(&session)?;
            if sessions.insert(id, Arc::new(Mutex::new(session))).is_some() {
                return Err(BallotError::Snapshot(format!("session {id} appears twice")));
            }
        }
        tracing::info!(
            sessions = sessions.len(),
            last_session_id = %snapshot.last_session_id,
            "engine state restored"
        );
        let engine = Self::new(config, clock, classifier);
        {
            let mut registry = engine
                .registry
                .write()
                .map_err(|_| BallotError::LockPoisoned)?;
            registry.last_session_id = snapshot.last_session_id;
            registry.sessions = sessions;
        }
        Ok(engine)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn handle(&self, session_id: SessionId) -> Result<Arc<Mutex<Session>>, BallotError> {
        if session_id.is_zero() {
            return Err(BallotError::UnknownSession(session_id));
        }
        let registry = self.registry.read().map_err(|_| BallotError::LockPoisoned)?;
        registry
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or(BallotError::UnknownSession(session_id))
    }

    /// Run `f` with the session locked and the clock read inside the lock.
    fn with_session<R>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut Session, Timestamp) -> Result<R, BallotError>,
    ) -> Result<R, BallotError> {
        let handle = self.handle(session_id)?;
        let mut session = lock(&handle)?;
        let now = self.clock.now();
        f(&mut session, now)
    }

    /// Like [`Self::with_session`], but emits the returned event once the
    /// session lock is released. Listeners never run under the lock.
    fn mutate_session<R>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut Session, Timestamp) -> Result<(R, BallotEvent), BallotError>,
    ) -> Result<R, BallotError> {
        let (result, event) = self.with_session(session_id, f)?;
        self.events.emit(&event);
        Ok(result)
    }

    fn require_human(&self, principal: &Principal) -> Result<(), BallotError> {
        if principal.is_null() {
            return Err(BallotError::NullPrincipal);
        }
        if self.classifier.is_programmatic(principal) {
            return Err(BallotError::ProgrammaticPrincipalRejected(principal.clone()));
        }
        Ok(())
    }
}

fn lock(handle: &Mutex<Session>) -> Result<MutexGuard<'_, Session>, BallotError> {
    handle.lock().map_err(|_| BallotError::LockPoisoned)
}

/// Checks a session read from a snapshot against the invariants that
/// `create_session`, `add_candidate`, `delegate` and `vote` maintain.
fn validate_restored(session: &Session) -> Result<(), BallotError> {
    let id = session.id;
    let corrupt = |what: String| BallotError::Snapshot(format!("session {id}: {what}"));

    if session.end_time <= session.start_time {
        return Err(corrupt(format!(
            "end {} is not after start {}",
            session.end_time, session.start_time
        )));
    }
    if session.candidates.is_empty() {
        return Err(corrupt("no candidates".into()));
    }
    if session.candidates.len() > crate::config::MAX_CANDIDATES {
        return Err(corrupt(format!("{} candidates", session.candidates.len())));
    }
    let mut seen = HashSet::with_capacity(session.candidates.len());
    for candidate in &session.candidates {
        if candidate.id.is_zero() {
            return Err(corrupt("candidate id 0".into()));
        }
        if !seen.insert(candidate.id) {
            return Err(corrupt(format!("candidate {} appears twice", candidate.id)));
        }
    }

    for (principal, voter) in &session.voters {
        if let Some(candidate) = voter.vote {
            if !seen.contains(&candidate) {
                return Err(corrupt(format!("{principal} voted for unknown candidate {candidate}")));
            }
        }
        if delegation::chain_from(&session.voters, principal).is_none() {
            return Err(corrupt(format!("delegation cycle reachable from {principal}")));
        }
    }

    let totals = session.totals();
    if totals.counted_weight > totals.granted_weight {
        return Err(corrupt(format!(
            "counted weight {} exceeds granted weight {}",
            totals.counted_weight, totals.granted_weight
        )));
    }
    Ok(())
}

fn rejected(op: &'static str, session: SessionId, err: &BallotError) {
    tracing::debug!(op, session = %session, code = err.code(), error = %err, "operation rejected");
}
