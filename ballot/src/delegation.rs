//! Vote delegation: forwarding voting weight to another voter.
//!
//! Supports:
//! - **Transitive delegation** (A→B→C means A's weight ends up with C)
//! - **Cycle detection** at delegation time, so the relation stays a forest
//!
//! Every walk is bounded by the session's voter population: an acyclic chain
//! can visit each voter at most once, so a longer walk proves a cycle.

use crate::error::BallotError;
use crate::session::Voter;
use ballot_types::Principal;
use std::collections::BTreeMap;

/// Resolve where a delegation from `from` to `to` would finally land.
///
/// Follows `delegate` links starting at `to` until reaching a voter that has
/// not delegated. Fails with [`BallotError::DelegationCycleDetected`] if the
/// chain passes through `from`.
pub fn resolve_final_target(
    voters: &BTreeMap<Principal, Voter>,
    from: &Principal,
    to: &Principal,
) -> Result<Principal, BallotError> {
    let mut current = to;
    // `voters.len() + 1` admits a chain through every voter plus a final
    // principal without a record.
    for _ in 0..=voters.len() {
        if current == from {
            return Err(BallotError::DelegationCycleDetected(from.clone()));
        }
        match voters.get(current).and_then(|v| v.delegate.as_ref()) {
            Some(next) => current = next,
            None => return Ok(current.clone()),
        }
    }
    Err(BallotError::DelegationCycleDetected(from.clone()))
}

/// The delegation chain starting at `start`, `start` included, ending at the
/// first principal that has not delegated.
///
/// Returns `None` if the walk exceeds the voter population (a cycle).
pub fn chain_from(voters: &BTreeMap<Principal, Voter>, start: &Principal) -> Option<Vec<Principal>> {
    let mut chain = vec![start.clone()];
    let mut current = start;
    for _ in 0..=voters.len() {
        match voters.get(current).and_then(|v| v.delegate.as_ref()) {
            Some(next) => {
                chain.push(next.clone());
                current = next;
            }
            None => return Some(chain),
        }
    }
    None
}
