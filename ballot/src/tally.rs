//! Tallying over a session's candidates.

use crate::session::Candidate;

/// The first candidate, in insertion order, holding the strictly greatest
/// vote count. Ties go to the earliest listed candidate.
///
/// Returns `None` only for an empty slice, which no session ever has.
pub fn winning_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut winner: Option<&Candidate> = None;
    for candidate in candidates {
        match winner {
            Some(best) if candidate.vote_count <= best.vote_count => {}
            _ => winner = Some(candidate),
        }
    }
    winner
}

/// Sum of vote counts across all candidates.
pub fn counted_weight(candidates: &[Candidate]) -> u64 {
    candidates
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.vote_count))
}

/// Candidates ordered by vote count, highest first. Ties keep insertion order.
pub fn ranking(candidates: &[Candidate]) -> Vec<&Candidate> {
    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    ranked
}
