//! Engine limits with TOML support.
//!
//! Every per-call loop in the engine is bounded by one of these caps.

use serde::{Deserialize, Serialize};

use crate::error::BallotError;

/// Hard cap on candidates per session.
pub const MAX_CANDIDATES: usize = 1_000;

/// Hard cap on voters per `give_right_to_vote` call.
pub const MAX_VOTERS_PER_GRANT: usize = 10_000;

/// Limits applied by a [`BallotEngine`](crate::BallotEngine).
///
/// Values above the hard caps are clamped to them, so a config can tighten
/// the limits but never loosen them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of candidates in one session.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Maximum number of voters in one right-grant call.
    #[serde(default = "default_max_voters_per_grant")]
    pub max_voters_per_grant: usize,
}

fn default_max_candidates() -> usize {
    MAX_CANDIDATES
}

fn default_max_voters_per_grant() -> usize {
    MAX_VOTERS_PER_GRANT
}

impl EngineConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, BallotError> {
        toml::from_str(s).map_err(|e| BallotError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, BallotError> {
        toml::to_string_pretty(self).map_err(|e| BallotError::Config(e.to_string()))
    }

    pub(crate) fn candidate_cap(&self) -> usize {
        self.max_candidates.min(MAX_CANDIDATES)
    }

    pub(crate) fn grant_cap(&self) -> usize {
        self.max_voters_per_grant.min(MAX_VOTERS_PER_GRANT)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            max_voters_per_grant: default_max_voters_per_grant(),
        }
    }
}
